//! # Capture Session Management
//!
//! High-level orchestration of the capture pipeline for both modes:
//!
//! - **Single-shot** ([`CaptureSession::take_capture`]): open a transient
//!   frame feed, wait briefly for one frame, run it through the pipeline,
//!   release everything, return the result synchronously.
//! - **Continuous** ([`CaptureSession::start`]): open a feed sized to the
//!   mirrored display, spawn a worker that gates, crops, converts and
//!   delivers each accepted frame over a channel until stopped or revoked.
//!
//! ## State machine
//!
//! The session is `Idle` or `Running`; only one continuous session may run
//! at a time. `start` is valid only from `Idle`, `stop` is valid from any
//! state and idempotent, and an external revocation (the feed ending)
//! drives the same teardown as `stop`. Single-shot capture is independent
//! of the state machine but shares the process-wide sequence counter, so
//! `queue` numbers are strictly monotonic across both modes for the life
//! of the session.
//!
//! ## Resource discipline
//!
//! Source frames arrive as RAII guards ([`crate::capture::AcquiredFrame`])
//! and release their storage on drop, so gate-rejected frames, failed
//! conversions, and delivered results all hand the buffer back exactly
//! once. All continuous-mode exit paths (stop signal, revocation, receiver
//! dropped) converge on one teardown sequence that closes the feed and
//! clears the running flag.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;

use crate::capture::{FrameFeed, ProjectionSource};
use crate::config::CaptureConfig;
use crate::core::{PixelBuffer, Region, PIXEL_FORMAT_LABEL};
use crate::error::CaptureError;
use crate::processing::{crop, encode_jpeg, to_planar_yuv420, FrameGate};

/// Settle time before reading the first single-shot frame; surfaces do not
/// produce a frame instantly after creation.
const SINGLE_SHOT_SETTLE: Duration = Duration::from_millis(100);

/// Bounded wait for the single-shot frame after the settle delay.
const SINGLE_SHOT_WAIT: Duration = Duration::from_millis(1000);

/// Depth of the continuous-mode result channel.
const RESULT_CHANNEL_DEPTH: usize = 16;

/// One processed frame delivered to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureResult {
    /// Compressed still image (JPEG) of the cropped frame.
    pub bytes: Vec<u8>,
    /// Cropped frame width in pixels.
    pub width: u32,
    /// Cropped frame height in pixels.
    pub height: u32,
    /// Bytes per row of the cropped frame.
    pub row_bytes: usize,
    /// Pixel-format label of the source data.
    pub format: &'static str,
    /// Pixel stride the source declared for the raw frame.
    pub pixel_stride: usize,
    /// Row stride the source declared for the raw frame.
    pub row_stride: usize,
    /// Planar YUV 4:2:0 encoding of the cropped frame, V plane before U.
    pub planar_yuv: Vec<u8>,
    /// Capture time in milliseconds since the Unix epoch.
    pub time: i64,
    /// Strictly monotonic sequence number, starting at 1.
    pub queue: i64,
}

impl CaptureResult {
    /// Render the result as a JSON record with base64-encoded binary
    /// fields, the shape the event transport ships to host applications.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "bytes": BASE64.encode(&self.bytes),
            "width": self.width,
            "height": self.height,
            "rowBytes": self.row_bytes,
            "format": self.format,
            "pixelStride": self.pixel_stride,
            "rowStride": self.row_stride,
            "planarYUV": BASE64.encode(&self.planar_yuv),
            "time": self.time,
            "queue": self.queue,
        })
    }
}

/// Process-wide mutable capture state, shared by the continuous worker and
/// the single-shot path. All fields are atomics; there is no lock to hold
/// across an await.
#[derive(Debug)]
struct CaptureState {
    running: AtomicBool,
    last_accepted_ms: AtomicI64,
    sequence: AtomicI64,
}

impl CaptureState {
    fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            last_accepted_ms: AtomicI64::new(0),
            sequence: AtomicI64::new(0),
        }
    }

    /// Next sequence number; the first call returns 1 and numbers are
    /// never reused, even across start/stop cycles.
    fn next_sequence(&self) -> i64 {
        self.sequence.fetch_add(1, Ordering::AcqRel) + 1
    }
}

struct WorkerHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Orchestrates single-shot and continuous capture over one projection
/// source.
pub struct CaptureSession {
    source: Arc<dyn ProjectionSource>,
    state: Arc<CaptureState>,
    worker: Mutex<Option<WorkerHandle>>,
}

impl CaptureSession {
    /// Create a session over an authorized (or not-yet-authorized) source.
    pub fn new(source: Arc<dyn ProjectionSource>) -> Self {
        Self {
            source,
            state: Arc::new(CaptureState::new()),
            worker: Mutex::new(None),
        }
    }

    /// Start continuous capture.
    ///
    /// Valid only from `Idle`: a second `start` while running is rejected
    /// with [`CaptureError::AlreadyRunning`], never queued. Requires the
    /// source to be authorized ([`CaptureError::SourceNotReady`] otherwise).
    /// Returns synchronously once the frame feed is open; accepted frames
    /// arrive on the returned channel until `stop` is called, the source is
    /// revoked, or the receiver is dropped.
    pub async fn start(
        &self,
        config: CaptureConfig,
    ) -> Result<mpsc::Receiver<CaptureResult>, CaptureError> {
        config.validate()?;
        if !self.source.is_ready() {
            return Err(CaptureError::source_not_ready(
                "no authorized projection source",
            ));
        }
        if self
            .state
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(CaptureError::AlreadyRunning);
        }

        let (width, height) = self.source.display_size();
        let feed = match self.source.open_feed(width, height).await {
            Ok(feed) => feed,
            Err(err) => {
                self.state.running.store(false, Ordering::Release);
                return Err(err);
            }
        };

        let (result_tx, result_rx) = mpsc::channel(RESULT_CHANNEL_DEPTH);
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(run_worker(
            feed,
            result_tx,
            self.state.clone(),
            config,
            stop_rx,
        ));

        let mut slot = self.worker.lock().await;
        *slot = Some(WorkerHandle { stop_tx, task });
        Ok(result_rx)
    }

    /// Stop continuous capture.
    ///
    /// Idempotent and infallible: stopping an idle session is a no-op that
    /// still reports success. From `Running` it signals the worker, waits
    /// for its teardown (which closes the feed and releases the surface),
    /// and returns once the session is `Idle`.
    pub async fn stop(&self) -> bool {
        let handle = self.worker.lock().await.take();
        if let Some(handle) = handle {
            self.state.running.store(false, Ordering::Release);
            let _ = handle.stop_tx.send(true);
            let _ = handle.task.await;
        }
        true
    }

    /// Capture a single frame, independent of the continuous state machine.
    ///
    /// Opens a transient single-use feed, waits a short settle delay for
    /// the surface to produce, takes exactly one frame through the full
    /// pipeline, and releases the transient resources before returning.
    /// Fails with [`CaptureError::NoFrameAvailable`] if no frame arrives
    /// within the bounded wait.
    pub async fn take_capture(
        &self,
        region: Option<Region>,
    ) -> Result<CaptureResult, CaptureError> {
        if let Some(region) = &region {
            region.validate()?;
        }
        if !self.source.is_ready() {
            return Err(CaptureError::source_not_ready(
                "no authorized projection source",
            ));
        }

        let (width, height) = self.source.display_size();
        let mut feed = self.source.open_feed(width, height).await?;

        tokio::time::sleep(SINGLE_SHOT_SETTLE).await;
        let frame = match tokio::time::timeout(SINGLE_SHOT_WAIT, feed.next_frame()).await {
            Ok(Some(frame)) => frame,
            Ok(None) | Err(_) => {
                feed.close().await;
                return Err(CaptureError::no_frame_available(
                    (SINGLE_SHOT_SETTLE + SINGLE_SHOT_WAIT).as_millis() as u64,
                ));
            }
        };

        let result = assemble_result(
            frame.buffer(),
            region.as_ref(),
            &self.state,
            epoch_millis(),
        );
        drop(frame);
        feed.close().await;
        result
    }

    /// Whether a continuous session is currently running.
    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::Acquire)
    }
}

/// Continuous-mode worker: gate, process, deliver, until told to stop.
///
/// Every exit path funnels through the teardown at the bottom so the feed
/// is closed and the running flag cleared exactly once, whether the stop
/// was caller-initiated, the source was revoked, or the caller dropped the
/// result receiver.
async fn run_worker(
    mut feed: Box<dyn FrameFeed>,
    results: mpsc::Sender<CaptureResult>,
    state: Arc<CaptureState>,
    config: CaptureConfig,
    mut stop_rx: watch::Receiver<bool>,
) {
    log::info!("continuous capture started (fps {})", config.fps);

    loop {
        let frame = tokio::select! {
            _ = stop_rx.changed() => break,
            frame = feed.next_frame() => match frame {
                Some(frame) => frame,
                None => {
                    log::info!("capture source revoked, ending session");
                    break;
                }
            },
        };

        // The running flag is the single source of truth for cancellation:
        // a frame that raced a stop is released unprocessed.
        if !state.running.load(Ordering::Acquire) {
            break;
        }

        let now = epoch_millis();
        if !FrameGate::should_accept(
            config.fps,
            now,
            state.last_accepted_ms.load(Ordering::Acquire),
        ) {
            continue;
        }
        state.last_accepted_ms.store(now, Ordering::Release);

        match assemble_result(frame.buffer(), config.region.as_ref(), &state, now) {
            Ok(result) => {
                if results.send(result).await.is_err() {
                    log::info!("result receiver dropped, ending session");
                    break;
                }
            }
            // One bad frame never ends the session.
            Err(err) => log::warn!("frame processing failed ({}): {}", err.category(), err),
        }
    }

    feed.close().await;
    state.running.store(false, Ordering::Release);
    log::info!("continuous capture stopped");
}

/// Run one acquired frame through crop and both encodings and stamp the
/// outgoing record.
fn assemble_result(
    raw: &PixelBuffer,
    region: Option<&Region>,
    state: &CaptureState,
    now_ms: i64,
) -> Result<CaptureResult, CaptureError> {
    let cropped = crop(raw, region)?;
    let planar_yuv = to_planar_yuv420(&cropped);
    let bytes = encode_jpeg(&cropped)?;

    Ok(CaptureResult {
        bytes,
        width: cropped.width,
        height: cropped.height,
        row_bytes: cropped.row_stride,
        format: PIXEL_FORMAT_LABEL,
        pixel_stride: raw.pixel_stride,
        row_stride: raw.row_stride,
        planar_yuv,
        time: now_ms,
        queue: state.next_sequence(),
    })
}

fn epoch_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
