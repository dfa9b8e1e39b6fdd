//! # Synthetic Capture Source
//!
//! In-process [`ProjectionSource`] that produces generated frames on a
//! timer. It stands in for a real mirroring surface in tests and the CLI
//! demo while exercising the same contract: padded rows, a bounded buffer
//! pool behind each feed, authorization state, and external revocation.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::capture::source::{AcquiredFrame, FrameFeed, ProjectionSource};
use crate::core::{FramePool, PixelBuffer, RGBA_PIXEL_STRIDE};
use crate::error::CaptureError;

/// Frames a feed may hold in flight before the producer blocks, matching
/// the small image queues real mirroring surfaces allocate.
const FEED_DEPTH: usize = 4;
const POOL_BUFFERS: usize = 5;

/// Pixel content generated per frame.
#[derive(Debug, Clone, Copy)]
pub enum FramePattern {
    /// Every pixel the same RGBA value.
    Solid([u8; 4]),
    /// Red rises with x, green with y; useful for eyeballing crops.
    Gradient,
}

/// Synthetic projection of a fixed-size display.
///
/// Construction is fluent: start from [`SyntheticSource::new`] and layer on
/// the behaviors a test needs (native interval, row padding, frame budget,
/// fill pattern). The source starts authorized; [`SyntheticSource::unauthorized`]
/// builds one that rejects feeds, and [`RevokeHandle::revoke`] withdraws
/// authorization at any point, ending open feeds the way a platform ends a
/// projection whose permission was withdrawn.
pub struct SyntheticSource {
    width: u32,
    height: u32,
    frame_interval: Duration,
    row_padding_px: usize,
    pattern: FramePattern,
    frame_budget: Option<u64>,
    authorized: bool,
    revoked: Arc<AtomicBool>,
    in_flight: Arc<AtomicUsize>,
}

impl SyntheticSource {
    /// An authorized source mirroring a `width` x `height` display at 60fps
    /// equivalent, solid mid-gray, tightly packed rows.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame_interval: Duration::from_millis(16),
            row_padding_px: 0,
            pattern: FramePattern::Solid([128, 128, 128, 255]),
            frame_budget: None,
            authorized: true,
            revoked: Arc::new(AtomicBool::new(false)),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A source with no authorization; every `open_feed` fails.
    pub fn unauthorized(width: u32, height: u32) -> Self {
        Self {
            authorized: false,
            ..Self::new(width, height)
        }
    }

    /// Time between produced frames (the source's native rate).
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Horizontal padding pixels appended to each row, mimicking
    /// stride-aligned over-allocation.
    pub fn with_row_padding(mut self, padding_px: usize) -> Self {
        self.row_padding_px = padding_px;
        self
    }

    /// Pixel content for produced frames.
    pub fn with_pattern(mut self, pattern: FramePattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Stop producing after this many frames per feed.
    pub fn with_frame_budget(mut self, frames: u64) -> Self {
        self.frame_budget = Some(frames);
        self
    }

    /// Handle for revoking the projection externally.
    pub fn revoke_handle(&self) -> RevokeHandle {
        RevokeHandle(self.revoked.clone())
    }

    /// Frames currently handed out and not yet released. Every exit path in
    /// a well-behaved consumer brings this back to zero.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }
}

#[async_trait]
impl ProjectionSource for SyntheticSource {
    fn is_ready(&self) -> bool {
        self.authorized && !self.revoked.load(Ordering::Acquire)
    }

    fn display_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    async fn open_feed(
        &self,
        width: u32,
        height: u32,
    ) -> Result<Box<dyn FrameFeed>, CaptureError> {
        if !self.is_ready() {
            return Err(CaptureError::source_not_ready(
                "synthetic projection is not authorized",
            ));
        }

        let row_stride = (width as usize + self.row_padding_px) * RGBA_PIXEL_STRIDE;
        let pool = Arc::new(FramePool::new(row_stride * height as usize, POOL_BUFFERS));

        let (tx, rx) = mpsc::channel(FEED_DEPTH);
        let producer = tokio::spawn(produce_frames(ProducerConfig {
            width,
            height,
            row_stride,
            interval: self.frame_interval,
            pattern: self.pattern,
            budget: self.frame_budget,
            revoked: self.revoked.clone(),
            in_flight: self.in_flight.clone(),
            pool,
            tx,
        }));

        Ok(Box::new(SyntheticFeed {
            rx,
            producer: Some(producer),
        }))
    }
}

struct ProducerConfig {
    width: u32,
    height: u32,
    row_stride: usize,
    interval: Duration,
    pattern: FramePattern,
    budget: Option<u64>,
    revoked: Arc<AtomicBool>,
    in_flight: Arc<AtomicUsize>,
    pool: Arc<FramePool>,
    tx: mpsc::Sender<AcquiredFrame>,
}

async fn produce_frames(cfg: ProducerConfig) {
    let mut ticker = tokio::time::interval(cfg.interval);
    let mut produced = 0u64;

    loop {
        ticker.tick().await;
        if cfg.revoked.load(Ordering::Acquire) {
            break;
        }
        if cfg.budget.is_some_and(|budget| produced >= budget) {
            break;
        }

        let mut data = cfg.pool.acquire();
        fill_pattern(&mut data, cfg.width, cfg.height, cfg.row_stride, cfg.pattern);
        let buffer = PixelBuffer {
            width: cfg.width,
            height: cfg.height,
            pixel_stride: RGBA_PIXEL_STRIDE,
            row_stride: cfg.row_stride,
            data,
        };

        cfg.in_flight.fetch_add(1, Ordering::AcqRel);
        let pool = cfg.pool.clone();
        let in_flight = cfg.in_flight.clone();
        let frame = AcquiredFrame::new(
            buffer,
            Box::new(move |buffer| {
                pool.release(buffer.data);
                in_flight.fetch_sub(1, Ordering::AcqRel);
            }),
        );

        // A closed feed ends production; the unsent frame is dropped and
        // released through its guard.
        if cfg.tx.send(frame).await.is_err() {
            break;
        }
        produced += 1;
    }
}

fn fill_pattern(data: &mut [u8], width: u32, height: u32, row_stride: usize, pattern: FramePattern) {
    for y in 0..height {
        let row = y as usize * row_stride;
        for x in 0..width {
            let px = row + x as usize * RGBA_PIXEL_STRIDE;
            let rgba = match pattern {
                FramePattern::Solid(rgba) => rgba,
                FramePattern::Gradient => [
                    (x * 255 / width.max(1)) as u8,
                    (y * 255 / height.max(1)) as u8,
                    128,
                    255,
                ],
            };
            data[px..px + 4].copy_from_slice(&rgba);
        }
    }
}

struct SyntheticFeed {
    rx: mpsc::Receiver<AcquiredFrame>,
    producer: Option<JoinHandle<()>>,
}

#[async_trait]
impl FrameFeed for SyntheticFeed {
    async fn next_frame(&mut self) -> Option<AcquiredFrame> {
        self.rx.recv().await
    }

    async fn close(&mut self) {
        self.rx.close();
        if let Some(producer) = self.producer.take() {
            producer.abort();
            let _ = producer.await;
        }
        // Frames still queued in the channel release through their guards
        // as the receiver drains on drop.
    }
}

impl Drop for SyntheticFeed {
    fn drop(&mut self) {
        if let Some(producer) = self.producer.take() {
            producer.abort();
        }
    }
}

/// Externally revokes a [`SyntheticSource`], simulating the environment
/// withdrawing capture permission mid-session.
#[derive(Clone)]
pub struct RevokeHandle(Arc<AtomicBool>);

impl RevokeHandle {
    pub fn revoke(&self) {
        self.0.store(true, Ordering::Release);
    }
}
