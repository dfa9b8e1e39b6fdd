//! # Capture Source Boundary
//!
//! Abstract interface to the environment-provided origin of raw frames.
//! Everything the pipeline needs from its platform is expressed here:
//! an authorized projection source, a frame feed bound to a virtual
//! surface of a requested size, and per-frame release back to the
//! source's bounded buffer pool.
//!
//! Release is the safety-critical part of this boundary. The source owns
//! a small fixed set of frame slots; a frame that is never given back
//! starves the pool and stalls frame production. [`AcquiredFrame`] makes
//! release automatic: dropping the frame returns the buffer to the
//! source exactly once, on every exit path, whether the frame was
//! processed, gate-rejected, or abandoned by a failing pipeline stage.

use async_trait::async_trait;

use crate::core::PixelBuffer;
use crate::error::CaptureError;

/// Callback that returns a frame's storage to its source.
pub type ReleaseFn = Box<dyn FnOnce(PixelBuffer) + Send>;

/// One raw frame borrowed from a capture source.
///
/// The pipeline reads the frame through [`AcquiredFrame::buffer`]; the
/// underlying storage goes back to the source when the frame is dropped.
pub struct AcquiredFrame {
    buffer: Option<PixelBuffer>,
    release: Option<ReleaseFn>,
}

impl AcquiredFrame {
    /// Wrap a buffer together with its release callback.
    pub fn new(buffer: PixelBuffer, release: ReleaseFn) -> Self {
        Self {
            buffer: Some(buffer),
            release: Some(release),
        }
    }

    /// Wrap a buffer that needs no release, for tests and synthetic data.
    pub fn detached(buffer: PixelBuffer) -> Self {
        Self {
            buffer: Some(buffer),
            release: None,
        }
    }

    /// The frame's pixel data.
    pub fn buffer(&self) -> &PixelBuffer {
        self.buffer
            .as_ref()
            .expect("buffer only vacated on drop")
    }
}

impl Drop for AcquiredFrame {
    fn drop(&mut self) {
        if let (Some(buffer), Some(release)) = (self.buffer.take(), self.release.take()) {
            release(buffer);
        }
    }
}

impl std::fmt::Debug for AcquiredFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcquiredFrame")
            .field("buffer", &self.buffer)
            .finish_non_exhaustive()
    }
}

/// Subscription to a source's frame deliveries.
///
/// A feed yields frames for as long as the source produces them and ends
/// (returns `None`) when the source is revoked by the environment, the
/// producer finishes, or the feed is closed. The sequence is finite while
/// a session is running; consumers treat `None` as the external stop
/// signal.
#[async_trait]
pub trait FrameFeed: Send {
    /// Wait for the next delivered frame. `None` means the feed ended:
    /// no further frames will ever arrive.
    async fn next_frame(&mut self) -> Option<AcquiredFrame>;

    /// Release the feed's resources. Idempotent.
    async fn close(&mut self);
}

impl std::fmt::Debug for dyn FrameFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn FrameFeed")
    }
}

/// An authorized projection of a mirrored display.
///
/// Implementations wrap whatever the platform hands out once the user has
/// granted capture permission. The pipeline only ever asks three things of
/// it: whether it is still authorized, how large the mirrored display is,
/// and a frame feed bound to a virtual surface of a given size.
///
/// Source implementations are the producers of
/// [`CaptureError::PlatformUnsupported`]: a backend whose environment
/// lacks the capture capability (missing compositor protocol, OS too old)
/// reports it from [`ProjectionSource::open_feed`]. The synthetic source
/// never raises it.
#[async_trait]
pub trait ProjectionSource: Send + Sync {
    /// Whether the source is authorized and able to open feeds.
    fn is_ready(&self) -> bool;

    /// Native size of the mirrored display in pixels.
    fn display_size(&self) -> (u32, u32);

    /// Create a virtual target surface of the given size and subscribe to
    /// its frames. Each call opens an independent feed; single-shot capture
    /// uses a transient one while a continuous session holds its own.
    async fn open_feed(
        &self,
        width: u32,
        height: u32,
    ) -> Result<Box<dyn FrameFeed>, CaptureError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PixelBuffer, RGBA_PIXEL_STRIDE};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn test_buffer() -> PixelBuffer {
        PixelBuffer::packed(2, 2, RGBA_PIXEL_STRIDE, vec![0u8; 16]).unwrap()
    }

    #[test]
    fn test_frame_releases_on_drop() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = released.clone();
        let frame = AcquiredFrame::new(
            test_buffer(),
            Box::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        assert_eq!(frame.buffer().width, 2);
        drop(frame);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_detached_frame_needs_no_release() {
        let frame = AcquiredFrame::detached(test_buffer());
        assert_eq!(frame.buffer().height, 2);
    }
}
