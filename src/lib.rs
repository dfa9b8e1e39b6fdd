//! # Mirror Capture Library
//!
//! Frame capture from a screen-mirroring surface, on demand or as a
//! rate-limited stream. Each acquired frame flows through a fixed pipeline:
//! throttling gate, padding-corrected crop, planar YUV 4:2:0 conversion,
//! and JPEG still-image encoding, and is delivered as a structured
//! [`CaptureResult`] record.
//!
//! ## Architecture
//!
//! The library is organized into a few key modules:
//! - `capture`: the projection-source boundary and a synthetic in-process
//!   source for tests and demos
//! - `processing`: the per-frame pipeline stages (gate, crop, YUV, JPEG)
//! - `core`: raw frame buffers, crop regions, and the frame pool
//! - `config`: session configuration and validation
//! - `session`: single-shot and continuous orchestration
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mirror_capture::capture::SyntheticSource;
//! use mirror_capture::{CaptureConfig, CaptureSession, Region};
//!
//! # async fn example() -> Result<(), mirror_capture::CaptureError> {
//! let source = Arc::new(SyntheticSource::new(1280, 720));
//! let session = CaptureSession::new(source);
//!
//! // Single snapshot of a cropped region.
//! let shot = session.take_capture(Some(Region::new(100, 100, 640, 360))).await?;
//! assert_eq!(shot.queue, 1);
//!
//! // Continuous capture at 10 fps until stopped.
//! let mut frames = session.start(CaptureConfig::new().with_fps(10)).await?;
//! while let Some(result) = frames.recv().await {
//!     println!("frame {} at {}", result.queue, result.time);
//!     break;
//! }
//! session.stop().await;
//! # Ok(())
//! # }
//! ```

pub mod capture;
pub mod config;
pub mod core;
pub mod error;
pub mod processing;
pub mod session;

pub use config::CaptureConfig;
pub use core::{PixelBuffer, Region};
pub use error::CaptureError;
pub use session::{CaptureResult, CaptureSession};
