//! # Core Data Types
//!
//! Fundamental pipeline data: raw frame buffers, crop regions, and the
//! bounded buffer pool backing frame delivery.

pub mod frame;
pub mod frame_pool;

pub use frame::{PixelBuffer, Region, PIXEL_FORMAT_LABEL, RGBA_PIXEL_STRIDE};
pub use frame_pool::FramePool;
