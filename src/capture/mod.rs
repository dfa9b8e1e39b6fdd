//! # Capture Module
//!
//! The boundary to the environment that produces raw frames: the
//! [`source::ProjectionSource`] contract and the in-process synthetic
//! implementation used by tests and the CLI demo.

pub mod source;
pub mod synthetic;

pub use source::{AcquiredFrame, FrameFeed, ProjectionSource, ReleaseFn};
pub use synthetic::{FramePattern, RevokeHandle, SyntheticSource};
