//! # Error Handling
//!
//! Error types for the capture pipeline. The library reports failures through
//! a single [`CaptureError`] enum whose variants map one-to-one onto the
//! failure modes a caller can observe:
//!
//! - `SourceNotReady`: no authorized projection source is available
//! - `AlreadyRunning`: a continuous session is already active
//! - `NoFrameAvailable`: a single-shot capture timed out without a frame
//! - `Processing`: crop/convert/encode failed for one frame
//! - `PlatformUnsupported`: the environment lacks a required capability
//! - `Config`: a configuration field failed validation
//!
//! In continuous mode a `Processing` error on one frame never terminates the
//! session; it is logged and the session moves on to the next frame. All
//! other variants are surfaced directly to the caller.

use std::{error::Error as StdError, fmt};

/// Base error type for the capture library.
#[derive(Debug)]
pub enum CaptureError {
    /// No authorized capture source is available to open a frame feed.
    SourceNotReady { reason: String },
    /// `start` was called while a session is already running.
    AlreadyRunning,
    /// Single-shot capture waited for a frame that never arrived.
    NoFrameAvailable { waited_ms: u64 },
    /// A pipeline stage (crop, colorspace conversion, still-image encode)
    /// failed while processing one frame.
    Processing { operation: String, reason: String },
    /// The environment is missing a capability the pipeline requires.
    /// Raised by [`crate::capture::ProjectionSource`] implementations whose
    /// platform cannot open a frame feed.
    PlatformUnsupported { capability: String },
    /// Configuration validation failed.
    Config { field: String, reason: String },
}

impl CaptureError {
    /// Create a `SourceNotReady` error.
    pub fn source_not_ready(reason: impl Into<String>) -> Self {
        Self::SourceNotReady {
            reason: reason.into(),
        }
    }

    /// Create a `NoFrameAvailable` error.
    pub fn no_frame_available(waited_ms: u64) -> Self {
        Self::NoFrameAvailable { waited_ms }
    }

    /// Create a `Processing` error for a named pipeline stage.
    pub fn processing(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Processing {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create a `PlatformUnsupported` error.
    pub fn platform_unsupported(capability: impl Into<String>) -> Self {
        Self::PlatformUnsupported {
            capability: capability.into(),
        }
    }

    /// Create a `Config` error for a named field.
    pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Get the error category as a string, used for log context.
    pub fn category(&self) -> &'static str {
        match self {
            Self::SourceNotReady { .. } => "source_not_ready",
            Self::AlreadyRunning => "already_running",
            Self::NoFrameAvailable { .. } => "no_frame_available",
            Self::Processing { .. } => "processing",
            Self::PlatformUnsupported { .. } => "platform_unsupported",
            Self::Config { .. } => "config",
        }
    }

    /// Whether the failure may resolve on its own if the operation is
    /// repeated. A missed single-shot frame is transient; a rejected start,
    /// bad configuration, or missing capability is not.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NoFrameAvailable { .. })
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::SourceNotReady { reason } => {
                write!(f, "capture source not ready: {}", reason)
            }
            CaptureError::AlreadyRunning => {
                write!(f, "capture session already running")
            }
            CaptureError::NoFrameAvailable { waited_ms } => {
                write!(f, "no frame available after {}ms", waited_ms)
            }
            CaptureError::Processing { operation, reason } => {
                write!(f, "processing failed during {}: {}", operation, reason)
            }
            CaptureError::PlatformUnsupported { capability } => {
                write!(f, "platform capability unavailable: {}", capability)
            }
            CaptureError::Config { field, reason } => {
                write!(f, "configuration error in '{}': {}", field, reason)
            }
        }
    }
}

impl StdError for CaptureError {}
