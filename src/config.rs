//! # Configuration
//!
//! Parameters for a capture session: the target frame rate for continuous
//! mode and an optional crop region applied to every processed frame. The
//! struct validates itself at the session boundary so invalid rates are
//! rejected before any capture resource is touched.

use crate::core::Region;
use crate::error::CaptureError;

/// Default continuous-capture rate when the caller does not specify one.
pub const DEFAULT_FPS: u32 = 15;

/// Highest accepted target rate; real mirroring surfaces never exceed this.
pub const MAX_FPS: u32 = 240;

/// Configuration for a capture session.
///
/// `fps == 0` is meaningful: it disables throttling entirely and processes
/// frames as fast as the source delivers them.
#[derive(Debug, Clone, Default)]
pub struct CaptureConfig {
    /// Target frames per second for continuous capture. Zero means
    /// unthrottled. Defaults to [`DEFAULT_FPS`] via [`CaptureConfig::new`].
    pub fps: u32,

    /// Optional crop rectangle applied to every frame, in source pixel
    /// coordinates. Absent means full frame.
    pub region: Option<Region>,
}

impl CaptureConfig {
    /// Configuration with the default frame rate and no crop.
    pub fn new() -> Self {
        Self {
            fps: DEFAULT_FPS,
            region: None,
        }
    }

    /// Set the target frame rate (0 = unthrottled).
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Set the crop region.
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// Validate field ranges.
    pub fn validate(&self) -> Result<(), CaptureError> {
        if self.fps > MAX_FPS {
            return Err(CaptureError::config(
                "fps",
                format!("must be at most {}", MAX_FPS),
            ));
        }
        if let Some(region) = &self.region {
            region.validate()?;
        }
        Ok(())
    }
}
