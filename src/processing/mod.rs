//! # Frame Processing Pipeline
//!
//! The per-frame conversion stages, in the order a frame flows through
//! them: rate gate, crop, planar YUV conversion, still-image encode. Each
//! stage is a pure function over [`crate::core::PixelBuffer`] so the
//! pipeline stays independently testable; orchestration and state live in
//! [`crate::session`].

pub mod crop;
pub mod encode;
pub mod gate;
pub mod yuv;

pub use crop::crop;
pub use encode::encode_jpeg;
pub use gate::FrameGate;
pub use yuv::to_planar_yuv420;
