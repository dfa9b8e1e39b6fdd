//! # Still-Image Encoding
//!
//! JPEG encoding of a cropped frame for the `bytes` field of a capture
//! result. This is an output convenience at the edge of the pipeline, not
//! part of the conversion core; quality is fixed at 100 to match the
//! interface contract callers already depend on.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;

use crate::core::PixelBuffer;
use crate::error::CaptureError;

const JPEG_QUALITY: u8 = 100;

/// Encode `buffer` as a JPEG still image.
///
/// JPEG carries no alpha channel, so the RGBA source is flattened to RGB
/// rows first, stride-aware. Failures surface as a `Processing` error like
/// any other pipeline stage.
pub fn encode_jpeg(buffer: &PixelBuffer) -> Result<Vec<u8>, CaptureError> {
    let w = buffer.width as usize;
    let h = buffer.height as usize;

    let mut rgb = Vec::with_capacity(w * h * 3);
    for j in 0..h {
        let row = j * buffer.row_stride;
        for i in 0..w {
            let px = row + i * buffer.pixel_stride;
            rgb.extend_from_slice(&buffer.data[px..px + 3]);
        }
    }

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
        .encode(&rgb, buffer.width, buffer.height, ExtendedColorType::Rgb8)
        .map_err(|e| CaptureError::processing("jpeg_encode", e.to_string()))?;
    Ok(out)
}
