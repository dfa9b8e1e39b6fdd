//! # Cropper
//!
//! Restricts an acquired frame to a caller-supplied region, correcting the
//! crop origin for stride-derived row padding.
//!
//! Mirroring surfaces over-allocate rows to satisfy alignment, so the
//! visible image sits inside a slightly wider buffer. The caller's region is
//! expressed in visible pixel coordinates; shifting its x origin by half the
//! horizontal padding lands the crop on the intended pixels instead of
//! drifting into padding columns. This correction is a hard invariant of the
//! crop operation, not an optional refinement.

use crate::core::{PixelBuffer, Region};
use crate::error::CaptureError;

/// Crop `src` to `region`.
///
/// With no region this is the identity: the buffer comes back unchanged,
/// strides and all. With a region, the effective origin x is
/// `region.x + padding / 2` where
/// `padding = (row_stride - pixel_stride * width) / pixel_stride`, and the
/// rectangle is clamped to the buffer bounds before any row is read, so an
/// oversized region yields the intersection rather than an out-of-bounds
/// read. An empty intersection is a `Processing` error.
///
/// The output buffer is tightly packed: `row_stride` is recomputed as
/// `pixel_stride * width` with no padding.
pub fn crop(src: &PixelBuffer, region: Option<&Region>) -> Result<PixelBuffer, CaptureError> {
    let region = match region {
        Some(region) => region,
        None => return Ok(src.clone()),
    };
    region.validate()?;

    let padding = src.row_padding_px();
    let origin_x = region.x as usize + padding / 2;
    let origin_y = region.y as usize;

    // Clamp the corrected rectangle to the buffer bounds. The padded columns
    // on the right edge are not meaningful image content, so clamping stops
    // at the declared width rather than the allocated one.
    let max_x = src.width as usize;
    let max_y = src.height as usize;
    let x0 = origin_x.min(max_x);
    let y0 = origin_y.min(max_y);
    let out_w = (region.width as usize).min(max_x - x0);
    let out_h = (region.height as usize).min(max_y - y0);
    if out_w == 0 || out_h == 0 {
        return Err(CaptureError::processing(
            "crop",
            format!(
                "region {}x{} at ({}, {}) does not intersect {}x{} buffer",
                region.width, region.height, region.x, region.y, src.width, src.height
            ),
        ));
    }

    let pixel_stride = src.pixel_stride;
    let out_row = pixel_stride * out_w;
    let mut data = Vec::with_capacity(out_row * out_h);
    for j in 0..out_h {
        let start = (y0 + j) * src.row_stride + x0 * pixel_stride;
        data.extend_from_slice(&src.data[start..start + out_row]);
    }

    Ok(PixelBuffer {
        width: out_w as u32,
        height: out_h as u32,
        pixel_stride,
        row_stride: out_row,
        data,
    })
}
