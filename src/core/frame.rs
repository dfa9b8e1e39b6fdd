//! # Frame Data Model
//!
//! Plain data types flowing through the pipeline: [`PixelBuffer`] wraps one
//! acquired raw frame, [`Region`] is an optional caller-supplied crop
//! rectangle.
//!
//! A `PixelBuffer` carries the strides the source declared for it. Sources
//! commonly over-allocate rows for alignment, so `row_stride` may exceed
//! `pixel_stride * width`; the difference is row padding and every consumer
//! of the buffer must walk rows by `row_stride`, never by `width`.

use crate::error::CaptureError;

/// Byte distance between two horizontally adjacent RGBA pixels.
pub const RGBA_PIXEL_STRIDE: usize = 4;

/// Pixel-format label reported in capture results.
pub const PIXEL_FORMAT_LABEL: &str = "RGBA_8888";

/// One raw frame: packed interleaved RGBA pixel data plus the strides and
/// dimensions the source declared for it.
///
/// Invariants, checked by [`PixelBuffer::new`]:
/// - `row_stride >= pixel_stride * width`
/// - `data.len() >= row_stride * height`
///
/// The buffer is immutable once constructed and owned exclusively by
/// whichever pipeline stage currently holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub pixel_stride: usize,
    pub row_stride: usize,
    pub data: Vec<u8>,
}

impl PixelBuffer {
    /// Construct a buffer, validating the stride and length invariants.
    pub fn new(
        width: u32,
        height: u32,
        pixel_stride: usize,
        row_stride: usize,
        data: Vec<u8>,
    ) -> Result<Self, CaptureError> {
        if pixel_stride == 0 {
            return Err(CaptureError::processing(
                "pixel_buffer",
                "pixel stride must be non-zero",
            ));
        }
        if row_stride < pixel_stride * width as usize {
            return Err(CaptureError::processing(
                "pixel_buffer",
                format!(
                    "row stride {} smaller than {} pixels at stride {}",
                    row_stride, width, pixel_stride
                ),
            ));
        }
        if data.len() < row_stride * height as usize {
            return Err(CaptureError::processing(
                "pixel_buffer",
                format!(
                    "data length {} smaller than {} rows of {} bytes",
                    data.len(),
                    height,
                    row_stride
                ),
            ));
        }
        Ok(Self {
            width,
            height,
            pixel_stride,
            row_stride,
            data,
        })
    }

    /// Construct a tightly-packed buffer (no row padding).
    pub fn packed(
        width: u32,
        height: u32,
        pixel_stride: usize,
        data: Vec<u8>,
    ) -> Result<Self, CaptureError> {
        let row_stride = pixel_stride * width as usize;
        Self::new(width, height, pixel_stride, row_stride, data)
    }

    /// Horizontal padding in pixels derived from the stride mismatch.
    ///
    /// Sources that over-allocate rows to satisfy stride alignment report a
    /// `row_stride` larger than `pixel_stride * width`; this converts the
    /// surplus bytes back into a pixel count.
    pub fn row_padding_px(&self) -> usize {
        (self.row_stride - self.pixel_stride * self.width as usize) / self.pixel_stride
    }

    /// Byte offset of the pixel at (x, y).
    pub fn pixel_offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.row_stride + x as usize * self.pixel_stride
    }
}

/// Caller-supplied crop rectangle in source pixel coordinates.
///
/// Absent means full frame. Before cropping, the x origin is corrected by
/// half the buffer's horizontal padding; see [`crate::processing::crop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Validate that the rectangle has a non-empty extent.
    pub fn validate(&self) -> Result<(), CaptureError> {
        if self.width == 0 {
            return Err(CaptureError::config("region.width", "must be positive"));
        }
        if self.height == 0 {
            return Err(CaptureError::config("region.height", "must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_invariants() {
        // Tight 2x2 RGBA buffer.
        let buf = PixelBuffer::packed(2, 2, RGBA_PIXEL_STRIDE, vec![0u8; 16]).unwrap();
        assert_eq!(buf.row_stride, 8);
        assert_eq!(buf.row_padding_px(), 0);

        // Row stride below the pixel row is rejected.
        assert!(PixelBuffer::new(2, 2, RGBA_PIXEL_STRIDE, 4, vec![0u8; 16]).is_err());

        // Short data is rejected.
        assert!(PixelBuffer::new(2, 2, RGBA_PIXEL_STRIDE, 8, vec![0u8; 15]).is_err());
    }

    #[test]
    fn test_row_padding_px() {
        // 1000px wide at 4 bytes/pixel with 4096-byte rows: 24px of padding.
        let buf =
            PixelBuffer::new(1000, 1, RGBA_PIXEL_STRIDE, 4096, vec![0u8; 4096]).unwrap();
        assert_eq!(buf.row_padding_px(), 24);
    }

    #[test]
    fn test_pixel_offset() {
        let buf = PixelBuffer::new(2, 2, RGBA_PIXEL_STRIDE, 12, vec![0u8; 24]).unwrap();
        assert_eq!(buf.pixel_offset(1, 1), 16);
    }

    #[test]
    fn test_region_validation() {
        assert!(Region::new(0, 0, 10, 10).validate().is_ok());
        assert!(Region::new(0, 0, 0, 10).validate().is_err());
        assert!(Region::new(0, 0, 10, 0).validate().is_err());
    }
}
