//! # Planar YUV 4:2:0 Conversion
//!
//! Converts a packed RGBA buffer into the planar 4:2:0 layout downstream
//! video consumers expect: a full-resolution luma plane followed by two
//! quarter-resolution chroma planes, using the BT.601 integer transform.
//!
//! Plane order in the output is **Y, then V, then U**. This matches the
//! byte layout the original interface shipped (despite being labeled YV12
//! its chroma planes arrive V-first); consumers depend on the ordering, so
//! it is preserved here verbatim.

use crate::core::PixelBuffer;

/// Convert `buffer` into one planar YUV 4:2:0 byte buffer.
///
/// The output length is always exactly `width * height * 3 / 2`: a
/// `width * height` luma plane, then `width * height / 4` bytes of V, then
/// the same of U. Chroma is subsampled 2x2, taking the sample at each even
/// row and column on the floor grid, so odd dimensions never write past the
/// declared plane sizes (the trailing chroma bytes stay zero in that case).
///
/// Per pixel, with 8-bit R, G, B (alpha ignored) and signed 32-bit
/// arithmetic:
///
/// ```text
/// Y = ((66*R + 129*G +  25*B + 128) >> 8) +  16
/// U = ((-38*R - 74*G + 112*B + 128) >> 8) + 128
/// V = ((112*R - 94*G -  18*B + 128) >> 8) + 128
/// ```
///
/// Results are clamped to 0..=255 rather than wrapped, avoiding color
/// artifacts at extreme luma/chroma values.
///
/// Allocation-light by contract: one output buffer sized up front, no
/// per-pixel heap work. Rows are walked via the source strides, so padded
/// buffers convert correctly.
pub fn to_planar_yuv420(buffer: &PixelBuffer) -> Vec<u8> {
    let w = buffer.width as usize;
    let h = buffer.height as usize;
    let y_size = w * h;
    let chroma_size = y_size / 4;
    let v_base = y_size;
    let u_base = y_size + chroma_size;

    let chroma_w = w / 2;
    let chroma_h = h / 2;

    let mut yuv = vec![0u8; y_size + 2 * chroma_size];
    let mut y_index = 0;
    let mut chroma_index = 0;

    for j in 0..h {
        let row = j * buffer.row_stride;
        for i in 0..w {
            let px = row + i * buffer.pixel_stride;
            let r = buffer.data[px] as i32;
            let g = buffer.data[px + 1] as i32;
            let b = buffer.data[px + 2] as i32;

            let y = ((66 * r + 129 * g + 25 * b + 128) >> 8) + 16;
            yuv[y_index] = clamp_byte(y);
            y_index += 1;

            if j % 2 == 0 && i % 2 == 0 && j / 2 < chroma_h && i / 2 < chroma_w {
                let u = ((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128;
                let v = ((112 * r - 94 * g - 18 * b + 128) >> 8) + 128;
                yuv[v_base + chroma_index] = clamp_byte(v);
                yuv[u_base + chroma_index] = clamp_byte(u);
                chroma_index += 1;
            }
        }
    }

    yuv
}

#[inline]
fn clamp_byte(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}
