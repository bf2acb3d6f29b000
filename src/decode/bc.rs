//! Decoding of DXT1, DXT3 and DXT5 blocks into 16 RGBA8 pixels.
//!
//! https://learn.microsoft.com/en-us/windows/win32/direct3d10/d3d10-graphics-programming-guide-resources-block-compression

use crate::color::{n4, B5G6R5};

trait ToRgba {
    fn to_rgba(self) -> [u8; 4];
}
impl ToRgba for [u8; 3] {
    #[inline(always)]
    fn to_rgba(self) -> [u8; 4] {
        [self[0], self[1], self[2], 255]
    }
}

/// Decodes a DXT1 block into 16 RGBA pixels.
///
/// Blocks with `color0 <= color1` use the 3 color mode with a transparent
/// black fourth entry.
pub(crate) fn dxt1_block(block_bytes: [u8; 8]) -> [[u8; 4]; 16] {
    let color0_u16 = u16::from_le_bytes([block_bytes[0], block_bytes[1]]);
    let color1_u16 = u16::from_le_bytes([block_bytes[2], block_bytes[3]]);

    let c0_bgr = B5G6R5::from_u16(color0_u16);
    let c1_bgr = B5G6R5::from_u16(color1_u16);

    let c0 = c0_bgr.to_n8().to_rgba();
    let c1 = c1_bgr.to_n8().to_rgba();

    let (c2, c3) = if color0_u16 > color1_u16 {
        (
            c0_bgr.one_third_color_rgb8(c1_bgr).to_rgba(),
            c1_bgr.one_third_color_rgb8(c0_bgr).to_rgba(),
        )
    } else {
        (
            c0_bgr.mid_color_rgb8(c1_bgr).to_rgba(),
            [0, 0, 0, 0], // transparent
        )
    };

    apply_color_indexes([c0, c1, c2, c3], &block_bytes)
}

/// The color half of DXT3 and DXT5 blocks always uses the 4 color mode.
fn color_block_four_mode(block_bytes: [u8; 8]) -> [[u8; 4]; 16] {
    let color0_u16 = u16::from_le_bytes([block_bytes[0], block_bytes[1]]);
    let color1_u16 = u16::from_le_bytes([block_bytes[2], block_bytes[3]]);

    let c0_bgr = B5G6R5::from_u16(color0_u16);
    let c1_bgr = B5G6R5::from_u16(color1_u16);

    let c0 = c0_bgr.to_n8().to_rgba();
    let c1 = c1_bgr.to_n8().to_rgba();
    let c2 = c0_bgr.one_third_color_rgb8(c1_bgr).to_rgba();
    let c3 = c1_bgr.one_third_color_rgb8(c0_bgr).to_rgba();

    apply_color_indexes([c0, c1, c2, c3], &block_bytes)
}

fn apply_color_indexes(lut: [[u8; 4]; 4], block_bytes: &[u8; 8]) -> [[u8; 4]; 16] {
    let mut pixels: [[u8; 4]; 16] = Default::default();

    let indexes = u32::from_le_bytes([
        block_bytes[4],
        block_bytes[5],
        block_bytes[6],
        block_bytes[7],
    ]);
    for (i, pixel) in pixels.iter_mut().enumerate() {
        let index = (indexes >> (i * 2)) & 0b11;
        *pixel = lut[index as usize];
    }

    pixels
}

fn split_16(x: [u8; 16]) -> ([u8; 8], [u8; 8]) {
    let lower = [x[0], x[1], x[2], x[3], x[4], x[5], x[6], x[7]];
    let upper = [x[8], x[9], x[10], x[11], x[12], x[13], x[14], x[15]];
    (lower, upper)
}

/// Decodes a DXT3 block (explicit 4 bit alpha) into 16 RGBA pixels.
pub(crate) fn dxt3_block(block_bytes: [u8; 16]) -> [[u8; 4]; 16] {
    let (alpha_bytes, color_bytes) = split_16(block_bytes);
    let mut pixels = color_block_four_mode(color_bytes);

    for i in 0..4 {
        let alpha_byte_high = alpha_bytes[i * 2];
        let alpha_byte_low = alpha_bytes[i * 2 + 1];
        let alpha = [
            alpha_byte_high & 0xF,
            alpha_byte_high >> 4,
            alpha_byte_low & 0xF,
            alpha_byte_low >> 4,
        ]
        .map(n4::n8);

        for (j, &alpha) in alpha.iter().enumerate() {
            pixels[i * 4 + j][3] = alpha;
        }
    }

    pixels
}

/// Decodes a DXT5 block (interpolated alpha) into 16 RGBA pixels.
pub(crate) fn dxt5_block(block_bytes: [u8; 16]) -> [[u8; 4]; 16] {
    let (alpha_bytes, color_bytes) = split_16(block_bytes);

    let mut pixels = color_block_four_mode(color_bytes);
    let alpha = alpha_block(alpha_bytes);

    for (pixel, alpha) in pixels.iter_mut().zip(alpha) {
        pixel[3] = alpha;
    }

    pixels
}

/// The 8 entry palette of a DXT5 alpha block.
pub(crate) fn alpha_palette(a0: u8, a1: u8) -> [u8; 8] {
    // Given a UNORM in the range `0..=255*7`, round to u8.
    fn from_interpolation_6(interpolation: u16) -> u8 {
        debug_assert!(interpolation <= 1785);
        ((interpolation as u32 * 9360 + 32160) >> 16) as u8
    }
    // Given a UNORM in the range `0..=255*5`, round to u8.
    fn from_interpolation_4(interpolation: u16) -> u8 {
        debug_assert!(interpolation <= 1275);
        ((interpolation as u32 * 13104 + 30288) >> 16) as u8
    }

    let c0 = a0 as u16;
    let c1 = a1 as u16;

    if a0 > a1 {
        // 6 interpolated values
        [
            a0,
            a1,
            from_interpolation_6(c0 * 6 + c1),
            from_interpolation_6(c0 * 5 + c1 * 2),
            from_interpolation_6(c0 * 4 + c1 * 3),
            from_interpolation_6(c0 * 3 + c1 * 4),
            from_interpolation_6(c0 * 2 + c1 * 5),
            from_interpolation_6(c0 + c1 * 6),
        ]
    } else {
        // 4 interpolated values
        [
            a0,
            a1,
            from_interpolation_4(c0 * 4 + c1),
            from_interpolation_4(c0 * 3 + c1 * 2),
            from_interpolation_4(c0 * 2 + c1 * 3),
            from_interpolation_4(c0 + c1 * 4),
            0,
            255,
        ]
    }
}

fn alpha_block(block_bytes: [u8; 8]) -> [u8; 16] {
    let lut = alpha_palette(block_bytes[0], block_bytes[1]);

    let mut alpha = [0; 16];
    let indexes0 = u32::from_le_bytes([block_bytes[2], block_bytes[3], block_bytes[4], 0]);
    let indexes1 = u32::from_le_bytes([block_bytes[5], block_bytes[6], block_bytes[7], 0]);
    for (i, indexes) in [indexes0, indexes1].into_iter().enumerate() {
        for j in 0..8 {
            let index = (indexes >> (j * 3)) & 0b111;
            alpha[i * 8 + j] = lut[index as usize];
        }
    }

    alpha
}
