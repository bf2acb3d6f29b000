//! Range fit encoding of DXT1, DXT3 and DXT5 blocks.
//!
//! Endpoints are the corners of the color bounding box of the block. Every
//! pixel then picks the nearest palette entry. This is fast and exact for
//! solid and two tone blocks, which is what the mip pipeline mostly feeds it.

use crate::{
    color::{n4, B5G6R5},
    decode::bc::alpha_palette,
};

/// Pixels with less alpha than this are transparent in DXT1 blocks.
const DXT1_ALPHA_THRESHOLD: u8 = 128;

fn distance_sq(a: &[u8; 4], b: &[u8; 4]) -> u32 {
    let dr = a[0] as i32 - b[0] as i32;
    let dg = a[1] as i32 - b[1] as i32;
    let db = a[2] as i32 - b[2] as i32;
    (dr * dr + dg * dg + db * db) as u32
}

fn bounding_box(pixels: &[[u8; 4]; 16], include: impl Fn(&[u8; 4]) -> bool) -> ([u8; 3], [u8; 3]) {
    let mut min = [255_u8; 3];
    let mut max = [0_u8; 3];
    let mut any = false;

    for pixel in pixels.iter().filter(|p| include(p)) {
        any = true;
        for c in 0..3 {
            min[c] = min[c].min(pixel[c]);
            max[c] = max[c].max(pixel[c]);
        }
    }

    if any {
        (max, min)
    } else {
        ([0; 3], [0; 3])
    }
}

fn nearest_index(pixel: &[u8; 4], palette: &[[u8; 4]]) -> u32 {
    let mut best_dist = u32::MAX;
    let mut best_index = 0;
    for (index, color) in palette.iter().enumerate() {
        let dist = distance_sq(pixel, color);
        if dist < best_dist {
            best_dist = dist;
            best_index = index as u32;
        }
    }
    best_index
}

fn palette_rgba(c: [u8; 3]) -> [u8; 4] {
    [c[0], c[1], c[2], 255]
}

/// Encodes the color half of a block.
///
/// `allow_transparency` enables the DXT1 3 color mode for blocks that
/// contain transparent pixels. Otherwise the block always uses the 4 color
/// mode, as required by DXT3 and DXT5.
fn encode_color(pixels: &[[u8; 4]; 16], allow_transparency: bool) -> [u8; 8] {
    let transparent = |p: &[u8; 4]| allow_transparency && p[3] < DXT1_ALPHA_THRESHOLD;
    let has_transparency = pixels.iter().any(|p| transparent(p));

    let (max, min) = bounding_box(pixels, |p| !transparent(p));
    let mut c0 = B5G6R5::from_rgb8(max);
    let mut c1 = B5G6R5::from_rgb8(min);

    let mut indexes = 0_u32;
    if has_transparency {
        // 3 color mode: color0 <= color1, index 3 is transparent black
        if c0.to_u16() > c1.to_u16() {
            std::mem::swap(&mut c0, &mut c1);
        }
        let palette = [
            palette_rgba(c0.to_n8()),
            palette_rgba(c1.to_n8()),
            palette_rgba(c0.mid_color_rgb8(c1)),
        ];
        for (i, pixel) in pixels.iter().enumerate() {
            let index = if transparent(pixel) {
                3
            } else {
                nearest_index(pixel, &palette)
            };
            indexes |= index << (i * 2);
        }
    } else {
        // 4 color mode: color0 > color1. Equal endpoints keep all indexes at 0.
        if c0.to_u16() < c1.to_u16() {
            std::mem::swap(&mut c0, &mut c1);
        }
        if c0.to_u16() != c1.to_u16() {
            let palette = [
                palette_rgba(c0.to_n8()),
                palette_rgba(c1.to_n8()),
                palette_rgba(c0.one_third_color_rgb8(c1)),
                palette_rgba(c1.one_third_color_rgb8(c0)),
            ];
            for (i, pixel) in pixels.iter().enumerate() {
                indexes |= nearest_index(pixel, &palette) << (i * 2);
            }
        }
    }

    let mut output = [0_u8; 8];
    output[0..2].copy_from_slice(&c0.to_u16().to_le_bytes());
    output[2..4].copy_from_slice(&c1.to_u16().to_le_bytes());
    output[4..8].copy_from_slice(&indexes.to_le_bytes());
    output
}

/// Encodes 16 RGBA pixels into a DXT1 block.
pub(crate) fn dxt1_block(pixels: &[[u8; 4]; 16]) -> [u8; 8] {
    encode_color(pixels, true)
}

/// Encodes 16 RGBA pixels into a DXT3 block with explicit 4 bit alpha.
pub(crate) fn dxt3_block(pixels: &[[u8; 4]; 16]) -> [u8; 16] {
    let mut output = [0_u8; 16];

    for (i, pair) in pixels.chunks_exact(2).enumerate() {
        let low = n4::from_n8(pair[0][3]);
        let high = n4::from_n8(pair[1][3]);
        output[i] = low | (high << 4);
    }
    output[8..].copy_from_slice(&encode_color(pixels, false));

    output
}

/// Encodes 16 RGBA pixels into a DXT5 block with interpolated alpha.
pub(crate) fn dxt5_block(pixels: &[[u8; 4]; 16]) -> [u8; 16] {
    let mut output = [0_u8; 16];

    let max = pixels.iter().map(|p| p[3]).max().unwrap_or(255);
    let min = pixels.iter().map(|p| p[3]).min().unwrap_or(255);

    output[0] = max;
    output[1] = min;
    if max != min {
        let palette = alpha_palette(max, min);
        let mut indexes = 0_u64;
        for (i, pixel) in pixels.iter().enumerate() {
            let alpha = pixel[3];
            let mut best_dist = u32::MAX;
            let mut best_index = 0_u64;
            for (index, &value) in palette.iter().enumerate() {
                let dist = (alpha as i32 - value as i32).unsigned_abs();
                if dist < best_dist {
                    best_dist = dist;
                    best_index = index as u64;
                }
            }
            indexes |= best_index << (i * 3);
        }
        output[2..8].copy_from_slice(&indexes.to_le_bytes()[..6]);
    }
    output[8..].copy_from_slice(&encode_color(pixels, false));

    output
}
