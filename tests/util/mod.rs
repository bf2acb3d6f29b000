#![allow(unused)]

use glam::Vec4;
use rand::{Rng, SeedableRng};
use texture_pipeline::*;

pub fn create_rng() -> impl Rng {
    rand_chacha::ChaChaRng::seed_from_u64(123456789)
}

/// A 2D image with random values in `[0, 1]`.
pub fn random_image(rng: &mut impl Rng, width: u32, height: u32, format: ColorFormat) -> Image {
    let mut image = Image::new(width, height, format).unwrap();
    fill_random(rng, &mut image, 0);
    image
}

/// Fills a face (or volume slice) with random values in `[0, 1]`.
pub fn fill_random(rng: &mut impl Rng, image: &mut Image, face: usize) {
    for y in 0..image.height() {
        for x in 0..image.width() {
            let color = Vec4::new(rng.gen(), rng.gen(), rng.gen(), rng.gen());
            assert!(image.write(x, y, face, color));
        }
    }
}

/// An image where every texel has the same color.
pub fn solid_image(width: u32, height: u32, color: Vec4) -> Image {
    let mut image = Image::new(width, height, ColorFormat::RGBAFloatMap).unwrap();
    for y in 0..height {
        for x in 0..width {
            image.write(x, y, 0, color);
        }
    }
    image
}

pub fn options(format: OutputColorFormat) -> MipGenOptions {
    let mut options = MipGenOptions::default();
    options.output_format = format;
    options
}

/// Writes a mip set and returns the bytes of the DDS file.
pub fn write_to_vec(mips: &MipSet) -> Vec<u8> {
    let mut out = Vec::new();
    mips.write_dds(&mut out).unwrap();
    out
}

/// The header bytes of a DDS file as little endian integers, magic included.
pub fn header_ints(file: &[u8]) -> Vec<u32> {
    file[..128]
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

pub fn set_header_int(file: &mut [u8], index: usize, value: u32) {
    file[index * 4..index * 4 + 4].copy_from_slice(&value.to_le_bytes());
}

pub fn assert_close(a: Vec4, b: Vec4, tolerance: f32) {
    assert!(
        (a - b).abs().max_element() <= tolerance,
        "{:?} != {:?} (tolerance {})",
        a,
        b,
        tolerance
    );
}
