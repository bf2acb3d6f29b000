use glam::Vec4;

use crate::FormatError;

mod formats;

pub(crate) use formats::*;
pub use formats::{
    color_format_create_rgbe, color_format_expand_rgbe, linear_to_srgb, srgb_to_linear,
};

/// The in-memory pixel encodings an [`crate::Image`] can be filled from and
/// packed into.
///
/// All multi-byte formats are little endian. The channel order in the name
/// is from the most significant to the least significant bits, so
/// `ARGB8888` stores blue in the first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorFormat {
    ARGB8888,
    ARGB4444,
    ARGB1555,
    RGB565,
    A8,
    L8,
    AL88,
    L16,
    /// Four `f32` values in RGBA order.
    RGBAFloatMap,
    /// Four half floats in RGBA order.
    RGBAHalfMap,
    /// Luminance as a single `f32`.
    F32,
    /// Red and green as two `f32`.
    F32F32,
    /// Luminance as a single half float.
    F16,
    /// Red and green as two half floats.
    F16F16,
    /// Shared exponent RGB, see [`color_format_create_rgbe`].
    RGBE,
}

type EncodeFn = fn(Vec4, bool, &mut [u8]);
type DecodeFn = fn(&[u8]) -> Vec4;

struct FormatInfo {
    bits_per_pixel: u8,
    has_alpha: bool,
    is_hdr: bool,
    name: &'static str,
    encode: EncodeFn,
    decode: DecodeFn,
}

/// Indexed by `ColorFormat as usize`.
static FORMAT_INFO: [FormatInfo; ColorFormat::COUNT] = [
    FormatInfo {
        bits_per_pixel: 32,
        has_alpha: true,
        is_hdr: false,
        name: "ARGB8888",
        encode: codec::encode_argb8888,
        decode: codec::decode_argb8888,
    },
    FormatInfo {
        bits_per_pixel: 16,
        has_alpha: true,
        is_hdr: false,
        name: "ARGB4444",
        encode: codec::encode_argb4444,
        decode: codec::decode_argb4444,
    },
    FormatInfo {
        bits_per_pixel: 16,
        has_alpha: true,
        is_hdr: false,
        name: "ARGB1555",
        encode: codec::encode_argb1555,
        decode: codec::decode_argb1555,
    },
    FormatInfo {
        bits_per_pixel: 16,
        has_alpha: false,
        is_hdr: false,
        name: "RGB565",
        encode: codec::encode_rgb565,
        decode: codec::decode_rgb565,
    },
    FormatInfo {
        bits_per_pixel: 8,
        has_alpha: true,
        is_hdr: false,
        name: "A8",
        encode: codec::encode_a8,
        decode: codec::decode_a8,
    },
    FormatInfo {
        bits_per_pixel: 8,
        has_alpha: false,
        is_hdr: false,
        name: "L8",
        encode: codec::encode_l8,
        decode: codec::decode_l8,
    },
    FormatInfo {
        bits_per_pixel: 16,
        has_alpha: true,
        is_hdr: false,
        name: "AL88",
        encode: codec::encode_al88,
        decode: codec::decode_al88,
    },
    FormatInfo {
        bits_per_pixel: 16,
        has_alpha: false,
        is_hdr: true,
        name: "L16",
        encode: codec::encode_l16,
        decode: codec::decode_l16,
    },
    FormatInfo {
        bits_per_pixel: 128,
        has_alpha: true,
        is_hdr: true,
        name: "RGBAFloatMap",
        encode: codec::encode_float_map,
        decode: codec::decode_float_map,
    },
    FormatInfo {
        bits_per_pixel: 64,
        has_alpha: true,
        is_hdr: true,
        name: "RGBAHalfMap",
        encode: codec::encode_half_map,
        decode: codec::decode_half_map,
    },
    FormatInfo {
        bits_per_pixel: 32,
        has_alpha: false,
        is_hdr: true,
        name: "F32",
        encode: codec::encode_f32,
        decode: codec::decode_f32,
    },
    FormatInfo {
        bits_per_pixel: 64,
        has_alpha: false,
        is_hdr: true,
        name: "F32F32",
        encode: codec::encode_f32f32,
        decode: codec::decode_f32f32,
    },
    FormatInfo {
        bits_per_pixel: 16,
        has_alpha: false,
        is_hdr: true,
        name: "F16",
        encode: codec::encode_f16,
        decode: codec::decode_f16,
    },
    FormatInfo {
        bits_per_pixel: 32,
        has_alpha: false,
        is_hdr: true,
        name: "F16F16",
        encode: codec::encode_f16f16,
        decode: codec::decode_f16f16,
    },
    FormatInfo {
        bits_per_pixel: 32,
        has_alpha: false,
        is_hdr: true,
        name: "RGBE",
        encode: codec::encode_rgbe,
        decode: codec::decode_rgbe,
    },
];

impl ColorFormat {
    pub(crate) const COUNT: usize = 15;

    /// All color formats in declaration order.
    pub const ALL: [ColorFormat; Self::COUNT] = [
        ColorFormat::ARGB8888,
        ColorFormat::ARGB4444,
        ColorFormat::ARGB1555,
        ColorFormat::RGB565,
        ColorFormat::A8,
        ColorFormat::L8,
        ColorFormat::AL88,
        ColorFormat::L16,
        ColorFormat::RGBAFloatMap,
        ColorFormat::RGBAHalfMap,
        ColorFormat::F32,
        ColorFormat::F32F32,
        ColorFormat::F16,
        ColorFormat::F16F16,
        ColorFormat::RGBE,
    ];

    #[inline(always)]
    fn info(self) -> &'static FormatInfo {
        &FORMAT_INFO[self as usize]
    }

    pub fn bits_per_pixel(self) -> u32 {
        self.info().bits_per_pixel as u32
    }
    pub fn bytes_per_pixel(self) -> usize {
        self.info().bits_per_pixel as usize / 8
    }
    pub fn has_alpha(self) -> bool {
        self.info().has_alpha
    }
    /// Whether the format stores floating point or high dynamic range data.
    ///
    /// Exposure and gamma adjustments are only valid for these formats.
    pub fn is_hdr(self) -> bool {
        self.info().is_hdr
    }
    pub fn name(self) -> &'static str {
        self.info().name
    }
}

impl std::fmt::Display for ColorFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The encoded bytes of a single pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBytes {
    bytes: [u8; 16],
    len: u8,
}
impl PixelBytes {
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }
    /// The first 4 bytes as a little endian integer, zero extended for
    /// formats smaller than 32 bits.
    pub fn to_u32(&self) -> u32 {
        u32::from_le_bytes([self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3]])
    }
}
impl std::ops::Deref for PixelBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

/// Packs `r.len()` pixels from four channel planes into `dst`.
///
/// Integer formats clamp to `[0, 1]` and, if `convert_to_srgb` is set, apply
/// the linear to sRGB curve to the color channels before quantizing. Float
/// formats store the values as they are.
pub fn make_color_format_batch(
    dst: &mut [u8],
    format: ColorFormat,
    r: &[f32],
    g: &[f32],
    b: &[f32],
    a: &[f32],
    convert_to_srgb: bool,
) -> Result<(), FormatError> {
    let count = r.len();
    let smallest = g.len().min(b.len()).min(a.len());
    if smallest < count {
        return Err(FormatError::BufferTooSmall {
            format,
            expected: count,
            actual: smallest,
        });
    }

    let bytes_per_pixel = format.bytes_per_pixel();
    let required = count * bytes_per_pixel;
    if dst.len() < required {
        return Err(FormatError::BufferTooSmall {
            format,
            expected: required,
            actual: dst.len(),
        });
    }

    let encode = format.info().encode;
    for (i, out) in dst[..required].chunks_exact_mut(bytes_per_pixel).enumerate() {
        encode(Vec4::new(r[i], g[i], b[i], a[i]), convert_to_srgb, out);
    }

    Ok(())
}

/// Packs a single pixel.
pub fn make_color_format_pixel(format: ColorFormat, rgba: Vec4, convert_to_srgb: bool) -> PixelBytes {
    let mut bytes = [0; 16];
    let len = format.bytes_per_pixel();
    (format.info().encode)(rgba, convert_to_srgb, &mut bytes[..len]);
    PixelBytes {
        bytes,
        len: len as u8,
    }
}

/// Unpacks a single pixel to RGBA.
///
/// Returns `None` if `bytes` is shorter than one pixel of `format`.
pub fn make_hdr_pixel(bytes: &[u8], format: ColorFormat) -> Option<Vec4> {
    let pixel = bytes.get(..format.bytes_per_pixel())?;
    Some((format.info().decode)(pixel))
}

/// Per-format encode and decode functions.
///
/// Every function receives a slice that is exactly one pixel long.
mod codec {
    use super::formats::*;
    use glam::Vec4;

    #[inline(always)]
    fn clamped_rgba(color: Vec4, srgb: bool) -> Vec4 {
        let c = color.clamp(Vec4::ZERO, Vec4::ONE);
        if srgb {
            Vec4::new(linear_to_srgb(c.x), linear_to_srgb(c.y), linear_to_srgb(c.z), c.w)
        } else {
            c
        }
    }

    fn read_u16(bytes: &[u8]) -> u16 {
        u16::from_le_bytes([bytes[0], bytes[1]])
    }
    fn read_u32(bytes: &[u8]) -> u32 {
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
    fn read_f32(bytes: &[u8], i: usize) -> f32 {
        f32::from_le_bytes([bytes[i * 4], bytes[i * 4 + 1], bytes[i * 4 + 2], bytes[i * 4 + 3]])
    }
    fn read_f16(bytes: &[u8], i: usize) -> f32 {
        fp16::f32(u16::from_le_bytes([bytes[i * 2], bytes[i * 2 + 1]]))
    }

    pub(super) fn encode_argb8888(color: Vec4, srgb: bool, out: &mut [u8]) {
        let c = clamped_rgba(color, srgb);
        out.copy_from_slice(&[
            n8::from_f32(c.z),
            n8::from_f32(c.y),
            n8::from_f32(c.x),
            n8::from_f32(c.w),
        ]);
    }
    pub(super) fn decode_argb8888(bytes: &[u8]) -> Vec4 {
        Vec4::new(
            n8::f32(bytes[2]),
            n8::f32(bytes[1]),
            n8::f32(bytes[0]),
            n8::f32(bytes[3]),
        )
    }

    pub(super) fn encode_argb4444(color: Vec4, srgb: bool, out: &mut [u8]) {
        let c = clamped_rgba(color, srgb);
        let v = (n4::from_f32(c.w) as u16) << 12
            | (n4::from_f32(c.x) as u16) << 8
            | (n4::from_f32(c.y) as u16) << 4
            | n4::from_f32(c.z) as u16;
        out.copy_from_slice(&v.to_le_bytes());
    }
    pub(super) fn decode_argb4444(bytes: &[u8]) -> Vec4 {
        let v = read_u16(bytes);
        Vec4::new(
            n4::f32(((v >> 8) & 0xF) as u8),
            n4::f32(((v >> 4) & 0xF) as u8),
            n4::f32((v & 0xF) as u8),
            n4::f32((v >> 12) as u8),
        )
    }

    pub(super) fn encode_argb1555(color: Vec4, srgb: bool, out: &mut [u8]) {
        let c = clamped_rgba(color, srgb);
        let v = n1::from_f32(c.w) << 15
            | (n5::from_f32(c.x) as u16) << 10
            | (n5::from_f32(c.y) as u16) << 5
            | n5::from_f32(c.z) as u16;
        out.copy_from_slice(&v.to_le_bytes());
    }
    pub(super) fn decode_argb1555(bytes: &[u8]) -> Vec4 {
        let v = read_u16(bytes);
        Vec4::new(
            n5::f32(((v >> 10) & 0x1F) as u8),
            n5::f32(((v >> 5) & 0x1F) as u8),
            n5::f32((v & 0x1F) as u8),
            n1::f32(v >> 15),
        )
    }

    pub(super) fn encode_rgb565(color: Vec4, srgb: bool, out: &mut [u8]) {
        let c = clamped_rgba(color, srgb);
        let v = B5G6R5::from_f32(c.x, c.y, c.z).to_u16();
        out.copy_from_slice(&v.to_le_bytes());
    }
    pub(super) fn decode_rgb565(bytes: &[u8]) -> Vec4 {
        let [r, g, b] = B5G6R5::from_u16(read_u16(bytes)).to_f32();
        Vec4::new(r, g, b, 1.0)
    }

    pub(super) fn encode_a8(color: Vec4, _srgb: bool, out: &mut [u8]) {
        out[0] = n8::from_f32(color.w);
    }
    pub(super) fn decode_a8(bytes: &[u8]) -> Vec4 {
        Vec4::new(0.0, 0.0, 0.0, n8::f32(bytes[0]))
    }

    #[inline(always)]
    fn gray(c: Vec4) -> f32 {
        luminance(c.x, c.y, c.z)
    }

    pub(super) fn encode_l8(color: Vec4, srgb: bool, out: &mut [u8]) {
        out[0] = n8::from_f32(gray(clamped_rgba(color, srgb)));
    }
    pub(super) fn decode_l8(bytes: &[u8]) -> Vec4 {
        let l = n8::f32(bytes[0]);
        Vec4::new(l, l, l, 1.0)
    }

    pub(super) fn encode_al88(color: Vec4, srgb: bool, out: &mut [u8]) {
        let c = clamped_rgba(color, srgb);
        out.copy_from_slice(&[n8::from_f32(gray(c)), n8::from_f32(c.w)]);
    }
    pub(super) fn decode_al88(bytes: &[u8]) -> Vec4 {
        let l = n8::f32(bytes[0]);
        Vec4::new(l, l, l, n8::f32(bytes[1]))
    }

    pub(super) fn encode_l16(color: Vec4, _srgb: bool, out: &mut [u8]) {
        let c = clamped_rgba(color, false);
        out.copy_from_slice(&n16::from_f32(gray(c)).to_le_bytes());
    }
    pub(super) fn decode_l16(bytes: &[u8]) -> Vec4 {
        let l = n16::f32(read_u16(bytes));
        Vec4::new(l, l, l, 1.0)
    }

    pub(super) fn encode_float_map(color: Vec4, _srgb: bool, out: &mut [u8]) {
        for (chunk, v) in out.chunks_exact_mut(4).zip(color.to_array()) {
            chunk.copy_from_slice(&v.to_le_bytes());
        }
    }
    pub(super) fn decode_float_map(bytes: &[u8]) -> Vec4 {
        Vec4::new(
            read_f32(bytes, 0),
            read_f32(bytes, 1),
            read_f32(bytes, 2),
            read_f32(bytes, 3),
        )
    }

    pub(super) fn encode_half_map(color: Vec4, _srgb: bool, out: &mut [u8]) {
        for (chunk, v) in out.chunks_exact_mut(2).zip(color.to_array()) {
            chunk.copy_from_slice(&fp16::from_f32(v).to_le_bytes());
        }
    }
    pub(super) fn decode_half_map(bytes: &[u8]) -> Vec4 {
        Vec4::new(
            read_f16(bytes, 0),
            read_f16(bytes, 1),
            read_f16(bytes, 2),
            read_f16(bytes, 3),
        )
    }

    pub(super) fn encode_f32(color: Vec4, _srgb: bool, out: &mut [u8]) {
        out.copy_from_slice(&gray(color).to_le_bytes());
    }
    pub(super) fn decode_f32(bytes: &[u8]) -> Vec4 {
        let l = read_f32(bytes, 0);
        Vec4::new(l, l, l, 1.0)
    }

    pub(super) fn encode_f32f32(color: Vec4, _srgb: bool, out: &mut [u8]) {
        out[..4].copy_from_slice(&color.x.to_le_bytes());
        out[4..].copy_from_slice(&color.y.to_le_bytes());
    }
    pub(super) fn decode_f32f32(bytes: &[u8]) -> Vec4 {
        Vec4::new(read_f32(bytes, 0), read_f32(bytes, 1), 0.0, 1.0)
    }

    pub(super) fn encode_f16(color: Vec4, _srgb: bool, out: &mut [u8]) {
        out.copy_from_slice(&fp16::from_f32(gray(color)).to_le_bytes());
    }
    pub(super) fn decode_f16(bytes: &[u8]) -> Vec4 {
        let l = read_f16(bytes, 0);
        Vec4::new(l, l, l, 1.0)
    }

    pub(super) fn encode_f16f16(color: Vec4, _srgb: bool, out: &mut [u8]) {
        out[..2].copy_from_slice(&fp16::from_f32(color.x).to_le_bytes());
        out[2..].copy_from_slice(&fp16::from_f32(color.y).to_le_bytes());
    }
    pub(super) fn decode_f16f16(bytes: &[u8]) -> Vec4 {
        Vec4::new(read_f16(bytes, 0), read_f16(bytes, 1), 0.0, 1.0)
    }

    pub(super) fn encode_rgbe(color: Vec4, _srgb: bool, out: &mut [u8]) {
        out.copy_from_slice(&color_format_create_rgbe(color.x, color.y, color.z).to_le_bytes());
    }
    pub(super) fn decode_rgbe(bytes: &[u8]) -> Vec4 {
        color_format_expand_rgbe(read_u32(bytes)).extend(1.0)
    }
}
