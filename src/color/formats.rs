//! Internal module for converting between number formats.
//!
//! Quantization follows the legacy pipeline exactly: inputs are clamped to
//! `[0, 1]` and then rounded with `(x * max + 0.5) as int`, which truncates.

use glam::Vec3;

/// Luminance weights applied to linear (or sRGB, when converting) RGB.
pub(crate) const LUMINANCE_WEIGHTS: [f32; 3] = [0.212671, 0.715160, 0.072169];

#[inline(always)]
pub(crate) fn luminance(r: f32, g: f32, b: f32) -> f32 {
    LUMINANCE_WEIGHTS[0] * r + LUMINANCE_WEIGHTS[1] * g + LUMINANCE_WEIGHTS[2] * b
}

#[inline(always)]
pub(crate) fn clamp01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Converts an sRGB encoded value to linear.
pub fn srgb_to_linear(x: f32) -> f32 {
    if x <= 0.04045 {
        x / 12.92
    } else {
        ((x + 0.055) / 1.055).powf(2.4)
    }
}

/// Converts a linear value to sRGB encoding.
pub fn linear_to_srgb(x: f32) -> f32 {
    if x <= 0.0031308 {
        x * 12.92
    } else {
        1.055 * x.powf(1.0 / 2.4) - 0.055
    }
}

/// Splits `x` into a mantissa in `[0.5, 1)` and a power of two exponent.
///
/// Zero, infinity and NaN are returned unchanged with an exponent of 0.
pub(crate) fn frexp(x: f32) -> (f32, i32) {
    if x == 0.0 || !x.is_finite() {
        return (x, 0);
    }

    let bits = x.to_bits();
    let biased = ((bits >> 23) & 0xFF) as i32;
    if biased == 0 {
        // subnormal: scale into the normal range first
        let (m, e) = frexp(x * f32::from_bits(0x4c00_0000)); // 2^25
        return (m, e - 25);
    }

    let mantissa = f32::from_bits((bits & 0x807F_FFFF) | (126 << 23));
    (mantissa, biased - 126)
}

#[inline(always)]
pub(crate) fn ldexp(x: f32, exp: i32) -> f32 {
    (x as f64 * 2f64.powi(exp)) as f32
}

/// Packs linear RGB into the RGBE shared exponent format.
///
/// The result is laid out as `e << 24 | b << 16 | g << 8 | r`. Negative
/// channels are clamped to zero and near-black colors encode as `0`.
pub fn color_format_create_rgbe(r: f32, g: f32, b: f32) -> u32 {
    let r = r.max(0.0);
    let g = g.max(0.0);
    let b = b.max(0.0);

    let max = r.max(g).max(b);
    if !(max >= 1e-32) {
        return 0;
    }

    let (mantissa, exp) = frexp(max);
    let factor = mantissa / max;

    let channel = |c: f32| ((c * factor * 255.0 + 0.5) as i32).clamp(0, 255) as u32;
    let e = (exp + 128).clamp(0, 255) as u32;

    (e << 24) | (channel(b) << 16) | (channel(g) << 8) | channel(r)
}

/// Unpacks an RGBE value created by [`color_format_create_rgbe`].
pub fn color_format_expand_rgbe(rgbe: u32) -> Vec3 {
    const F: f32 = 0.0039215686;

    let [r, g, b, e] = rgbe.to_le_bytes();
    if e == 0 {
        return Vec3::ZERO;
    }

    let scale = ldexp(1.0, e as i32 - 128);
    Vec3::new(
        r as f32 * F * scale,
        g as f32 * F * scale,
        b as f32 * F * scale,
    )
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct B5G6R5 {
    pub r5: u16,
    pub g6: u16,
    pub b5: u16,
}
impl B5G6R5 {
    #[inline(always)]
    pub fn from_u16(u: u16) -> Self {
        Self {
            b5: u & 0x1F,
            g6: (u >> 5) & 0x3F,
            r5: (u >> 11) & 0x1F,
        }
    }
    #[inline(always)]
    pub fn to_u16(self) -> u16 {
        (self.r5 << 11) | (self.g6 << 5) | self.b5
    }
    /// Quantizes clamped RGB. All three channels are clamped before rounding.
    #[inline(always)]
    pub fn from_f32(r: f32, g: f32, b: f32) -> Self {
        Self {
            r5: n5::from_f32(r) as u16,
            g6: n6::from_f32(g) as u16,
            b5: n5::from_f32(b) as u16,
        }
    }
    /// Rounds RGB8 to the nearest 5:6:5 color the way block encoders expect.
    #[inline(always)]
    pub fn from_rgb8(rgb: [u8; 3]) -> Self {
        Self {
            r5: ((rgb[0] as u16 * 31 + 127) / 255),
            g6: ((rgb[1] as u16 * 63 + 127) / 255),
            b5: ((rgb[2] as u16 * 31 + 127) / 255),
        }
    }
    #[inline(always)]
    pub fn to_n8(self) -> [u8; 3] {
        [
            n5::n8(self.r5 as u8),
            n6::n8(self.g6 as u8),
            n5::n8(self.b5 as u8),
        ]
    }
    #[inline(always)]
    pub fn to_f32(self) -> [f32; 3] {
        [
            n5::f32(self.r5 as u8),
            n6::f32(self.g6 as u8),
            n5::f32(self.b5 as u8),
        ]
    }

    // The nearest RGB8 color that represents `self * 2/3 + color * 1/3`.
    pub(crate) fn one_third_color_rgb8(self, color: Self) -> [u8; 3] {
        let r = self.r5 * 2 + color.r5;
        let g = self.g6 * 2 + color.g6;
        let b = self.b5 * 2 + color.b5;

        let r = ((r * 351 + 61) >> 7) as u8;
        let g = ((g as u32 * 2763 + 1039) >> 11) as u8;
        let b = ((b * 351 + 61) >> 7) as u8;
        [r, g, b]
    }
    // The nearest RGB8 color that represents `self * 1/2 + color * 1/2`.
    pub(crate) fn mid_color_rgb8(self, color: Self) -> [u8; 3] {
        let r = self.r5 + color.r5;
        let g = self.g6 + color.g6;
        let b = self.b5 + color.b5;

        let r = ((r * 1053 + 125) >> 8) as u8;
        let g = ((g as u32 * 4145 + 1019) >> 11) as u8;
        let b = ((b * 1053 + 125) >> 8) as u8;
        [r, g, b]
    }
}

/// Functions for converting **FROM Unorm1** values.
pub(crate) mod n1 {
    #[inline(always)]
    pub fn f32(x: u16) -> f32 {
        (x & 1) as f32
    }
    /// 1-bit alpha rounds without a scale: `(a + 0.5) as int`.
    #[inline(always)]
    pub fn from_f32(x: f32) -> u16 {
        (super::clamp01(x) + 0.5) as u16
    }
}

/// Functions for converting **FROM Unorm4** values to other formats.
pub(crate) mod n4 {
    #[inline(always)]
    pub fn n8(x: u8) -> u8 {
        debug_assert!(x <= 15);
        x * 17
    }
    #[inline(always)]
    pub fn f32(x: u8) -> f32 {
        debug_assert!(x <= 15);
        x as f32 / 15.0
    }
    #[inline(always)]
    pub fn from_f32(x: f32) -> u8 {
        (super::clamp01(x) * 15.0 + 0.5) as u8
    }
    /// Rounds an 8-bit value to 4 bits.
    #[inline(always)]
    pub fn from_n8(x: u8) -> u8 {
        ((x as u16 * 15 + 127) / 255) as u8
    }
}

/// Functions for converting **FROM Unorm5** values to other formats.
pub(crate) mod n5 {
    #[inline(always)]
    pub fn n8(x: u8) -> u8 {
        debug_assert!(x <= 31);
        ((x as u16 * 2108 + 92) >> 8) as u8
    }
    #[inline(always)]
    pub fn f32(x: u8) -> f32 {
        debug_assert!(x <= 31);
        x as f32 / 31.0
    }
    #[inline(always)]
    pub fn from_f32(x: f32) -> u8 {
        (super::clamp01(x) * 31.0 + 0.5) as u8
    }
}

/// Functions for converting **FROM Unorm6** values to other formats.
pub(crate) mod n6 {
    #[inline(always)]
    pub fn n8(x: u8) -> u8 {
        debug_assert!(x <= 63);
        ((x as u16 * 1036 + 132) >> 8) as u8
    }
    #[inline(always)]
    pub fn f32(x: u8) -> f32 {
        debug_assert!(x <= 63);
        x as f32 / 63.0
    }
    #[inline(always)]
    pub fn from_f32(x: f32) -> u8 {
        (super::clamp01(x) * 63.0 + 0.5) as u8
    }
}

/// Functions for converting **FROM Unorm8** values to other formats.
pub(crate) mod n8 {
    #[inline(always)]
    pub fn f32(x: u8) -> f32 {
        x as f32 / 255.0
    }
    #[inline(always)]
    pub fn from_f32(x: f32) -> u8 {
        (super::clamp01(x) * 255.0 + 0.5) as u8
    }
}

/// Functions for converting **FROM Unorm16** values to other formats.
pub(crate) mod n16 {
    #[inline(always)]
    pub fn f32(x: u16) -> f32 {
        x as f32 / 65535.0
    }
    #[inline(always)]
    pub fn from_f32(x: f32) -> u16 {
        (super::clamp01(x) * 65535.0 + 0.5) as u16
    }
}

/// Functions for converting **FROM half floats**.
pub(crate) mod fp16 {
    use half::f16;

    #[inline(always)]
    pub fn f32(bits: u16) -> f32 {
        f16::from_bits(bits).to_f32()
    }
    #[inline(always)]
    pub fn from_f32(x: f32) -> u16 {
        f16::from_f32(x).to_bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frexp_matches_libm() {
        assert_eq!(frexp(1.0), (0.5, 1));
        assert_eq!(frexp(0.75), (0.75, 0));
        assert_eq!(frexp(8.0), (0.5, 4));
        assert_eq!(frexp(0.0), (0.0, 0));

        let tiny = f32::from_bits(1);
        let (m, e) = frexp(tiny);
        assert_eq!(m, 0.5);
        assert_eq!(e, -148);
    }

    #[test]
    fn quantizers_clamp_before_rounding() {
        assert_eq!(n8::from_f32(2.0), 255);
        assert_eq!(n8::from_f32(-1.0), 0);
        assert_eq!(n8::from_f32(0.5), 128);
        assert_eq!(n4::from_f32(1.0), 15);
        assert_eq!(n1::from_f32(0.49), 0);
        assert_eq!(n1::from_f32(0.5), 1);
        assert_eq!(n16::from_f32(1.0), 65535);
    }

    #[test]
    fn b5g6r5_round_trip() {
        for c in [0x0000u16, 0xFFFF, 0xF800, 0x07E0, 0x001F, 0x1234] {
            assert_eq!(B5G6R5::from_u16(c).to_u16(), c);
        }
    }

    #[test]
    fn srgb_endpoints() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        assert_eq!(linear_to_srgb(0.0), 0.0);
        assert!((linear_to_srgb(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rgbe_of_one() {
        // 1.0 = 0.5 * 2^1 -> mantissa byte 128, exponent 129
        let rgbe = color_format_create_rgbe(1.0, 1.0, 1.0);
        assert_eq!(rgbe, 0x8180_8080);
    }
}
