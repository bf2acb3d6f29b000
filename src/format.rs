use crate::{
    util::div_ceil, ColorFormat, DxtFlags, FormatError, FourCC, PixelFormat, PixelFormatFlags,
};

/// The storage formats of a [`crate::MipSet`].
///
/// Most formats map 1:1 to an in-memory [`ColorFormat`]. The block
/// compressed formats and `DUDV` need a dedicated codec path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputColorFormat {
    ARGB8888,
    ARGB4444,
    ARGB1555,
    RGB565,
    A8,
    L8,
    AL88,
    DXT1,
    DXT3,
    DXT5,
    /// Signed two channel tangent space normal data.
    DUDV,
    F32,
    F32F32,
    /// Four `f32` channels.
    FloatMap,
    F16,
    F16F16,
    /// Four half float channels.
    HalfMap,
    RGBE,
}

impl OutputColorFormat {
    pub const ALL: [OutputColorFormat; 18] = [
        OutputColorFormat::ARGB8888,
        OutputColorFormat::ARGB4444,
        OutputColorFormat::ARGB1555,
        OutputColorFormat::RGB565,
        OutputColorFormat::A8,
        OutputColorFormat::L8,
        OutputColorFormat::AL88,
        OutputColorFormat::DXT1,
        OutputColorFormat::DXT3,
        OutputColorFormat::DXT5,
        OutputColorFormat::DUDV,
        OutputColorFormat::F32,
        OutputColorFormat::F32F32,
        OutputColorFormat::FloatMap,
        OutputColorFormat::F16,
        OutputColorFormat::F16F16,
        OutputColorFormat::HalfMap,
        OutputColorFormat::RGBE,
    ];

    /// The in-memory format with the exact same byte layout.
    ///
    /// `None` for block compressed formats and `DUDV`.
    pub const fn compatible_color_format(self) -> Option<ColorFormat> {
        Some(match self {
            OutputColorFormat::ARGB8888 => ColorFormat::ARGB8888,
            OutputColorFormat::ARGB4444 => ColorFormat::ARGB4444,
            OutputColorFormat::ARGB1555 => ColorFormat::ARGB1555,
            OutputColorFormat::RGB565 => ColorFormat::RGB565,
            OutputColorFormat::A8 => ColorFormat::A8,
            OutputColorFormat::L8 => ColorFormat::L8,
            OutputColorFormat::AL88 => ColorFormat::AL88,
            OutputColorFormat::F32 => ColorFormat::F32,
            OutputColorFormat::F32F32 => ColorFormat::F32F32,
            OutputColorFormat::FloatMap => ColorFormat::RGBAFloatMap,
            OutputColorFormat::F16 => ColorFormat::F16,
            OutputColorFormat::F16F16 => ColorFormat::F16F16,
            OutputColorFormat::HalfMap => ColorFormat::RGBAHalfMap,
            OutputColorFormat::RGBE => ColorFormat::RGBE,
            OutputColorFormat::DXT1
            | OutputColorFormat::DXT3
            | OutputColorFormat::DXT5
            | OutputColorFormat::DUDV => return None,
        })
    }

    /// The output format storing `format` byte for byte.
    ///
    /// `None` for [`ColorFormat::L16`], which cannot be written.
    pub const fn from_color_format(format: ColorFormat) -> Option<Self> {
        Some(match format {
            ColorFormat::ARGB8888 => OutputColorFormat::ARGB8888,
            ColorFormat::ARGB4444 => OutputColorFormat::ARGB4444,
            ColorFormat::ARGB1555 => OutputColorFormat::ARGB1555,
            ColorFormat::RGB565 => OutputColorFormat::RGB565,
            ColorFormat::A8 => OutputColorFormat::A8,
            ColorFormat::L8 => OutputColorFormat::L8,
            ColorFormat::AL88 => OutputColorFormat::AL88,
            ColorFormat::RGBAFloatMap => OutputColorFormat::FloatMap,
            ColorFormat::RGBAHalfMap => OutputColorFormat::HalfMap,
            ColorFormat::F32 => OutputColorFormat::F32,
            ColorFormat::F32F32 => OutputColorFormat::F32F32,
            ColorFormat::F16 => OutputColorFormat::F16,
            ColorFormat::F16F16 => OutputColorFormat::F16F16,
            ColorFormat::RGBE => OutputColorFormat::RGBE,
            ColorFormat::L16 => return None,
        })
    }

    pub const fn is_compressed(self) -> bool {
        matches!(
            self,
            OutputColorFormat::DXT1 | OutputColorFormat::DXT3 | OutputColorFormat::DXT5
        )
    }

    /// Whether the format stores floating point or shared exponent data.
    pub const fn is_hdr(self) -> bool {
        matches!(
            self,
            OutputColorFormat::F32
                | OutputColorFormat::F32F32
                | OutputColorFormat::FloatMap
                | OutputColorFormat::F16
                | OutputColorFormat::F16F16
                | OutputColorFormat::HalfMap
                | OutputColorFormat::RGBE
        )
    }

    pub fn bits_per_pixel(self) -> u32 {
        match self {
            OutputColorFormat::DXT1 => 4,
            OutputColorFormat::DXT3 | OutputColorFormat::DXT5 => 8,
            OutputColorFormat::DUDV => 16,
            _ => self
                .compatible_color_format()
                .map(ColorFormat::bits_per_pixel)
                .unwrap_or(0),
        }
    }

    /// The block codec flags of a compressed format.
    pub fn dxt_flags(self) -> Option<DxtFlags> {
        match self {
            OutputColorFormat::DXT1 => Some(DxtFlags::DXT1),
            OutputColorFormat::DXT3 => Some(DxtFlags::DXT3),
            OutputColorFormat::DXT5 => Some(DxtFlags::DXT5),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            OutputColorFormat::ARGB8888 => "ARGB8888",
            OutputColorFormat::ARGB4444 => "ARGB4444",
            OutputColorFormat::ARGB1555 => "ARGB1555",
            OutputColorFormat::RGB565 => "RGB565",
            OutputColorFormat::A8 => "A8",
            OutputColorFormat::L8 => "L8",
            OutputColorFormat::AL88 => "AL88",
            OutputColorFormat::DXT1 => "DXT1",
            OutputColorFormat::DXT3 => "DXT3",
            OutputColorFormat::DXT5 => "DXT5",
            OutputColorFormat::DUDV => "DUDV",
            OutputColorFormat::F32 => "F32",
            OutputColorFormat::F32F32 => "F32F32",
            OutputColorFormat::FloatMap => "F32F32F32F32",
            OutputColorFormat::F16 => "F16",
            OutputColorFormat::F16F16 => "F16F16",
            OutputColorFormat::HalfMap => "F16F16F16F16",
            OutputColorFormat::RGBE => "RGBE",
        }
    }

    /// The number of bytes of one level of the given size and depth.
    ///
    /// Compressed formats store one 4x4 block per started group of 4 pixels
    /// on each axis, which is `max(1, w >> 2)` for multiples of 4 and sizes
    /// below 4.
    pub fn level_size(self, width: u32, height: u32, depth: u32) -> usize {
        let depth = depth.max(1) as usize;
        if self.is_compressed() {
            let blocks_x = div_ceil(width, 4).max(1) as usize;
            let blocks_y = div_ceil(height, 4).max(1) as usize;
            blocks_x * blocks_y * self.bits_per_pixel() as usize * 16 / 8 * depth
        } else {
            (self.bits_per_pixel() as usize * width as usize / 8) * height as usize * depth
        }
    }

    /// The value of the pitch/linear size header field for a top level of the
    /// given size.
    pub fn pitch_or_linear_size(self, width: u32, height: u32) -> u32 {
        match self {
            OutputColorFormat::DXT1 => (width / 4).max(1) * (height / 4).max(1) * 8,
            OutputColorFormat::DXT3 | OutputColorFormat::DXT5 => {
                (width / 4).max(1) * (height / 4).max(1) * 16
            }
            _ => width * self.bits_per_pixel() / 8,
        }
    }

    /// The DDS pixel format written for this output format.
    pub fn pixel_format(self) -> PixelFormat {
        use PixelFormatFlags as F;

        if let Some(four_cc) = self.four_cc() {
            let bits = match self {
                OutputColorFormat::DXT1 | OutputColorFormat::DXT3 | OutputColorFormat::DXT5 => 32,
                _ => self.bits_per_pixel(),
            };
            return PixelFormat::new_four_cc(four_cc, bits);
        }

        let (flags, bits, masks) = match self {
            OutputColorFormat::ARGB8888 | OutputColorFormat::RGBE => {
                (F::RGBA, 32, [0xFF0000, 0xFF00, 0xFF, 0xFF000000])
            }
            OutputColorFormat::ARGB4444 => (F::RGBA, 16, [0x0F00, 0x00F0, 0x000F, 0xF000]),
            OutputColorFormat::ARGB1555 => (F::RGBA, 16, [0x7C00, 0x03E0, 0x001F, 0x8000]),
            OutputColorFormat::RGB565 => (F::RGB, 16, [0xF800, 0x07E0, 0x001F, 0]),
            OutputColorFormat::A8 => (F::ALPHA, 8, [0, 0, 0, 0xFF]),
            OutputColorFormat::L8 => (F::LUMINANCE, 8, [0xFF, 0, 0, 0]),
            OutputColorFormat::AL88 => (F::LUMINANCE_ALPHA, 16, [0xFF, 0, 0, 0xFF00]),
            _ => (F::empty(), 0, [0; 4]),
        };
        PixelFormat::new_masks(flags, bits, masks)
    }

    /// The FourCC code identifying the format, if it is stored as one.
    pub fn four_cc(self) -> Option<FourCC> {
        FOUR_CC_TABLE
            .iter()
            .find(|(_, format)| *format == self)
            .map(|(four_cc, _)| *four_cc)
    }

    /// Detects the output format of a DDS pixel format.
    ///
    /// Formats whose masks are not listed in the writer tables are
    /// unsupported. RGBE shares its masks with ARGB8888 and is therefore never
    /// detected here; see [`crate::Options::argb8888_as_rgbe`].
    pub fn from_pixel_format(pixel_format: &PixelFormat) -> Result<Self, FormatError> {
        if let Some(four_cc) = pixel_format.four_cc {
            return four_cc_to_output(four_cc).ok_or(FormatError::UnsupportedFourCC(four_cc));
        }

        match detect_masks(pixel_format) {
            Some(MaskFormat::Output(format)) => Ok(format),
            _ => Err(FormatError::UnsupportedPixelFormat),
        }
    }
}

impl std::fmt::Display for OutputColorFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl ColorFormat {
    /// Detects the in-memory format a DDS pixel format can be read into
    /// directly.
    ///
    /// This accepts everything [`OutputColorFormat::from_pixel_format`] does
    /// that has a compatible color format, plus 16 bit luminance.
    pub fn from_pixel_format(pixel_format: &PixelFormat) -> Result<Self, FormatError> {
        if let Some(four_cc) = pixel_format.four_cc {
            return four_cc_to_output(four_cc)
                .and_then(OutputColorFormat::compatible_color_format)
                .ok_or(FormatError::UnsupportedFourCC(four_cc));
        }

        match detect_masks(pixel_format) {
            Some(MaskFormat::Output(format)) => format
                .compatible_color_format()
                .ok_or(FormatError::UnsupportedPixelFormat),
            Some(MaskFormat::L16) => Ok(ColorFormat::L16),
            None => Err(FormatError::UnsupportedPixelFormat),
        }
    }
}

/// FourCC codes shared by reading and writing. DXT2 and DXT4 share the
/// block layout of DXT3 and DXT5 and are only read.
const FOUR_CC_TABLE: [(FourCC, OutputColorFormat); 12] = [
    (FourCC::DXT1, OutputColorFormat::DXT1),
    (FourCC::DXT3, OutputColorFormat::DXT3),
    (FourCC::DXT5, OutputColorFormat::DXT5),
    (FourCC::DUDV, OutputColorFormat::DUDV),
    (FourCC::R32F, OutputColorFormat::F32),
    (FourCC::G32R32F, OutputColorFormat::F32F32),
    (FourCC::A32B32G32R32F, OutputColorFormat::FloatMap),
    (FourCC::R16F, OutputColorFormat::F16),
    (FourCC::G16R16F, OutputColorFormat::F16F16),
    (FourCC::A16B16G16R16F, OutputColorFormat::HalfMap),
    (FourCC::DXT2, OutputColorFormat::DXT3),
    (FourCC::DXT4, OutputColorFormat::DXT5),
];

fn four_cc_to_output(four_cc: FourCC) -> Option<OutputColorFormat> {
    FOUR_CC_TABLE
        .iter()
        .find(|(code, _)| *code == four_cc)
        .map(|(_, format)| *format)
}

enum MaskFormat {
    Output(OutputColorFormat),
    /// Has no output counterpart.
    L16,
}

fn detect_masks(pf: &PixelFormat) -> Option<MaskFormat> {
    use OutputColorFormat as O;
    use PixelFormatFlags as F;

    let rgb = [pf.r_bit_mask, pf.g_bit_mask, pf.b_bit_mask];
    let alpha = pf.a_bit_mask;
    let has_alpha = pf.flags.contains(F::ALPHAPIXELS);

    if pf.flags.contains(F::RGB) {
        let format = match (pf.rgb_bit_count, rgb, alpha) {
            (16, [0x0F00, 0x00F0, 0x000F], 0xF000) if has_alpha => O::ARGB4444,
            (16, [0x7C00, 0x03E0, 0x001F], 0x8000) if has_alpha => O::ARGB1555,
            (16, [0xF800, 0x07E0, 0x001F], _) => O::RGB565,
            (32, [0xFF0000, 0xFF00, 0xFF], 0xFF000000) if has_alpha => O::ARGB8888,
            _ => return None,
        };
        return Some(MaskFormat::Output(format));
    }

    if pf.flags.contains(F::LUMINANCE) {
        return match pf.rgb_bit_count {
            8 if rgb.contains(&0xFF) => Some(MaskFormat::Output(O::L8)),
            16 if has_alpha && pf.r_bit_mask == 0xFF && alpha == 0xFF00 => {
                Some(MaskFormat::Output(O::AL88))
            }
            16 if rgb.contains(&0xFFFF) => Some(MaskFormat::L16),
            _ => None,
        };
    }

    if pf.flags.contains(F::ALPHA) && pf.rgb_bit_count == 8 && alpha == 0xFF {
        return Some(MaskFormat::Output(O::A8));
    }

    None
}
