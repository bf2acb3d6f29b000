use crate::{OutputColorFormat, MAX_TEXTURE_MIPS};

/// The number of color channels (R, G, B, A) processed by the pipeline.
pub const CHANNEL_COUNT: usize = 4;

/// The resampling filter used to scale images and generate mipmaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterType {
    /// Behaves like [`FilterType::Point`].
    None,
    #[default]
    Point,
    Box,
    Triangle,
    Quadratic,
    Cubic,
    Mitchell,
    /// Resamples with a Mitchell kernel.
    Gaussian,
    /// Resamples with a Lanczos3 kernel.
    Sinc,
    Kaiser,
    /// A cubic filter blended 50% with a point sampled result.
    PointComposite,
}

/// An image operation applied to mipmaps after they have been generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PostMipImageFilter {
    #[default]
    None,
    Lighter,
    Darker,
    MoreContrast,
    LessContrast,
    Smooth,
    /// Sharpens small mipmaps less than large ones.
    SharpenGradual,
    Sharpen1x,
    Sharpen2x,
    Sharpen3x,
    HighPass,
}

/// How texture coordinates outside `[0, 1]` are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UVAddressMode {
    #[default]
    Wrap,
    Mirror,
    Clamp,
    Border,
}

/// The filtering a renderer should use when sampling the texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFilter {
    PointSelectMip,
    LinearSelectMip,
    #[default]
    LinearLinearMip,
    Aniso2SelectMip,
    Aniso2LinearMip,
    Aniso4SelectMip,
    Aniso4LinearMip,
}

/// Where a renderer takes the value of a color channel from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorChannelMode {
    /// Whatever the texture stores.
    #[default]
    Default,
    ForceOne,
    ForceZero,
    GetFromA,
    GetFromR,
    GetFromG,
    GetFromB,
}

/// Options for generating a [`crate::MipSet`] from an [`crate::Image`].
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct MipGenOptions {
    /// The number of levels to generate.
    ///
    /// `0` generates the full chain down to 1x1 (or 4x4 for DXT formats).
    /// Larger requests than the image supports are clamped.
    ///
    /// Default: `0`
    pub levels: u32,
    /// Default: [`OutputColorFormat::ARGB8888`]
    pub output_format: OutputColorFormat,
    /// Default: [`PostMipImageFilter::None`]
    pub post_filter: PostMipImageFilter,
    /// Default: [`UVAddressMode::Wrap`]
    pub u_address_mode: UVAddressMode,
    /// Default: [`UVAddressMode::Wrap`]
    pub v_address_mode: UVAddressMode,
    /// Default: [`FilterType::Triangle`]
    pub filter: FilterType,
    /// Whether the color channels are stored in sRGB.
    ///
    /// Default: `false`
    pub convert_to_srgb: bool,
    /// How many times the post filter runs on each level.
    ///
    /// Default: `0` for the top level and `1` for all others.
    pub apply_post_filter: [u32; MAX_TEXTURE_MIPS],
}
impl Default for MipGenOptions {
    fn default() -> Self {
        Self {
            levels: 0,
            output_format: OutputColorFormat::ARGB8888,
            post_filter: PostMipImageFilter::None,
            u_address_mode: UVAddressMode::Wrap,
            v_address_mode: UVAddressMode::Wrap,
            filter: FilterType::Triangle,
            convert_to_srgb: false,
            apply_post_filter: default_filter_counts(),
        }
    }
}

fn default_filter_counts() -> [u32; MAX_TEXTURE_MIPS] {
    let mut counts = [1; MAX_TEXTURE_MIPS];
    counts[0] = 0;
    counts
}

/// Per-channel processing settings used by
/// [`crate::Image::generate_finalized_mip_set`].
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct TextureGenerationSettings {
    /// The mipmap filter of each channel.
    pub mip_filter: [FilterType; CHANNEL_COUNT],
    /// The post filter of each channel.
    pub image_filter: [PostMipImageFilter; CHANNEL_COUNT],
    /// How often the post filter runs on each level, per channel.
    pub ifilter_cnt: [[u32; MAX_TEXTURE_MIPS]; CHANNEL_COUNT],
    pub output_format: OutputColorFormat,
    /// Scale factor applied to the source size before it is rounded up to
    /// the next power of two.
    pub scale: f32,
    /// The maximum output width and height.
    pub max_size: u32,
    pub generate_mips: bool,
}
impl Default for TextureGenerationSettings {
    fn default() -> Self {
        Self {
            mip_filter: [FilterType::Point; CHANNEL_COUNT],
            image_filter: [PostMipImageFilter::None; CHANNEL_COUNT],
            ifilter_cnt: [default_filter_counts(); CHANNEL_COUNT],
            output_format: OutputColorFormat::ARGB8888,
            scale: 1.0,
            max_size: 2048,
            generate_mips: true,
        }
    }
}
impl TextureGenerationSettings {
    /// Whether channels `a` and `b` are processed identically.
    pub fn compare_mip_settings(&self, a: usize, b: usize) -> bool {
        self.mip_filter[a] == self.mip_filter[b]
            && self.image_filter[a] == self.image_filter[b]
            && self.ifilter_cnt[a] == self.ifilter_cnt[b]
    }

    /// Whether all channels are processed identically.
    pub fn are_mip_settings_equal(&self) -> bool {
        (1..CHANNEL_COUNT).all(|i| (0..i).all(|j| self.compare_mip_settings(i, j)))
    }

    /// The options that process `channel` as described by these settings.
    pub(crate) fn channel_options(&self, channel: usize) -> MipGenOptions {
        MipGenOptions {
            output_format: self.output_format,
            post_filter: self.image_filter[channel],
            filter: self.mip_filter[channel],
            apply_post_filter: self.ifilter_cnt[channel],
            levels: if self.generate_mips { 0 } else { 1 },
            ..Default::default()
        }
    }
}

/// Sampling state a renderer applies to a texture.
///
/// This is metadata and does not affect the stored pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeSettings {
    pub wrap_u: UVAddressMode,
    pub wrap_v: UVAddressMode,
    pub wrap_w: UVAddressMode,
    pub filter: TextureFilter,

    pub alpha_channel: ColorChannelMode,
    pub red_channel: ColorChannelMode,
    pub green_channel: ColorChannelMode,
    pub blue_channel: ColorChannelMode,

    /// Whether the channel holds two's complement data.
    pub alpha_signed: bool,
    pub red_signed: bool,
    pub green_signed: bool,
    pub blue_signed: bool,

    /// Whether texture coordinates are unnormalized.
    pub direct_uvs: bool,
    /// Whether values are expanded from `[0, 1]` to `[-1, 1]` on lookup.
    pub expand_range: bool,

    /// Whether the channel is converted from sRGB on lookup.
    pub srgb_expand_a: bool,
    pub srgb_expand_r: bool,
    pub srgb_expand_g: bool,
    pub srgb_expand_b: bool,

    pub mip_bias: f32,
}
impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            wrap_u: UVAddressMode::Wrap,
            wrap_v: UVAddressMode::Wrap,
            wrap_w: UVAddressMode::Wrap,
            filter: TextureFilter::LinearLinearMip,
            alpha_channel: ColorChannelMode::Default,
            red_channel: ColorChannelMode::Default,
            green_channel: ColorChannelMode::Default,
            blue_channel: ColorChannelMode::Default,
            alpha_signed: false,
            red_signed: false,
            green_signed: false,
            blue_signed: false,
            direct_uvs: false,
            expand_range: false,
            srgb_expand_a: false,
            srgb_expand_r: false,
            srgb_expand_g: false,
            srgb_expand_b: false,
            mip_bias: 0.0,
        }
    }
}
impl RuntimeSettings {
    /// Whether all color channels are sRGB encoded.
    pub fn should_convert_to_srgb(&self) -> bool {
        self.srgb_expand_r && self.srgb_expand_g && self.srgb_expand_b
    }
}
