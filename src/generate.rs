use log::{debug, trace, warn};

use crate::{
    cast::as_rgba_pixels_mut, util::mip_count_for, BlockCodec, Channel, ColorChannelMode,
    ColorFormat, DxtFlags, FilterType, FormatError, GenerateError, Image, MipGenOptions, MipInfo,
    MipSet, OutputColorFormat, PostMipImageFilter, RangeFitCodec, RuntimeSettings,
    TextureGenerationSettings, TextureType, UVAddressMode, CHANNEL_COUNT, MAX_TEXTURE_MIPS,
};

/// Alpha values at or above this count as fully opaque.
const UPPER_ALPHA_THRESHOLD: f32 = 0.99;
/// Alpha values at or below this count as fully transparent.
const LOWER_ALPHA_THRESHOLD: f32 = 0.01;
/// Color values at or above this count as white.
const COLOR_SET_THRESHOLD: f32 = 0.99;

/// How a DXT3 or DXT5 texture without meaningful alpha is stored as DXT1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AlphaAnalysis {
    Keep,
    Opaque,
    Transparent,
    /// RGB is white, alpha is moved into the color channels.
    AlphaInColor,
}

impl Image {
    /// Generates the mip chain of every face and packs it into
    /// `options.output_format`.
    ///
    /// The wrap modes of `runtime` are used for filtering. The sRGB flags of
    /// the result are taken from `options`. DXT3 and DXT5 textures without
    /// meaningful alpha are stored as DXT1, see
    /// [`Self::generate_mip_set_with_codec`].
    pub fn generate_mip_set(
        &self,
        options: &MipGenOptions,
        runtime: &RuntimeSettings,
    ) -> Result<MipSet, GenerateError> {
        let options = [options.clone(), options.clone(), options.clone(), options.clone()];
        self.generate_mip_set_with_codec(&options, runtime, &RangeFitCodec)
    }

    /// Generates a mip set with separate filters for each channel.
    ///
    /// The output format, level count and sRGB conversion are taken from the
    /// red channel.
    pub fn generate_mip_set_per_channel(
        &self,
        options: &[MipGenOptions; CHANNEL_COUNT],
        runtime: &RuntimeSettings,
    ) -> Result<MipSet, GenerateError> {
        self.generate_mip_set_with_codec(options, runtime, &RangeFitCodec)
    }

    /// Generates a mip set and compresses DXT levels with `codec`.
    ///
    /// DXT3 and DXT5 requests are analysed first:
    ///
    /// - If alpha is opaque everywhere, DXT1 is used and the alpha channel
    ///   reads as one.
    /// - If alpha is transparent everywhere, DXT1 is used and the alpha
    ///   channel reads as zero.
    /// - If the color channels are white, alpha is moved into the colors of
    ///   a DXT1 texture and read back from green.
    ///
    /// DXT textures with a non power of two size are padded for compression
    /// and cropped afterwards. DXT textures smaller than one block are stored
    /// as ARGB8888.
    pub fn generate_mip_set_with_codec(
        &self,
        options: &[MipGenOptions; CHANNEL_COUNT],
        runtime: &RuntimeSettings,
        codec: &dyn BlockCodec,
    ) -> Result<MipSet, GenerateError> {
        let mut options = options.clone();
        for o in options.iter_mut() {
            o.u_address_mode = runtime.wrap_u;
            o.v_address_mode = runtime.wrap_v;
        }

        let mut mips = MipSet {
            width: self.width(),
            height: self.height(),
            depth: self.depth(),
            texture_type: self.texture_type(),
            format: options[0].output_format,
            runtime: runtime.clone(),
            ..Default::default()
        };
        mips.runtime.srgb_expand_r = options[0].convert_to_srgb;
        mips.runtime.srgb_expand_g = options[1].convert_to_srgb;
        mips.runtime.srgb_expand_b = options[2].convert_to_srgb;
        mips.runtime.srgb_expand_a = false;

        let mut alpha_in_color: Option<Image> = None;
        let mut padded: Option<Image> = None;

        if mips.format.is_compressed() {
            if matches!(mips.format, OutputColorFormat::DXT3 | OutputColorFormat::DXT5) {
                match self.analyse_alpha() {
                    AlphaAnalysis::Keep => (),
                    AlphaAnalysis::Opaque => {
                        debug!("Forced {} to DXT1, alpha reads as one", mips.format);
                        mips.format = OutputColorFormat::DXT1;
                        mips.runtime.alpha_channel = ColorChannelMode::ForceOne;
                    }
                    AlphaAnalysis::Transparent => {
                        debug!("Forced {} to DXT1, alpha reads as zero", mips.format);
                        mips.format = OutputColorFormat::DXT1;
                        mips.runtime.alpha_channel = ColorChannelMode::ForceZero;
                    }
                    AlphaAnalysis::AlphaInColor => {
                        debug!("Moved alpha of white {} texture into DXT1 colors", mips.format);
                        alpha_in_color = Some(self.with_alpha_in_color());
                        mips.format = OutputColorFormat::DXT1;
                        // green has the most bits in 565 endpoints
                        mips.runtime.alpha_channel = ColorChannelMode::GetFromG;
                        mips.runtime.red_channel = ColorChannelMode::ForceOne;
                        mips.runtime.green_channel = ColorChannelMode::ForceOne;
                        mips.runtime.blue_channel = ColorChannelMode::ForceOne;
                        for o in options.iter_mut() {
                            o.convert_to_srgb = false;
                        }
                    }
                }
            }

            let source = alpha_in_color.as_ref().unwrap_or(self);
            if source.width() >= 4
                && source.height() >= 4
                && !(source.width().is_power_of_two() && source.height().is_power_of_two())
            {
                debug!(
                    "Padding {}x{} to a power of two for block compression",
                    source.width(),
                    source.height()
                );
                padded = Some(
                    source
                        .adjust_to_next_power_of_2()
                        .ok_or(GenerateError::UnsupportedVolumeOperation)?,
                );
            }
        }

        let source = padded
            .as_ref()
            .or(alpha_in_color.as_ref())
            .unwrap_or(self);

        let mut first = true;
        for face in source.present_faces().collect::<Vec<_>>() {
            let levels = generate_face(source, face, &options, &mut mips, codec)?;
            if first {
                mips.levels_used = levels;
                first = false;
            }
        }
        if first {
            return Err(GenerateError::MissingFace(0));
        }

        if padded.is_some() && !mips.extract_non_power_of_two(self.width(), self.height(), 1) {
            warn!(
                "Could not crop padded mip set to {}x{}",
                self.width(),
                self.height()
            );
        }

        Ok(mips)
    }

    fn analyse_alpha(&self) -> AlphaAnalysis {
        let faces: Vec<usize> = self.present_faces().collect();

        let opaque =
            |face| !self.is_channel_data_set(face, Channel::A, UPPER_ALPHA_THRESHOLD, false);
        let transparent =
            |face| !self.is_channel_data_set(face, Channel::A, LOWER_ALPHA_THRESHOLD, true);
        let white = |face| {
            [Channel::R, Channel::G, Channel::B]
                .into_iter()
                .all(|c| !self.is_channel_data_set(face, c, COLOR_SET_THRESHOLD, false))
        };

        if faces.iter().all(|&f| opaque(f)) {
            AlphaAnalysis::Opaque
        } else if faces.iter().all(|&f| transparent(f)) {
            AlphaAnalysis::Transparent
        } else if faces.iter().any(|&f| white(f)) {
            AlphaAnalysis::AlphaInColor
        } else {
            AlphaAnalysis::Keep
        }
    }

    fn with_alpha_in_color(&self) -> Image {
        let mut image = self.clone();
        for face in self.present_faces().collect::<Vec<_>>() {
            if let Some(face) = image.face_mut(face) {
                let [r, g, b, a] = face.planes_mut();
                r.copy_from_slice(a);
                g.copy_from_slice(a);
                b.copy_from_slice(a);
            }
        }
        image
    }

    /// Generates a mip set from per channel texture settings.
    ///
    /// The image is scaled by [`TextureGenerationSettings::scale`], rounded up
    /// to a power of two and limited to
    /// [`TextureGenerationSettings::max_size`]. Normal and detail maps are
    /// re-encoded for two channel storage before generation, see
    /// [`Self::prepare_for_2channel_normal_map`]. Channels with different
    /// settings are filtered separately.
    pub fn generate_finalized_mip_set(
        &self,
        settings: &TextureGenerationSettings,
        runtime: &RuntimeSettings,
        is_normal_map: bool,
        is_detail_map: bool,
    ) -> Result<MipSet, GenerateError> {
        let convert_to_srgb = runtime.should_convert_to_srgb();
        let (width, height) = finalized_size(self.width(), self.height(), settings);
        let resized = width != self.width() || height != self.height();

        if !is_normal_map && !is_detail_map && !settings.are_mip_settings_equal() {
            debug!("Channels have different mip settings, filtering them separately");

            let options: [MipGenOptions; CHANNEL_COUNT] = std::array::from_fn(|c| MipGenOptions {
                convert_to_srgb,
                u_address_mode: runtime.wrap_u,
                v_address_mode: runtime.wrap_v,
                ..settings.channel_options(c)
            });

            let mut mips = if resized {
                let filters = settings.mip_filter;
                self.scale_image(
                    width,
                    height,
                    self.format(),
                    filters,
                    UVAddressMode::Clamp,
                    UVAddressMode::Clamp,
                )
                .ok_or(GenerateError::UnsupportedVolumeOperation)?
                .generate_mip_set_per_channel(&options, runtime)?
            } else {
                self.generate_mip_set_per_channel(&options, runtime)?
            };
            mips.runtime = runtime.clone();
            return Ok(mips);
        }

        let options = MipGenOptions {
            convert_to_srgb,
            u_address_mode: runtime.wrap_u,
            v_address_mode: runtime.wrap_v,
            ..settings.channel_options(0)
        };

        let is_special_map = is_normal_map || is_detail_map;
        if !resized && !is_special_map {
            return self.generate_mip_set(&options, runtime);
        }

        let mut source = self
            .scale_image(
                width,
                height,
                self.format(),
                [options.filter; CHANNEL_COUNT],
                UVAddressMode::Clamp,
                UVAddressMode::Clamp,
            )
            .ok_or(GenerateError::UnsupportedVolumeOperation)?;
        if is_special_map {
            source.prepare_for_2channel_normal_map(is_detail_map, false);
        }
        source.generate_mip_set(&options, runtime)
    }
}

/// The power of two size of a finalized texture.
fn finalized_size(width: u32, height: u32, settings: &TextureGenerationSettings) -> (u32, u32) {
    let adjust = |size: u32| {
        let scaled = (size as f32 * settings.scale) as u32;
        scaled
            .checked_next_power_of_two()
            .unwrap_or(u32::MAX)
            .min(settings.max_size)
            .max(1)
    };
    (adjust(width), adjust(height))
}

/// Generates and packs all levels of one face. Returns the number of levels.
fn generate_face(
    top: &Image,
    face: usize,
    options: &[MipGenOptions; CHANNEL_COUNT],
    mips: &mut MipSet,
    codec: &dyn BlockCodec,
) -> Result<u32, GenerateError> {
    let mut format = mips.format;
    let convert_to_srgb = options[0].convert_to_srgb;

    let mut limit = 1;
    if format.is_compressed() {
        limit = 4;
        if top.width() < 4 || top.height() < 4 {
            debug!(
                "{}x{} is too small for {}, using ARGB8888",
                top.width(),
                top.height(),
                format
            );
            if format == OutputColorFormat::DXT1 {
                mips.runtime.alpha_channel = ColorChannelMode::ForceOne;
            }
            format = OutputColorFormat::ARGB8888;
            mips.format = format;
        }
    }

    let filters: [FilterType; CHANNEL_COUNT] = std::array::from_fn(|c| options[c].filter);
    let post_filters: [PostMipImageFilter; CHANNEL_COUNT] =
        std::array::from_fn(|c| options[c].post_filter);
    let u_wrap = options[0].u_address_mode;
    let v_wrap = options[0].v_address_mode;

    let full_chain = mip_count_for(top.width(), limit).max(mip_count_for(top.height(), limit));
    let level_count = if top.texture_type() == TextureType::Volume {
        1
    } else if options[0].levels == 0 {
        full_chain
    } else {
        options[0].levels.min(full_chain)
    }
    .min(MAX_TEXTURE_MIPS as u32);

    store_level(mips, face, 0, pack_level(top, face, format, convert_to_srgb, codec)?);

    let point_composite = filters.map(|f| f == FilterType::PointComposite);
    let uses_post_filters = post_filters.iter().any(|f| *f != PostMipImageFilter::None);

    let mut previous: Option<Image> = None;
    for level in 1..level_count as usize {
        let (source, source_face) = match &previous {
            Some(image) => (image, 0),
            None => (top, face),
        };

        let width = (source.width() >> 1).max(limit);
        let height = (source.height() >> 1).max(limit);
        trace!("Generating level {} ({}x{}) of face {}", level, width, height, face);

        let mut current = source
            .scale_image_face(
                width,
                height,
                source_face,
                ColorFormat::ARGB8888,
                filters,
                u_wrap,
                v_wrap,
            )
            .ok_or(GenerateError::MissingFace(source_face))?;

        if point_composite.iter().any(|&p| p) {
            let point = source
                .scale_image_face(
                    width,
                    height,
                    source_face,
                    ColorFormat::ARGB8888,
                    [FilterType::Point; CHANNEL_COUNT],
                    u_wrap,
                    v_wrap,
                )
                .ok_or(GenerateError::MissingFace(source_face))?;
            current.blend_image_face(&point, 0.5, Some(&point_composite), 0, 0);
        }

        let passes = options
            .iter()
            .map(|o| o.apply_post_filter[level])
            .max()
            .unwrap_or(0);

        let info = if uses_post_filters && passes > 0 {
            // filtering only affects the stored level, the next level is
            // generated from the unfiltered one
            let mut filtered = current.clone();
            for pass in 0..passes {
                let pass_filters: [PostMipImageFilter; CHANNEL_COUNT] = std::array::from_fn(|c| {
                    if options[c].apply_post_filter[level] > pass {
                        post_filters[c]
                    } else {
                        PostMipImageFilter::None
                    }
                });
                filtered = post_filter_level(&filtered, &pass_filters, level, u_wrap, v_wrap)?;
            }
            pack_level(&filtered, 0, format, convert_to_srgb, codec)?
        } else {
            pack_level(&current, 0, format, convert_to_srgb, codec)?
        };
        store_level(mips, face, level, info);

        previous = Some(current);
    }

    Ok(level_count)
}

fn post_filter_level(
    image: &Image,
    filters: &[PostMipImageFilter; CHANNEL_COUNT],
    level: usize,
    u_wrap: UVAddressMode,
    v_wrap: UVAddressMode,
) -> Result<Image, GenerateError> {
    let mut filtered = image
        .filter_image_face(filters, 0, level)
        .ok_or(GenerateError::MissingFace(0))?;

    let high_pass = filters.map(|f| f == PostMipImageFilter::HighPass);
    if high_pass.iter().any(|&h| h) {
        filtered.high_pass_filter_image(Some(&high_pass), 0, u_wrap, v_wrap);
    }
    Ok(filtered)
}

fn store_level(mips: &mut MipSet, face: usize, level: usize, info: MipInfo) {
    mips.datasize[level] = info.data.len();
    mips.levels[face][level] = info;
}

/// Packs one face of a level into `format`.
fn pack_level(
    image: &Image,
    face: usize,
    format: OutputColorFormat,
    convert_to_srgb: bool,
    codec: &dyn BlockCodec,
) -> Result<MipInfo, GenerateError> {
    let width = image.width();
    let height = image.height();
    let depth = image.depth().max(1);

    let data = match format.dxt_flags() {
        Some(block_format) => {
            let mut rgba = image
                .generate_format_data(face, ColorFormat::ARGB8888, convert_to_srgb)
                .ok_or(GenerateError::MissingFace(face))?;
            let opaque = format == OutputColorFormat::DXT1;
            for pixel in as_rgba_pixels_mut(&mut rgba) {
                // ARGB8888 is stored as BGRA
                pixel.swap(0, 2);
                if opaque {
                    pixel[3] = 255;
                }
            }

            let mut flags = block_format
                | DxtFlags::COLOUR_CLUSTER_FIT
                | DxtFlags::COLOUR_ITERATIVE_CLUSTER_FIT
                | DxtFlags::COLOUR_METRIC_UNIFORM;
            if !opaque && convert_to_srgb {
                flags |= DxtFlags::WEIGHT_COLOUR_BY_ALPHA;
            }

            let slice_len = codec.storage_requirements(width, height, flags)?;
            let mut data = vec![0; slice_len * depth as usize];
            let slice_pixels = width as usize * height as usize * 4;
            for (slice, blocks) in rgba
                .chunks_exact(slice_pixels)
                .zip(data.chunks_exact_mut(slice_len))
            {
                codec.compress(slice, width, height, flags, blocks)?;
            }
            data
        }
        None => {
            let color_format = match format {
                OutputColorFormat::DUDV => {
                    warn!("DUDV output is packed as AL88");
                    ColorFormat::AL88
                }
                _ => format
                    .compatible_color_format()
                    .ok_or(FormatError::NotDirectlyConvertible(format))?,
            };
            image
                .generate_format_data(face, color_format, convert_to_srgb)
                .ok_or(GenerateError::MissingFace(face))?
        }
    };

    Ok(MipInfo {
        width,
        height,
        depth,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn filled(width: u32, height: u32, color: Vec4) -> Image {
        let mut image = Image::new(width, height, ColorFormat::ARGB8888).unwrap();
        for y in 0..height {
            for x in 0..width {
                image.write(x, y, 0, color);
            }
        }
        image
    }

    fn options(format: OutputColorFormat) -> MipGenOptions {
        MipGenOptions {
            output_format: format,
            ..Default::default()
        }
    }

    #[test]
    fn full_chain_halves() {
        let image = filled(16, 4, Vec4::splat(0.5));
        let mips = image
            .generate_mip_set(&options(OutputColorFormat::A8), &RuntimeSettings::default())
            .unwrap();
        assert_eq!(mips.levels_used, 5);
        let sizes: Vec<_> = mips.levels[0][..5]
            .iter()
            .map(|l| (l.width, l.height))
            .collect();
        assert_eq!(sizes, [(16, 4), (8, 2), (4, 1), (2, 1), (1, 1)]);
        assert_eq!(mips.datasize[..5], [64, 16, 4, 2, 1]);
    }

    #[test]
    fn level_requests_are_clamped() {
        let image = filled(4, 4, Vec4::ONE);
        let mut o = options(OutputColorFormat::ARGB8888);
        o.levels = 2;
        let mips = image.generate_mip_set(&o, &RuntimeSettings::default()).unwrap();
        assert_eq!(mips.levels_used, 2);

        o.levels = 40;
        let mips = image.generate_mip_set(&o, &RuntimeSettings::default()).unwrap();
        assert_eq!(mips.levels_used, 3);
        let sizes: Vec<_> = mips.levels[0][..3]
            .iter()
            .map(|l| (l.width, l.height))
            .collect();
        assert_eq!(sizes, [(4, 4), (2, 2), (1, 1)]);
        assert!(mips.levels[0][3].data.is_empty());
        assert_eq!(mips.header().mipmap_count, 3);
    }

    #[test]
    fn dxt_level_requests_stop_at_block_size() {
        let image = filled(16, 16, Vec4::new(0.2, 0.4, 0.6, 1.0));
        let mut o = options(OutputColorFormat::DXT1);
        o.levels = 40;
        let mips = image.generate_mip_set(&o, &RuntimeSettings::default()).unwrap();
        assert_eq!(mips.levels_used, 3);
        let sizes: Vec<_> = mips.levels[0][..3]
            .iter()
            .map(|l| (l.width, l.height))
            .collect();
        assert_eq!(sizes, [(16, 16), (8, 8), (4, 4)]);
    }

    #[test]
    fn dxt_chain_stops_at_block_size() {
        let image = filled(16, 16, Vec4::new(0.2, 0.4, 0.6, 0.5));
        let mips = image
            .generate_mip_set(&options(OutputColorFormat::DXT5), &RuntimeSettings::default())
            .unwrap();
        assert_eq!(mips.format, OutputColorFormat::DXT5);
        assert_eq!(mips.levels_used, 3);
        assert_eq!(mips.levels[0][2].width, 4);
        assert_eq!(mips.datasize[..3], [256, 64, 16]);
    }

    #[test]
    fn point_composite_blends_point_samples() {
        let mut image = filled(2, 1, Vec4::ZERO);
        image.write(1, 0, 0, Vec4::ONE);
        let mut o = options(OutputColorFormat::FloatMap);
        o.filter = FilterType::PointComposite;
        let mips = image.generate_mip_set(&o, &RuntimeSettings::default()).unwrap();
        assert_eq!(mips.levels_used, 2);
        // cubic average 0.5 blended with the point sample 0.0
        let value = f32::from_le_bytes(mips.levels[0][1].data[..4].try_into().unwrap());
        assert!((value - 0.25).abs() < 1e-4);
    }

    #[test]
    fn srgb_flags_follow_options() {
        let image = filled(4, 4, Vec4::ONE);
        let runtime = RuntimeSettings {
            srgb_expand_a: true,
            ..Default::default()
        };
        let mut o = options(OutputColorFormat::ARGB8888);
        o.convert_to_srgb = true;
        let mips = image.generate_mip_set(&o, &runtime).unwrap();
        assert!(mips.runtime.should_convert_to_srgb());
        assert!(!mips.runtime.srgb_expand_a);
    }

    #[test]
    fn finalized_size_rounds_up_and_clamps() {
        let settings = TextureGenerationSettings {
            scale: 0.5,
            max_size: 64,
            ..Default::default()
        };
        assert_eq!(finalized_size(100, 300, &settings), (64, 64));
        assert_eq!(finalized_size(40, 20, &settings), (32, 16));
    }
}
