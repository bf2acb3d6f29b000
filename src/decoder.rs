use std::io::{ErrorKind, Read};

use log::{debug, trace};

use crate::{
    cast::as_rgba_pixels_mut, check_size_flags, BlockCodec, ColorFormat, DataLayout,
    DecodeError, DxtFlags, Header, Image, LevelDescriptor, MipInfo, MipSet,
    OutputColorFormat, TextureType, VOLUME_MAX_DEPTH,
};

/// Additional options for the DDS loader specifying how to read and interpret
/// the header.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Options {
    /// Whether magic bytes should be skipped when reading the header.
    ///
    /// DDS files typically start with the magic bytes `"DDS "`. By default, the
    /// loader will check for these bytes and error if they are not present.
    ///
    /// If this is set to `true`, the loader assumes that the magic bytes are
    /// not present and immediately starts reading the header.
    ///
    /// Defaults to `false`.
    pub skip_magic_bytes: bool,

    /// The maximum allowed width and height of the top level.
    ///
    /// The size is defined by the file, so a malicious or corrupted file can
    /// declare a surface far larger than the data it contains. This limits
    /// how much memory the loader will allocate.
    ///
    /// Defaults to `16384`.
    pub max_dimension: u32,

    /// The maximum allowed depth of a volume texture.
    ///
    /// Defaults to [`VOLUME_MAX_DEPTH`].
    pub max_depth: u32,

    /// Whether 32 bit files with ARGB8888 masks are read as RGBE.
    ///
    /// RGBE data is written with the masks of ARGB8888 and cannot be told
    /// apart from it.
    ///
    /// Defaults to `false`.
    pub argb8888_as_rgbe: bool,

    /// Whether [`load_dds`] converts the color channels from sRGB to linear.
    ///
    /// Defaults to `false`.
    pub convert_to_linear: bool,
}
impl Default for Options {
    fn default() -> Self {
        Self {
            skip_magic_bytes: false,
            max_dimension: 16384,
            max_depth: VOLUME_MAX_DEPTH,
            argb8888_as_rgbe: false,
            convert_to_linear: false,
        }
    }
}

/// Reads the header of a DDS file and the layout of its data section.
pub struct DdsDecoder {
    header: Header,
    format: Option<OutputColorFormat>,
    color_format: Option<ColorFormat>,
    layout: DataLayout,
}

impl DdsDecoder {
    /// Creates a new decoder by reading the header from the given reader.
    ///
    /// This is equivalent to calling `DdsDecoder::new_with(r, &Options::default())`.
    pub fn new<R: Read>(r: &mut R) -> Result<Self, DecodeError> {
        Self::new_with(r, &Options::default())
    }
    /// Creates a new decoder with the given options by reading the header from the given reader.
    ///
    /// If this operations succeeds, the given reader will be positioned at the start of the data
    /// section.
    pub fn new_with<R: Read>(r: &mut R, options: &Options) -> Result<Self, DecodeError> {
        if !options.skip_magic_bytes {
            Header::read_magic(r)?;
        }
        let header = Header::read(r)?;

        Self::from_header_with(header, options)
    }

    pub fn from_header(header: Header) -> Result<Self, DecodeError> {
        Self::from_header_with(header, &Options::default())
    }
    pub fn from_header_with(header: Header, options: &Options) -> Result<Self, DecodeError> {
        let mut color_format = ColorFormat::from_pixel_format(&header.pixel_format).ok();
        let mut format = match OutputColorFormat::from_pixel_format(&header.pixel_format) {
            Ok(format) => Some(format),
            Err(_) if color_format == Some(ColorFormat::L16) => None,
            Err(error) => return Err(error.into()),
        };

        if options.argb8888_as_rgbe && format == Some(OutputColorFormat::ARGB8888) {
            format = Some(OutputColorFormat::RGBE);
            color_format = Some(ColorFormat::RGBE);
        }

        let storage = storage_format(format);
        check_size_flags(&header, storage)?;
        let layout = DataLayout::from_header(&header, storage, options)?;

        debug!(
            "DDS {}x{} {:?} {} with {} level(s)",
            header.width,
            header.height,
            layout.texture_type(),
            storage,
            layout.levels().len()
        );

        Ok(Self {
            header,
            format,
            color_format,
            layout,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }
    /// The format of the file, if it can be stored in a [`MipSet`].
    pub fn format(&self) -> Option<OutputColorFormat> {
        self.format
    }
    /// The in-memory format the pixels can be read into directly.
    ///
    /// `None` for block compressed and DUDV data.
    pub fn color_format(&self) -> Option<ColorFormat> {
        self.color_format
    }
    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    /// The depth of the texture in the convention of [`Image`] and
    /// [`MipSet`].
    fn depth(&self) -> u32 {
        match self.layout.texture_type() {
            TextureType::Cube => 0,
            TextureType::Regular => 1,
            TextureType::Volume => self.layout.main().depth,
        }
    }

    /// Reads all faces and levels as stored.
    pub fn read_mip_set<R: Read>(&self, r: &mut R) -> Result<MipSet, DecodeError> {
        let format = self.format.ok_or(DecodeError::UnsupportedFormat)?;
        let main = self.layout.main();

        let mut mips = MipSet {
            width: main.width,
            height: main.height,
            depth: self.depth(),
            texture_type: self.layout.texture_type(),
            levels_used: self.layout.levels().len() as u32,
            format,
            ..Default::default()
        };

        for &face in self.layout.faces() {
            for (level, descriptor) in self.layout.levels().iter().enumerate() {
                trace!("Reading face {} level {}", face, level);
                let data = read_level(r, descriptor, format)?;
                mips.datasize[level] = data.len();
                mips.levels[face][level] = MipInfo {
                    width: descriptor.width,
                    height: descriptor.height,
                    depth: descriptor.depth,
                    data,
                };
            }
        }

        Ok(mips)
    }

    /// Reads the top level of every face into an image.
    ///
    /// Block compressed data is decompressed with `codec`. Cube faces that
    /// are not stored in the file are left black.
    pub fn read_image<R: Read>(
        &self,
        r: &mut R,
        codec: &dyn BlockCodec,
    ) -> Result<Image, DecodeError> {
        let storage = storage_format(self.format);
        let main = self.layout.main();
        let native = self.color_format.unwrap_or(ColorFormat::ARGB8888);
        let mut image = Image::new_with_depth(main.width, main.height, self.depth(), native)?;

        let mip_len = (self.layout.face_len() - main.len) as u64;
        for &face in self.layout.faces() {
            let data = read_level(r, main, storage)?;

            match (self.color_format, storage) {
                (Some(color_format), _) => image.fill_face_data(face, color_format, &data)?,
                (None, OutputColorFormat::DUDV) => fill_dudv(&mut image, face, &data),
                (None, format) => {
                    let flags = format.dxt_flags().ok_or(DecodeError::UnsupportedFormat)?;
                    let rgba = decompress_slices(codec, &data, main, flags)?;
                    image.fill_face_data(face, ColorFormat::ARGB8888, &rgba)?;
                }
            }

            // the remaining levels are not part of the image
            std::io::copy(&mut r.by_ref().take(mip_len), &mut std::io::sink())?;
        }

        Ok(image)
    }
}

/// The format that determines the byte size of each level.
fn storage_format(format: Option<OutputColorFormat>) -> OutputColorFormat {
    // 16 bit luminance is only readable, it is sized like AL88
    format.unwrap_or(OutputColorFormat::AL88)
}

/// Reads one level and removes row padding.
fn read_level<R: Read>(
    r: &mut R,
    level: &LevelDescriptor,
    format: OutputColorFormat,
) -> Result<Vec<u8>, DecodeError> {
    let mut data = Vec::new();
    r.by_ref().take(level.len as u64).read_to_end(&mut data)?;
    if data.len() < level.len {
        return Err(std::io::Error::from(ErrorKind::UnexpectedEof).into());
    }

    if let Some(pitch) = level.row_pitch {
        let row_len = format.level_size(level.width, 1, 1);
        data = data
            .chunks_exact(pitch)
            .flat_map(|row| &row[..row_len])
            .copied()
            .collect();
    }
    Ok(data)
}

/// Decompresses every depth slice into ARGB8888 bytes.
fn decompress_slices(
    codec: &dyn BlockCodec,
    blocks: &[u8],
    level: &LevelDescriptor,
    flags: DxtFlags,
) -> Result<Vec<u8>, DecodeError> {
    let slice_len = codec.storage_requirements(level.width, level.height, flags)?;
    let pixels = level.width as usize * level.height as usize * 4;
    let depth = level.depth.max(1) as usize;

    let mut rgba = vec![0; pixels * depth];
    for (slice, out) in blocks
        .chunks_exact(slice_len)
        .take(depth)
        .zip(rgba.chunks_exact_mut(pixels))
    {
        codec.decompress(slice, level.width, level.height, flags, out)?;
    }

    // ARGB8888 is stored as BGRA
    for pixel in as_rgba_pixels_mut(&mut rgba) {
        pixel.swap(0, 2);
    }
    Ok(rgba)
}

/// Reads signed 8 bit du/dv pairs and reconstructs the third normal
/// component.
fn fill_dudv(image: &mut Image, face: usize, data: &[u8]) {
    let target = match image.face_mut(face) {
        Some(target) => target,
        None => return,
    };
    let [r, g, b, a] = target.planes_mut();
    for (i, pair) in data.chunks_exact(2).enumerate().take(r.len()) {
        let du = pair[0] as f32 / 255.0;
        let dv = pair[1] as f32 / 255.0;
        let x = du * 2.0 - 1.0;
        let y = dv * 2.0 - 1.0;
        let z = (1.0 - (x * x + y * y).sqrt()).clamp(0.0, 1.0);

        r[i] = du;
        g[i] = dv;
        b[i] = z * 0.5 + 0.5;
        a[i] = 1.0;
    }
}

/// Loads all faces and levels of a DDS file as stored.
///
/// Fails with [`DecodeError::UnsupportedFormat`] for formats that have no
/// [`OutputColorFormat`], like 16 bit luminance.
pub fn load_dds_to_mip_set<R: Read>(r: &mut R, options: &Options) -> Result<MipSet, DecodeError> {
    let decoder = DdsDecoder::new_with(r, options)?;
    decoder.read_mip_set(r)
}

/// Loads the top level of every face of a DDS file into an image.
///
/// DXT data is decompressed with `codec`. Mipmaps are skipped.
pub fn load_dds<R: Read>(
    r: &mut R,
    codec: &dyn BlockCodec,
    options: &Options,
) -> Result<Image, DecodeError> {
    let decoder = DdsDecoder::new_with(r, options)?;
    let mut image = decoder.read_image(r, codec)?;
    if options.convert_to_linear {
        image.convert_srgb_to_linear();
    }
    Ok(image)
}
