use crate::{
    header::{DdsFlags, FourCC},
    ColorFormat, OutputColorFormat,
};

#[derive(Debug)]
#[non_exhaustive]
pub enum FormatError {
    UnsupportedFourCC(FourCC),
    UnsupportedPixelFormat,
    /// The output format has no in-memory [`ColorFormat`] counterpart.
    ///
    /// This is the case for block-compressed formats and DUDV.
    NotDirectlyConvertible(OutputColorFormat),
    /// The destination or one of the channel buffers is too short for the
    /// number of pixels requested.
    BufferTooSmall {
        format: ColorFormat,
        expected: usize,
        actual: usize,
    },
}
impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatError::UnsupportedFourCC(four_cc) => {
                write!(f, "Unsupported {:?} in DDS pixel format", four_cc)
            }
            FormatError::UnsupportedPixelFormat => {
                write!(f, "Unsupported pixel format in the DDS header")
            }
            FormatError::NotDirectlyConvertible(format) => {
                write!(
                    f,
                    "Output format {} has no directly compatible color format",
                    format
                )
            }
            FormatError::BufferTooSmall {
                format,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Buffer too small for {:?}: expected at least {} elements, got {}",
                    format, expected, actual
                )
            }
        }
    }
}
impl std::error::Error for FormatError {}

#[derive(Debug)]
#[non_exhaustive]
pub enum LayoutError {
    /// Mip sets hold at most [`crate::MAX_TEXTURE_MIPS`] levels.
    TooManyMipMaps(u32),
    /// The width, height, or depth of the texture is zero.
    ZeroDimension,
    /// The width or height exceeds the limit set in [`crate::Options`].
    DimensionTooLarge(u32),
    /// The depth of a volume exceeds the limit set in [`crate::Options`].
    VolumeTooDeep(u32),
    /// The header of the DDS file describes a data section that is too large.
    DataLayoutTooBig,
    /// A cube map without any face bits.
    MissingCubeFaces,
}
impl std::fmt::Display for LayoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayoutError::TooManyMipMaps(mipmaps) => {
                write!(
                    f,
                    "Too many mipmaps ({}), the maximum supported is {}",
                    mipmaps,
                    crate::MAX_TEXTURE_MIPS
                )
            }
            LayoutError::ZeroDimension => {
                write!(f, "The width, height, or depth of the texture is zero")
            }
            LayoutError::DimensionTooLarge(size) => {
                write!(f, "Texture dimension {} is too large", size)
            }
            LayoutError::VolumeTooDeep(depth) => {
                write!(f, "Volume depth {} is too large", depth)
            }
            LayoutError::DataLayoutTooBig => {
                write!(f, "Data layout described by the header is too large")
            }
            LayoutError::MissingCubeFaces => {
                write!(f, "Cube map does not declare any faces")
            }
        }
    }
}
impl std::error::Error for LayoutError {}

#[derive(Debug)]
#[non_exhaustive]
pub enum HeaderError {
    InvalidMagicBytes([u8; 4]),
    InvalidHeaderSize(u32),
    InvalidPixelFormatSize(u32),
    /// One of `CAPS`, `HEIGHT`, `WIDTH` or `PIXELFORMAT` is missing.
    MissingRequiredFlags(DdsFlags),
    /// An uncompressed surface declared a linear size instead of a pitch.
    UnexpectedLinearSize,

    Io(std::io::Error),
}

impl std::fmt::Display for HeaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeaderError::InvalidMagicBytes(bytes) => {
                write!(
                    f,
                    "Invalid magic bytes {:?}, expected {:?} (ASCII: 'DDS ')",
                    bytes,
                    crate::Header::MAGIC
                )
            }
            HeaderError::InvalidHeaderSize(size) => {
                write!(f, "Invalid DDS header size of {}, expected 124", size)
            }
            HeaderError::InvalidPixelFormatSize(size) => {
                write!(
                    f,
                    "Invalid DDS header pixel format size of {}, expected 32",
                    size
                )
            }
            HeaderError::MissingRequiredFlags(flags) => {
                write!(
                    f,
                    "DDS header flags {:?} are missing required flags {:?}",
                    flags,
                    DdsFlags::REQUIRED.difference(*flags)
                )
            }
            HeaderError::UnexpectedLinearSize => {
                write!(f, "Uncompressed DDS surfaces must not declare a linear size")
            }

            HeaderError::Io(error) => write!(f, "I/O error: {}", error),
        }
    }
}

impl From<std::io::Error> for HeaderError {
    fn from(error: std::io::Error) -> Self {
        HeaderError::Io(error)
    }
}
impl std::error::Error for HeaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HeaderError::Io(error) => Some(error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CodecError {
    /// Neither `DXT1`, `DXT3` nor `DXT5` was given.
    MissingBlockFormat,
    BufferTooSmall { expected: usize, actual: usize },
}
impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::MissingBlockFormat => {
                write!(f, "No block format (DXT1, DXT3, DXT5) was selected")
            }
            CodecError::BufferTooSmall { expected, actual } => {
                write!(
                    f,
                    "Buffer too small: expected {} bytes, got {}",
                    expected, actual
                )
            }
        }
    }
}
impl std::error::Error for CodecError {}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ImageError {
    ZeroDimension,
    VolumeTooDeep(u32),
    /// The face index is out of range or the face is not allocated.
    InvalidFace(usize),
    BufferTooSmall {
        expected: usize,
        actual: usize,
    },
}
impl std::fmt::Display for ImageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageError::ZeroDimension => write!(f, "Image width and height must be non-zero"),
            ImageError::VolumeTooDeep(depth) => write!(
                f,
                "Volume depth {} exceeds the maximum of {}",
                depth,
                crate::VOLUME_MAX_DEPTH
            ),
            ImageError::InvalidFace(face) => write!(f, "Face {} is not present", face),
            ImageError::BufferTooSmall { expected, actual } => write!(
                f,
                "Pixel buffer too small: expected {} bytes, got {}",
                expected, actual
            ),
        }
    }
}
impl std::error::Error for ImageError {}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SwizzleError {
    NotPowerOfTwo {
        width: u32,
        height: u32,
        depth: u32,
    },
    NotEnoughData {
        expected: usize,
        actual: usize,
    },
}
impl std::fmt::Display for SwizzleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwizzleError::NotPowerOfTwo {
                width,
                height,
                depth,
            } => write!(
                f,
                "Swizzling requires power of two dimensions, got {}x{}x{}",
                width, height, depth
            ),
            SwizzleError::NotEnoughData { expected, actual } => write!(
                f,
                "Not enough data. Expected {} bytes but found {} bytes",
                expected, actual
            ),
        }
    }
}
impl std::error::Error for SwizzleError {}

#[derive(Debug)]
#[non_exhaustive]
pub enum GenerateError {
    /// Volumes cannot be rescaled or padded.
    UnsupportedVolumeOperation,
    /// The source image has no data for the requested face.
    MissingFace(usize),
    Format(FormatError),
    Codec(CodecError),
    Image(ImageError),
}
impl std::fmt::Display for GenerateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerateError::UnsupportedVolumeOperation => {
                write!(f, "Volume textures cannot be rescaled")
            }
            GenerateError::MissingFace(face) => {
                write!(f, "Source image has no face {}", face)
            }
            GenerateError::Format(error) => write!(f, "{}", error),
            GenerateError::Codec(error) => write!(f, "Block compression failed: {}", error),
            GenerateError::Image(error) => write!(f, "{}", error),
        }
    }
}
impl std::error::Error for GenerateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenerateError::Format(error) => Some(error),
            GenerateError::Codec(error) => Some(error),
            GenerateError::Image(error) => Some(error),
            _ => None,
        }
    }
}
impl From<FormatError> for GenerateError {
    fn from(error: FormatError) -> Self {
        GenerateError::Format(error)
    }
}
impl From<CodecError> for GenerateError {
    fn from(error: CodecError) -> Self {
        GenerateError::Codec(error)
    }
}
impl From<ImageError> for GenerateError {
    fn from(error: ImageError) -> Self {
        GenerateError::Image(error)
    }
}

#[derive(Debug)]
#[non_exhaustive]
pub enum DecodeError {
    /// The file is valid, but the pixel format has no in-memory
    /// representation and no block decoder applies.
    UnsupportedFormat,

    Layout(LayoutError),
    Format(FormatError),
    Header(HeaderError),
    Codec(CodecError),
    Image(ImageError),
    Io(std::io::Error),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::UnsupportedFormat => {
                write!(f, "The DDS pixel format cannot be loaded into an image")
            }

            DecodeError::Layout(error) => write!(f, "{}", error),
            DecodeError::Format(error) => write!(f, "{}", error),
            DecodeError::Header(error) => write!(f, "Header error: {}", error),
            DecodeError::Codec(error) => write!(f, "Block decompression failed: {}", error),
            DecodeError::Image(error) => write!(f, "{}", error),
            DecodeError::Io(error) => write!(f, "I/O error: {}", error),
        }
    }
}

impl From<LayoutError> for DecodeError {
    fn from(error: LayoutError) -> Self {
        DecodeError::Layout(error)
    }
}
impl From<FormatError> for DecodeError {
    fn from(error: FormatError) -> Self {
        DecodeError::Format(error)
    }
}
impl From<HeaderError> for DecodeError {
    fn from(error: HeaderError) -> Self {
        DecodeError::Header(error)
    }
}
impl From<CodecError> for DecodeError {
    fn from(error: CodecError) -> Self {
        DecodeError::Codec(error)
    }
}
impl From<ImageError> for DecodeError {
    fn from(error: ImageError) -> Self {
        DecodeError::Image(error)
    }
}
impl From<std::io::Error> for DecodeError {
    fn from(error: std::io::Error) -> Self {
        DecodeError::Io(error)
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Layout(error) => Some(error),
            DecodeError::Format(error) => Some(error),
            DecodeError::Header(error) => Some(error),
            DecodeError::Codec(error) => Some(error),
            DecodeError::Image(error) => Some(error),
            DecodeError::Io(error) => Some(error),
            _ => None,
        }
    }
}

#[derive(Debug)]
#[non_exhaustive]
pub enum EncodeError {
    UnsupportedFormat(OutputColorFormat),
    /// The image format has no output format to default to.
    UnsupportedColorFormat(ColorFormat),
    /// A face or level that the header announces has no data.
    MissingLevelData {
        face: usize,
        level: usize,
    },

    Generate(GenerateError),
    Io(std::io::Error),
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            EncodeError::UnsupportedFormat(format) => {
                write!(f, "Unsupported format: {}", format)
            }
            EncodeError::UnsupportedColorFormat(format) => {
                write!(f, "No output format for images in {}", format)
            }
            EncodeError::MissingLevelData { face, level } => {
                write!(f, "Missing data for face {} level {}", face, level)
            }

            EncodeError::Generate(err) => write!(f, "Generate error: {}", err),
            EncodeError::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}
impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EncodeError::Generate(err) => Some(err),
            EncodeError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GenerateError> for EncodeError {
    fn from(err: GenerateError) -> Self {
        EncodeError::Generate(err)
    }
}
impl From<std::io::Error> for EncodeError {
    fn from(err: std::io::Error) -> Self {
        EncodeError::Io(err)
    }
}
