use crate::{
    util::{read_u32_le_array, write_u32_le_array},
    HeaderError,
};
use bitflags::bitflags;
use std::io::{Read, Write};

/// The legacy DDS header.
///
/// This structure contains parsed data. It is produced by the reader and
/// assembled by the writer.
///
/// https://learn.microsoft.com/en-us/windows/win32/direct3ddds/dds-header
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Header {
    /// Flags to indicate which members contain valid data.
    pub flags: DdsFlags,
    /// Surface height (in pixels).
    pub height: u32,
    /// Surface width (in pixels).
    pub width: u32,
    /// The row pitch of uncompressed data or the byte size of the top level
    /// of compressed data.
    pub pitch_or_linear_size: u32,
    /// Depth of a volume texture (in pixels).
    ///
    /// This is `None` if `flags` does not contain [`DdsFlags::DEPTH`].
    pub depth: Option<u32>,
    /// Number of mipmap levels as stored in the file.
    pub mipmap_count: u32,
    pub pixel_format: PixelFormat,
    /// Specifies the complexity of the surfaces stored.
    pub caps: DdsCaps,
    /// Additional detail about the surfaces stored.
    pub caps2: DdsCaps2,
}

impl Header {
    const SIZE: usize = 124;
    const INTS: usize = Self::SIZE / 4;

    /// The magic bytes (`'DDS '`) at the start of every DDS file.
    pub const MAGIC: [u8; 4] = *b"DDS ";

    /// The magic bytes `'DDS '` are at the start of every DDS file. This
    /// function reads the magic bytes and checks if they are correct.
    ///
    /// See [`Header::MAGIC`] for the expected magic bytes.
    pub fn read_magic<R: Read>(reader: &mut R) -> Result<(), HeaderError> {
        let mut buffer = [0; 4];
        reader.read_exact(&mut buffer)?;

        if buffer != Self::MAGIC {
            return Err(HeaderError::InvalidMagicBytes(buffer));
        }

        Ok(())
    }

    /// Reads the header without magic bytes from a reader.
    ///
    /// The size field and the required flags are validated before any other
    /// field is trusted. If the header is read successfully, the reader will
    /// be at the start of the pixel data.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self, HeaderError> {
        let buffer: [u32; Self::INTS] = read_u32_le_array(reader)?;

        if buffer[0] != Self::SIZE as u32 {
            return Err(HeaderError::InvalidHeaderSize(buffer[0]));
        }

        let flags = DdsFlags::from_bits_retain(buffer[1]);
        if !flags.contains(DdsFlags::REQUIRED) {
            return Err(HeaderError::MissingRequiredFlags(flags));
        }

        let height = buffer[2];
        let width = buffer[3];
        let depth = if flags.contains(DdsFlags::DEPTH) {
            Some(buffer[5])
        } else {
            None
        };

        let pixel_format = PixelFormat::read_buffer([
            buffer[18], buffer[19], buffer[20], buffer[21], buffer[22], buffer[23], buffer[24],
            buffer[25],
        ])?;

        let caps = DdsCaps::from_bits_retain(buffer[26]);
        let caps2 = DdsCaps2::from_bits_retain(buffer[27]);

        Ok(Self {
            flags,
            height,
            width,
            pitch_or_linear_size: buffer[4],
            depth,
            mipmap_count: buffer[6],
            pixel_format,
            caps,
            caps2,
        })
    }

    /// Writes the magic bytes followed by the header.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), std::io::Error> {
        writer.write_all(&Self::MAGIC)?;

        let mut buffer = [0_u32; Self::INTS];
        buffer[0] = Self::SIZE as u32;
        buffer[1] = self.flags.bits();
        buffer[2] = self.height;
        buffer[3] = self.width;
        buffer[4] = self.pitch_or_linear_size;
        buffer[5] = self.depth.unwrap_or(0);
        buffer[6] = self.mipmap_count;
        buffer[18..26].copy_from_slice(&self.pixel_format.to_buffer());
        buffer[26] = self.caps.bits();
        buffer[27] = self.caps2.bits();

        write_u32_le_array(writer, &buffer)
    }

    pub fn is_cube_map(&self) -> bool {
        self.caps2.contains(DdsCaps2::CUBE_MAP)
    }
    pub fn is_volume(&self) -> bool {
        self.caps2.contains(DdsCaps2::VOLUME)
    }

    /// The cube faces present in the file, in storage order.
    pub fn cube_faces(&self) -> impl Iterator<Item = usize> + '_ {
        (0..6).filter(move |&face| {
            self.caps2
                .contains(DdsCaps2::from_bits_retain(DdsCaps2::CUBE_MAP_POSITIVE_X.bits() << face))
        })
    }

    /// The number of mipmaps stored in the file.
    ///
    /// The stored count is only honored when the caps announce mipmaps.
    pub fn levels(&self) -> u32 {
        if self.caps.contains(DdsCaps::MIPMAP) {
            self.mipmap_count.max(1)
        } else {
            1
        }
    }
}

/// The DDS_PIXELFORMAT structure describes the pixel format of the surface or volume texture.
///
/// https://learn.microsoft.com/en-us/windows/win32/direct3ddds/dds-pixelformat
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PixelFormat {
    /// Values which indicate what type of data is in the surface.
    pub flags: PixelFormatFlags,
    /// Four-character codes for specifying compressed or custom formats.
    ///
    /// This is `None` if `flags` does not contain [`PixelFormatFlags::FOURCC`].
    pub four_cc: Option<FourCC>,
    /// Number of bits per pixel, also written for FourCC formats.
    pub rgb_bit_count: u32,
    /// Red (or luminance) mask for reading color data. For instance, given the A8R8G8B8 format, the red mask would be 0x00ff0000.
    pub r_bit_mask: u32,
    /// Green mask for reading color data. For instance, given the A8R8G8B8 format, the green mask would be 0x0000ff00.
    pub g_bit_mask: u32,
    /// Blue mask for reading color data. For instance, given the A8R8G8B8 format, the blue mask would be 0x000000ff.
    pub b_bit_mask: u32,
    /// Alpha mask for reading alpha data. For instance, given the A8R8G8B8 format, the alpha mask would be 0xff000000.
    pub a_bit_mask: u32,
}
impl PixelFormat {
    const SIZE: usize = 32;
    const INTS: usize = Self::SIZE / 4;

    fn read_buffer(buffer: [u32; Self::INTS]) -> Result<Self, HeaderError> {
        if buffer[0] != PixelFormat::SIZE as u32 {
            return Err(HeaderError::InvalidPixelFormatSize(buffer[0]));
        }

        let flags = PixelFormatFlags::from_bits_retain(buffer[1]);
        let four_cc = if flags.contains(PixelFormatFlags::FOURCC) {
            Some(FourCC::from(buffer[2]))
        } else {
            None
        };

        Ok(Self {
            flags,
            four_cc,
            rgb_bit_count: buffer[3],
            r_bit_mask: buffer[4],
            g_bit_mask: buffer[5],
            b_bit_mask: buffer[6],
            a_bit_mask: buffer[7],
        })
    }

    fn to_buffer(&self) -> [u32; Self::INTS] {
        [
            Self::SIZE as u32,
            self.flags.bits(),
            self.four_cc.map(u32::from).unwrap_or(0),
            self.rgb_bit_count,
            self.r_bit_mask,
            self.g_bit_mask,
            self.b_bit_mask,
            self.a_bit_mask,
        ]
    }

    /// Creates a new pixel format with the given four-character code.
    ///
    /// This is a convenience function for creating a pixel format with the
    /// [`PixelFormatFlags::FOURCC`] flag set.
    pub fn new_four_cc(four_cc: FourCC, rgb_bit_count: u32) -> Self {
        Self {
            flags: PixelFormatFlags::FOURCC,
            four_cc: Some(four_cc),
            rgb_bit_count,
            r_bit_mask: 0,
            g_bit_mask: 0,
            b_bit_mask: 0,
            a_bit_mask: 0,
        }
    }

    /// Creates a new bit mask based pixel format.
    pub fn new_masks(flags: PixelFormatFlags, rgb_bit_count: u32, masks: [u32; 4]) -> Self {
        Self {
            flags,
            four_cc: None,
            rgb_bit_count,
            r_bit_mask: masks[0],
            g_bit_mask: masks[1],
            b_bit_mask: masks[2],
            a_bit_mask: masks[3],
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct DdsFlags: u32 {
        /// Required in every .dds file.
        const CAPS = 0x1;
        /// Required in every .dds file.
        const HEIGHT = 0x2;
        /// Required in every .dds file.
        const WIDTH = 0x4;
        /// Required when pitch is provided for an uncompressed texture.
        const PITCH = 0x8;
        /// Required in every .dds file.
        const PIXEL_FORMAT = 0x1000;
        /// Required in a mipmapped texture.
        const MIPMAP_COUNT = 0x20000;
        /// Required when pitch is provided for a compressed texture.
        const LINEAR_SIZE = 0x80000;
        /// Required in a depth texture.
        const DEPTH = 0x800000;

        /// Required in every .dds file.
        const REQUIRED = Self::CAPS.bits()
            | Self::HEIGHT.bits()
            | Self::WIDTH.bits()
            | Self::PIXEL_FORMAT.bits();
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct DdsCaps: u32 {
        /// Optional; must be used on any file that contains more than one surface (a mipmap, a cubic environment map, or mipmapped volume texture).
        const COMPLEX = 0x8;
        /// Optional; should be used for a mipmap.
        const MIPMAP = 0x400000;
        /// Required
        const TEXTURE = 0x1000;
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct DdsCaps2: u32 {
        /// Required for a cube map.
        const CUBE_MAP = 0x200;
        /// Required when these surfaces are stored in a cube map.
        const CUBE_MAP_POSITIVE_X = 0x400;
        /// Required when these surfaces are stored in a cube map.
        const CUBE_MAP_NEGATIVE_X = 0x800;
        /// Required when these surfaces are stored in a cube map.
        const CUBE_MAP_POSITIVE_Y = 0x1000;
        /// Required when these surfaces are stored in a cube map.
        const CUBE_MAP_NEGATIVE_Y = 0x2000;
        /// Required when these surfaces are stored in a cube map.
        const CUBE_MAP_POSITIVE_Z = 0x4000;
        /// Required when these surfaces are stored in a cube map.
        const CUBE_MAP_NEGATIVE_Z = 0x8000;
        /// Required for a volume texture.
        const VOLUME = 0x200000;

        const CUBE_MAP_ALL_FACES = Self::CUBE_MAP_POSITIVE_X.bits()
            | Self::CUBE_MAP_NEGATIVE_X.bits()
            | Self::CUBE_MAP_POSITIVE_Y.bits()
            | Self::CUBE_MAP_NEGATIVE_Y.bits()
            | Self::CUBE_MAP_POSITIVE_Z.bits()
            | Self::CUBE_MAP_NEGATIVE_Z.bits();
    }

    /// Values which indicate what type of data is in the surface.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PixelFormatFlags: u32 {
        /// Texture contains alpha data; dwRGBAlphaBitMask contains valid data.
        const ALPHAPIXELS = 0x1;
        /// Used in some older DDS files for alpha channel only uncompressed data (dwRGBBitCount contains the alpha channel bitcount; dwABitMask contains valid data)
        const ALPHA = 0x2;
        /// Texture contains compressed RGB data; dwFourCC contains valid data.
        const FOURCC = 0x4;
        /// Texture contains uncompressed RGB data; dwRGBBitCount and the RGB masks (dwRBitMask, dwGBitMask, dwBBitMask) contain valid data.
        const RGB = 0x40;
        const RGBA = Self::RGB.bits() | Self::ALPHAPIXELS.bits();
        /// Used in some older DDS files for single channel color uncompressed data (dwRGBBitCount contains the luminance channel bit count; dwRBitMask contains the channel mask). Can be combined with DDPF_ALPHAPIXELS for a two channel DDS file.
        const LUMINANCE = 0x20000;
        const LUMINANCE_ALPHA = Self::LUMINANCE.bits() | Self::ALPHAPIXELS.bits();
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCC(pub u32);

impl FourCC {
    pub const DXT1: Self = FourCC(u32::from_le_bytes(*b"DXT1"));
    pub const DXT2: Self = FourCC(u32::from_le_bytes(*b"DXT2"));
    pub const DXT3: Self = FourCC(u32::from_le_bytes(*b"DXT3"));
    pub const DXT4: Self = FourCC(u32::from_le_bytes(*b"DXT4"));
    pub const DXT5: Self = FourCC(u32::from_le_bytes(*b"DXT5"));

    // Direct3D 9 format codes stored in the FourCC field.
    pub const R16F: Self = FourCC(111);
    pub const G16R16F: Self = FourCC(112);
    pub const A16B16G16R16F: Self = FourCC(113);
    pub const R32F: Self = FourCC(114);
    pub const G32R32F: Self = FourCC(115);
    pub const A32B32G32R32F: Self = FourCC(116);
    /// Private code for two channel tangent space normal maps.
    pub const DUDV: Self = FourCC(117);
}

impl From<u32> for FourCC {
    fn from(value: u32) -> Self {
        FourCC(value)
    }
}
impl From<FourCC> for u32 {
    fn from(value: FourCC) -> Self {
        value.0
    }
}

impl std::fmt::Debug for FourCC {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bytes = self.0.to_le_bytes();
        if bytes.iter().all(|&b| b.is_ascii_alphanumeric()) {
            write!(
                f,
                "FourCC(0x{:x}; {}{}{}{})",
                self.0, bytes[0] as char, bytes[1] as char, bytes[2] as char, bytes[3] as char
            )
        } else {
            write!(f, "FourCC({})", self.0)
        }
    }
}
