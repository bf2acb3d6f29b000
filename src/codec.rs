use bitflags::bitflags;

use crate::{decode, encode, util::div_ceil, CodecError};

bitflags! {
    /// Block compression flags with the same values as libsquish.
    ///
    /// Exactly one of `DXT1`, `DXT3` and `DXT5` selects the block format. The
    /// remaining flags are quality hints that a [`BlockCodec`] may ignore.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct DxtFlags: u32 {
        const DXT1 = 1 << 0;
        const DXT3 = 1 << 1;
        const DXT5 = 1 << 2;
        const COLOUR_CLUSTER_FIT = 1 << 3;
        const COLOUR_RANGE_FIT = 1 << 4;
        const COLOUR_METRIC_PERCEPTUAL = 1 << 5;
        const COLOUR_METRIC_UNIFORM = 1 << 6;
        const WEIGHT_COLOUR_BY_ALPHA = 1 << 7;
        const COLOUR_ITERATIVE_CLUSTER_FIT = 1 << 8;

        const FORMATS = Self::DXT1.bits() | Self::DXT3.bits() | Self::DXT5.bits();
    }
}

impl DxtFlags {
    /// The size of one 4x4 block in bytes.
    pub fn bytes_per_block(self) -> Result<usize, CodecError> {
        if self.contains(DxtFlags::DXT1) {
            Ok(8)
        } else if self.intersects(DxtFlags::DXT3 | DxtFlags::DXT5) {
            Ok(16)
        } else {
            Err(CodecError::MissingBlockFormat)
        }
    }
}

/// A DXT block compressor and decompressor.
///
/// The signature follows libsquish's `CompressImage`/`DecompressImage`: RGBA8
/// pixels, tightly packed, row by row.
pub trait BlockCodec {
    /// Compresses `width * height` RGBA8 pixels into `blocks`.
    fn compress(
        &self,
        rgba: &[u8],
        width: u32,
        height: u32,
        flags: DxtFlags,
        blocks: &mut [u8],
    ) -> Result<(), CodecError>;

    /// Decompresses blocks into `width * height` RGBA8 pixels.
    fn decompress(
        &self,
        blocks: &[u8],
        width: u32,
        height: u32,
        flags: DxtFlags,
        rgba: &mut [u8],
    ) -> Result<(), CodecError>;

    /// The number of bytes needed to store a compressed surface.
    fn storage_requirements(&self, width: u32, height: u32, flags: DxtFlags) -> Result<usize, CodecError> {
        storage_requirements(width, height, flags)
    }
}

/// The number of bytes needed to store a surface of `width * height` pixels
/// in the block format selected by `flags`.
pub fn storage_requirements(width: u32, height: u32, flags: DxtFlags) -> Result<usize, CodecError> {
    let blocks = div_ceil(width, 4) as usize * div_ceil(height, 4) as usize;
    Ok(blocks * flags.bytes_per_block()?)
}

/// The built-in codec.
///
/// Endpoints are fitted to the bounding box of each block. The quality hint
/// flags are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeFitCodec;

impl BlockCodec for RangeFitCodec {
    fn compress(
        &self,
        rgba: &[u8],
        width: u32,
        height: u32,
        flags: DxtFlags,
        blocks: &mut [u8],
    ) -> Result<(), CodecError> {
        encode::compress_surface(rgba, width, height, flags, blocks)
    }

    fn decompress(
        &self,
        blocks: &[u8],
        width: u32,
        height: u32,
        flags: DxtFlags,
        rgba: &mut [u8],
    ) -> Result<(), CodecError> {
        decode::decompress_surface(blocks, width, height, flags, rgba)
    }
}
