use std::io::Write;

use log::debug;

use crate::{
    DdsCaps, DdsCaps2, DdsFlags, EncodeError, FilterType, Header, Image, MipGenOptions, MipSet,
    OutputColorFormat, PostMipImageFilter, RuntimeSettings, TextureType, CUBE_NUM_FACES,
};

impl MipSet {
    /// The DDS header describing this mip set.
    pub fn header(&self) -> Header {
        let format = self.format;

        let mut flags = DdsFlags::REQUIRED | DdsFlags::MIPMAP_COUNT;
        flags |= if format.is_compressed() {
            DdsFlags::LINEAR_SIZE
        } else {
            DdsFlags::PITCH
        };

        let mut caps = DdsCaps::TEXTURE;
        if self.levels_used > 1 {
            caps |= DdsCaps::MIPMAP | DdsCaps::COMPLEX;
        }
        if self.texture_type != TextureType::Regular {
            caps |= DdsCaps::COMPLEX;
        }

        let (caps2, depth) = match self.texture_type {
            TextureType::Cube => (DdsCaps2::CUBE_MAP | DdsCaps2::CUBE_MAP_ALL_FACES, None),
            TextureType::Volume => {
                flags |= DdsFlags::DEPTH;
                (DdsCaps2::VOLUME, Some(self.depth))
            }
            TextureType::Regular => (DdsCaps2::empty(), None),
        };

        Header {
            flags,
            height: self.height,
            width: self.width,
            pitch_or_linear_size: format.pitch_or_linear_size(self.width, self.height),
            depth,
            mipmap_count: self.levels_used,
            pixel_format: format.pixel_format(),
            caps,
            caps2,
        }
    }

    /// Writes the mip set as a DDS file.
    ///
    /// Levels are written face by face. Cube maps always write all six faces.
    pub fn write_dds<W: Write>(&self, writer: &mut W) -> Result<(), EncodeError> {
        let levels = self.levels_used as usize;
        let faces = match self.texture_type {
            TextureType::Cube => CUBE_NUM_FACES,
            _ => 1,
        };

        // check everything before the first byte is written
        for face in 0..faces {
            for level in 0..levels {
                if self.levels[face][level].data.is_empty() {
                    return Err(EncodeError::MissingLevelData { face, level });
                }
            }
        }

        debug!(
            "Writing {}x{} {:?} {} with {} level(s)",
            self.width, self.height, self.texture_type, self.format, levels
        );

        self.header().write(writer)?;
        for face in &self.levels[..faces] {
            for info in &face[..levels] {
                writer.write_all(&info.data)?;
            }
        }
        Ok(())
    }
}

impl Image {
    /// Writes the top level of every face as a DDS file.
    ///
    /// If no output format is given, the format of the image is used. DUDV
    /// cannot be written from an image.
    pub fn write_dds<W: Write>(
        &self,
        writer: &mut W,
        convert_to_srgb: bool,
        output_format: Option<OutputColorFormat>,
    ) -> Result<(), EncodeError> {
        let output_format = match output_format {
            Some(OutputColorFormat::DUDV) => {
                return Err(EncodeError::UnsupportedFormat(OutputColorFormat::DUDV))
            }
            Some(format) => format,
            None => OutputColorFormat::from_color_format(self.format())
                .ok_or(EncodeError::UnsupportedColorFormat(self.format()))?,
        };

        let options = MipGenOptions {
            levels: 1,
            output_format,
            post_filter: PostMipImageFilter::None,
            filter: FilterType::Point,
            convert_to_srgb,
            ..Default::default()
        };
        let mips = self.generate_mip_set(&options, &RuntimeSettings::default())?;
        mips.write_dds(writer)
    }
}
