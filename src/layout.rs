use crate::{DdsFlags, Header, HeaderError, LayoutError, Options, OutputColorFormat};

/// The maximum number of mipmaps of a [`crate::MipSet`].
pub const MAX_TEXTURE_MIPS: usize = 12;
/// The number of faces of a complete cube map.
pub const CUBE_NUM_FACES: usize = 6;
/// The maximum number of slices of a volume texture.
pub const VOLUME_MAX_DEPTH: u32 = 512;

/// The shape of a texture.
///
/// Images and mip sets encode this in their depth: `1` is a regular 2D
/// texture, `0` is a cube map and anything larger is a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureType {
    Regular,
    Cube,
    Volume,
}
impl TextureType {
    pub const fn from_depth(depth: u32) -> Self {
        match depth {
            0 => TextureType::Cube,
            1 => TextureType::Regular,
            _ => TextureType::Volume,
        }
    }

    /// The number of faces a texture of this type stores.
    pub const fn face_count(self) -> usize {
        match self {
            TextureType::Cube => CUBE_NUM_FACES,
            TextureType::Regular | TextureType::Volume => 1,
        }
    }
}

/// The size of mip `level` of a dimension of `main` pixels.
pub(crate) fn get_mip_size(main: u32, level: usize) -> u32 {
    main.checked_shr(level as u32).unwrap_or(0).max(1)
}

/// One mip level in the data section of a DDS file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LevelDescriptor {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    /// The number of bytes the level occupies in the file.
    pub len: usize,
    /// The number of bytes of a row in the file, if rows are padded.
    pub row_pitch: Option<usize>,
}

/// The byte layout of the data section of a legacy DDS file.
///
/// Faces are stored one after the other, each with all of its levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    texture_type: TextureType,
    format: OutputColorFormat,
    /// The face indexes present in the file, in storage order.
    faces: Vec<usize>,
    levels: Vec<LevelDescriptor>,
}

impl DataLayout {
    pub fn from_header(
        header: &Header,
        format: OutputColorFormat,
        options: &Options,
    ) -> Result<Self, LayoutError> {
        let width = header.width;
        let height = header.height;
        if width == 0 || height == 0 {
            return Err(LayoutError::ZeroDimension);
        }
        if width.max(height) > options.max_dimension {
            return Err(LayoutError::DimensionTooLarge(width.max(height)));
        }

        let (texture_type, faces, depth) = if header.is_cube_map() {
            let faces: Vec<usize> = header.cube_faces().collect();
            if faces.is_empty() {
                return Err(LayoutError::MissingCubeFaces);
            }
            (TextureType::Cube, faces, 1)
        } else if header.is_volume() {
            let depth = header.depth.unwrap_or(1);
            if depth == 0 {
                return Err(LayoutError::ZeroDimension);
            }
            if depth > options.max_depth {
                return Err(LayoutError::VolumeTooDeep(depth));
            }
            (TextureType::Volume, vec![0], depth)
        } else {
            (TextureType::Regular, vec![0], 1)
        };

        let level_count = header.levels();
        if level_count as usize > MAX_TEXTURE_MIPS {
            return Err(LayoutError::TooManyMipMaps(level_count));
        }

        // rows of the top level may be padded to the declared pitch
        let top_pitch = if !format.is_compressed() && header.flags.contains(DdsFlags::PITCH) {
            let tight = format.level_size(width, 1, 1);
            let pitch = header.pitch_or_linear_size as usize;
            (pitch > tight).then_some(pitch)
        } else {
            None
        };

        let mut levels = Vec::with_capacity(level_count as usize);
        for level in 0..level_count as usize {
            let w = get_mip_size(width, level);
            let h = get_mip_size(height, level);
            let d = get_mip_size(depth, level);

            let row_pitch = if level == 0 { top_pitch } else { None };
            let len = match row_pitch {
                Some(pitch) => pitch
                    .checked_mul(h as usize)
                    .and_then(|l| l.checked_mul(d as usize)),
                None => checked_level_size(format, w, h, d),
            }
            .ok_or(LayoutError::DataLayoutTooBig)?;

            levels.push(LevelDescriptor {
                width: w,
                height: h,
                depth: d,
                len,
                row_pitch,
            });
        }

        let layout = Self {
            texture_type,
            format,
            faces,
            levels,
        };
        layout
            .face_len()
            .checked_mul(layout.faces.len())
            .ok_or(LayoutError::DataLayoutTooBig)?;
        Ok(layout)
    }

    pub fn texture_type(&self) -> TextureType {
        self.texture_type
    }
    pub fn format(&self) -> OutputColorFormat {
        self.format
    }
    pub fn faces(&self) -> &[usize] {
        &self.faces
    }
    pub fn levels(&self) -> &[LevelDescriptor] {
        &self.levels
    }
    pub fn main(&self) -> &LevelDescriptor {
        &self.levels[0]
    }

    /// The number of bytes of all levels of one face.
    pub fn face_len(&self) -> usize {
        self.levels.iter().map(|l| l.len).sum()
    }
    /// The number of bytes of the whole data section.
    pub fn data_len(&self) -> usize {
        self.face_len() * self.faces.len()
    }
}

fn checked_level_size(format: OutputColorFormat, width: u32, height: u32, depth: u32) -> Option<usize> {
    // level_size works in usize; reject sizes that cannot fit before computing
    let pixels = (width as u64)
        .checked_mul(height as u64)?
        .checked_mul(depth as u64)?;
    let bytes = pixels.checked_mul(format.bits_per_pixel() as u64)? / 8 + 64;
    if bytes > isize::MAX as u64 {
        return None;
    }
    Some(format.level_size(width, height, depth))
}

/// Rejects uncompressed files that declare a linear size.
pub(crate) fn check_size_flags(header: &Header, format: OutputColorFormat) -> Result<(), HeaderError> {
    if !format.is_compressed() && header.flags.contains(DdsFlags::LINEAR_SIZE) {
        return Err(HeaderError::UnexpectedLinearSize);
    }
    Ok(())
}
