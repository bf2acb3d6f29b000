use log::{debug, warn};

use crate::{
    util::div_ceil, OutputColorFormat, RuntimeSettings, Swizzler, TextureType, CUBE_NUM_FACES,
    MAX_TEXTURE_MIPS,
};

/// The packed data of one level of one face.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MipInfo {
    pub width: u32,
    pub height: u32,
    /// `1` for 2D and cube levels.
    pub depth: u32,
    /// Rows are tightly packed. Block compressed levels store rows of 4x4
    /// blocks.
    pub data: Vec<u8>,
}

/// A texture ready for upload or storage.
///
/// The levels of every face are packed into [`Self::format`]. The width,
/// height and depth are those of the top level, with the same depth
/// convention as [`crate::Image`] (`1` for 2D, `0` for cube maps and the
/// slice count for volumes).
///
/// Only the first [`Self::levels_used`] entries of each face are
/// meaningful. 2D textures and volumes only use face 0.
#[derive(Debug, Clone, PartialEq)]
pub struct MipSet {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub texture_type: TextureType,
    pub levels_used: u32,
    pub format: OutputColorFormat,
    pub levels: [[MipInfo; MAX_TEXTURE_MIPS]; CUBE_NUM_FACES],
    /// The number of bytes of each level of a single face.
    pub datasize: [usize; MAX_TEXTURE_MIPS],
    pub runtime: RuntimeSettings,
    /// Whether the level data is in swizzled order.
    pub swizzled: bool,
}

impl Default for MipSet {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            depth: 1,
            texture_type: TextureType::Regular,
            levels_used: 0,
            format: OutputColorFormat::ARGB8888,
            levels: Default::default(),
            datasize: [0; MAX_TEXTURE_MIPS],
            runtime: RuntimeSettings::default(),
            swizzled: false,
        }
    }
}

impl MipSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of faces that hold data.
    pub fn face_count(&self) -> usize {
        self.texture_type.face_count()
    }

    /// The faces that hold data, in storage order.
    pub fn faces(&self) -> impl Iterator<Item = &[MipInfo]> + '_ {
        self.levels
            .iter()
            .take(self.face_count())
            .map(move |face| &face[..self.levels_used as usize])
    }

    /// The number of bytes of level `level` of one face.
    pub fn level_size(&self, level: usize) -> usize {
        self.datasize.get(level).copied().unwrap_or(0)
    }

    /// Removes the `count` smallest levels.
    ///
    /// At least one level has to remain. Returns `false` and leaves the mip
    /// set unchanged otherwise.
    pub fn remove_from_tail(&mut self, count: u32) -> bool {
        if count >= self.levels_used {
            return false;
        }

        let keep = (self.levels_used - count) as usize;
        for face in self.levels.iter_mut() {
            for info in &mut face[keep..] {
                *info = MipInfo::default();
            }
        }
        for size in &mut self.datasize[keep..] {
            *size = 0;
        }
        self.levels_used = keep as u32;
        true
    }

    /// Removes the `count` largest levels.
    ///
    /// At least one level has to remain. Returns `false` and leaves the mip
    /// set unchanged otherwise. The top level size is updated to the new
    /// first level.
    pub fn remove_from_head(&mut self, count: u32) -> bool {
        if count >= self.levels_used {
            return false;
        }

        let count = count as usize;
        for face in self.levels.iter_mut() {
            face.rotate_left(count);
            for info in &mut face[MAX_TEXTURE_MIPS - count..] {
                *info = MipInfo::default();
            }
        }
        self.datasize.rotate_left(count);
        for size in &mut self.datasize[MAX_TEXTURE_MIPS - count..] {
            *size = 0;
        }
        self.levels_used -= count as u32;

        let top = &self.levels[0][0];
        self.width = top.width;
        self.height = top.height;
        if self.texture_type == TextureType::Volume {
            self.depth = top.depth;
        }
        true
    }

    /// Reorders the texels of every level into Morton order.
    ///
    /// Only uncompressed formats with power of two levels can be swizzled,
    /// and only once. Returns `false` and leaves the data unchanged
    /// otherwise.
    pub fn swizzle(&mut self) -> bool {
        if self.swizzled {
            warn!("Mip set is already swizzled");
            return false;
        }
        if self.format.is_compressed() || self.format == OutputColorFormat::DUDV {
            warn!("Cannot swizzle {} data", self.format);
            return false;
        }
        if !self.levels_are_power_of_two() {
            warn!(
                "Cannot swizzle non power of two texture {}x{}",
                self.width, self.height
            );
            return false;
        }

        let bytes_per_pixel = self.format.bits_per_pixel() as usize / 8;
        let face_count = self.face_count();
        let levels_used = self.levels_used as usize;

        let mut swizzled = Vec::with_capacity(face_count);
        for face in &self.levels[..face_count] {
            let mut levels = Vec::with_capacity(levels_used);
            for info in &face[..levels_used] {
                let swizzler = Swizzler::new(info.width, info.height, info.depth.max(1));
                let mut data = vec![0; info.data.len()];
                if let Err(error) = swizzler.swizzle_box(&info.data, &mut data, bytes_per_pixel) {
                    warn!("Swizzling failed: {}", error);
                    return false;
                }
                levels.push(data);
            }
            swizzled.push(levels);
        }

        for (face, data) in self.levels.iter_mut().zip(swizzled) {
            for (info, data) in face.iter_mut().zip(data) {
                info.data = data;
            }
        }
        self.swizzled = true;
        true
    }

    /// Interleaves the blocks of block compressed volumes in groups of 4
    /// slices.
    ///
    /// Within a group, the blocks at the same position of each slice are
    /// stored next to each other. Only DXT volumes with power of two levels
    /// can be reordered. Returns `false` and leaves the data unchanged
    /// otherwise.
    pub fn vtc_swizzle(&mut self) -> bool {
        if self.swizzled {
            warn!("Mip set is already swizzled");
            return false;
        }
        if self.texture_type != TextureType::Volume || !self.format.is_compressed() {
            warn!("VTC swizzling requires a block compressed volume");
            return false;
        }
        if !self.levels_are_power_of_two() {
            warn!(
                "Cannot VTC swizzle non power of two volume {}x{}x{}",
                self.width, self.height, self.depth
            );
            return false;
        }

        let block_size = match self.format.dxt_flags().map(|f| f.bytes_per_block()) {
            Some(Ok(size)) => size,
            _ => return false,
        };

        let levels_used = self.levels_used as usize;
        let mut interleaved = Vec::with_capacity(levels_used);
        for info in &self.levels[0][..levels_used] {
            let blocks = div_ceil(info.width, 4) as usize * div_ceil(info.height, 4) as usize;
            let slice_len = blocks * block_size;
            let depth = info.depth.max(1) as usize;
            if info.data.len() < slice_len * depth {
                warn!("Volume level is missing data");
                return false;
            }

            let mut data = Vec::with_capacity(info.data.len());
            for group in (0..depth).step_by(4) {
                let slices = (depth - group).min(4);
                for block in 0..blocks {
                    for slice in group..group + slices {
                        let start = slice * slice_len + block * block_size;
                        data.extend_from_slice(&info.data[start..start + block_size]);
                    }
                }
            }
            interleaved.push(data);
        }

        for (info, data) in self.levels[0].iter_mut().zip(interleaved) {
            info.data = data;
        }
        self.swizzled = true;
        true
    }

    fn levels_are_power_of_two(&self) -> bool {
        self.faces().flatten().all(|info| {
            info.width.is_power_of_two()
                && info.height.is_power_of_two()
                && info.depth.max(1).is_power_of_two()
        })
    }

    /// Crops every level of every face to the chain of a smaller top level.
    ///
    /// Level `i` is cropped to `max(1, width >> i)` by `max(1, height >> i)`
    /// by `max(1, depth >> i)`. Block compressed levels keep every block that
    /// contains a cropped texel. Returns `false` and leaves the mip set
    /// unchanged if the target is larger than the current data.
    pub fn extract_non_power_of_two(&mut self, width: u32, height: u32, depth: u32) -> bool {
        if width == 0 || height == 0 || self.swizzled {
            return false;
        }

        let levels_used = self.levels_used as usize;
        let targets: Vec<(u32, u32, u32)> = (0..levels_used)
            .map(|i| {
                let shift = |v: u32| v.checked_shr(i as u32).unwrap_or(0).max(1);
                (shift(width), shift(height), shift(depth.max(1)))
            })
            .collect();

        let fits = self.faces().all(|face| {
            face.iter().zip(&targets).all(|(info, &(w, h, d))| {
                w <= info.width && h <= info.height && d <= info.depth.max(1)
            })
        });
        if !fits {
            return false;
        }

        let format = self.format;
        let face_count = self.face_count();
        for face in &mut self.levels[..face_count] {
            for (info, &(w, h, d)) in face.iter_mut().zip(&targets) {
                info.data = crop_level(format, info, w, h, d);
                info.width = w;
                info.height = h;
                info.depth = d;
            }
        }
        for (size, &(w, h, d)) in self.datasize.iter_mut().zip(&targets) {
            *size = format.level_size(w, h, d);
        }

        debug!(
            "Extracted {}x{} from {}x{} mip set",
            width, height, self.width, self.height
        );
        self.width = width;
        self.height = height;
        if self.texture_type == TextureType::Volume {
            self.depth = depth;
        }
        true
    }
}

fn crop_level(format: OutputColorFormat, info: &MipInfo, width: u32, height: u32, depth: u32) -> Vec<u8> {
    // rows of texels or rows of 4x4 blocks
    let (src_row, dst_row, src_rows, dst_rows) = if format.is_compressed() {
        (
            format.level_size(info.width, 1, 1),
            format.level_size(width, 1, 1),
            div_ceil(info.height, 4).max(1) as usize,
            div_ceil(height, 4).max(1) as usize,
        )
    } else {
        (
            format.level_size(info.width, 1, 1),
            format.level_size(width, 1, 1),
            info.height as usize,
            height as usize,
        )
    };

    let mut data = Vec::with_capacity(dst_row * dst_rows * depth as usize);
    for slice in 0..depth as usize {
        for row in 0..dst_rows {
            let start = (slice * src_rows + row) * src_row;
            data.extend_from_slice(&info.data[start..start + dst_row]);
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mip_set(format: OutputColorFormat, width: u32, height: u32, levels: u32) -> MipSet {
        let mut mips = MipSet {
            width,
            height,
            format,
            levels_used: levels,
            ..Default::default()
        };
        for level in 0..levels as usize {
            let w = (width >> level).max(1);
            let h = (height >> level).max(1);
            let len = format.level_size(w, h, 1);
            mips.levels[0][level] = MipInfo {
                width: w,
                height: h,
                depth: 1,
                data: (0..len).map(|i| i as u8).collect(),
            };
            mips.datasize[level] = len;
        }
        mips
    }

    #[test]
    fn remove_levels() {
        let mut mips = mip_set(OutputColorFormat::A8, 8, 4, 4);
        assert!(!mips.remove_from_tail(4));
        assert!(!mips.remove_from_head(5));

        assert!(mips.remove_from_tail(1));
        assert_eq!(mips.levels_used, 3);
        assert_eq!(mips.datasize[3], 0);
        assert!(mips.levels[0][3].data.is_empty());

        assert!(mips.remove_from_head(1));
        assert_eq!(mips.levels_used, 2);
        assert_eq!((mips.width, mips.height), (4, 2));
        assert_eq!(mips.datasize[..3], [8, 2, 0]);
        assert_eq!(mips.level_size(0), 8);
    }

    #[test]
    fn swizzle_only_once() {
        let mut mips = mip_set(OutputColorFormat::A8, 4, 4, 3);
        assert!(mips.swizzle());
        assert_eq!(mips.levels[0][0].data[..4], [0, 1, 4, 5]);
        assert!(mips.swizzled);
        assert!(!mips.swizzle());
    }

    #[test]
    fn swizzle_rejects_compressed_and_non_power_of_two() {
        let mut mips = mip_set(OutputColorFormat::DXT1, 8, 8, 2);
        assert!(!mips.swizzle());

        let mut mips = mip_set(OutputColorFormat::ARGB8888, 6, 4, 1);
        let before = mips.clone();
        assert!(!mips.swizzle());
        assert_eq!(mips, before);
    }

    #[test]
    fn vtc_interleaves_slices() {
        let mut mips = MipSet {
            width: 8,
            height: 4,
            depth: 2,
            texture_type: TextureType::Volume,
            levels_used: 1,
            format: OutputColorFormat::DXT1,
            ..Default::default()
        };
        let data: Vec<u8> = (0..16).collect();
        mips.levels[0][0] = MipInfo {
            width: 8,
            height: 4,
            depth: 2,
            data: [data.clone(), data.iter().map(|b| b + 100).collect()].concat(),
        };
        assert!(mips.vtc_swizzle());
        let out = &mips.levels[0][0].data;
        assert_eq!(out[..8], data[..8]);
        assert_eq!(out[8..16], [100, 101, 102, 103, 104, 105, 106, 107]);
        assert_eq!(out[16..24], data[8..16]);
    }

    #[test]
    fn extract_crops_levels() {
        let mut mips = mip_set(OutputColorFormat::A8, 4, 4, 3);
        assert!(!mips.extract_non_power_of_two(5, 4, 1));

        assert!(mips.extract_non_power_of_two(3, 2, 1));
        assert_eq!((mips.width, mips.height), (3, 2));
        assert_eq!(mips.levels[0][0].data, [0, 1, 2, 4, 5, 6]);
        assert_eq!((mips.levels[0][1].width, mips.levels[0][1].height), (1, 1));
        assert_eq!(mips.datasize[..3], [6, 1, 1]);
    }

    #[test]
    fn extract_keeps_partial_blocks() {
        let mut mips = mip_set(OutputColorFormat::DXT5, 16, 8, 1);
        assert!(mips.extract_non_power_of_two(6, 5, 1));
        let level = &mips.levels[0][0];
        assert_eq!(level.data.len(), 2 * 2 * 16);
        assert_eq!(level.data[..32], (0..32).collect::<Vec<u8>>()[..]);
        assert_eq!(level.data[32], 64);
    }
}
