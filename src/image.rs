use std::ops::Range;

use glam::Vec4;

use crate::{
    color::{clamp01, luminance},
    linear_to_srgb, make_color_format_batch, make_hdr_pixel,
    resize::resize_plane,
    srgb_to_linear, ColorFormat, FilterType, ImageError, TextureType, UVAddressMode,
    CUBE_NUM_FACES, VOLUME_MAX_DEPTH,
};

/// A color channel of an [`Image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    R = 0,
    G = 1,
    B = 2,
    A = 3,
}
impl Channel {
    pub const ALL: [Channel; 4] = [Channel::R, Channel::G, Channel::B, Channel::A];
}

/// Per channel flags. `None` in an argument selects all channels.
pub type ChannelMask = [bool; 4];

fn mask_allows(mask: Option<&ChannelMask>, channel: usize) -> bool {
    mask.map_or(true, |m| m[channel])
}

/// The four float planes of one face.
///
/// For volumes the planes of face 0 hold all depth slices one after the
/// other.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    channels: [Vec<f32>; 4],
}
impl Face {
    fn new(len: usize) -> Self {
        Self {
            channels: [vec![0.0; len], vec![0.0; len], vec![0.0; len], vec![0.0; len]],
        }
    }

    /// The number of texels per channel.
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn channel(&self, channel: Channel) -> &[f32] {
        &self.channels[channel as usize]
    }
    pub fn channel_mut(&mut self, channel: Channel) -> &mut [f32] {
        &mut self.channels[channel as usize]
    }

    pub(crate) fn planes(&self) -> &[Vec<f32>; 4] {
        &self.channels
    }
    pub(crate) fn planes_mut(&mut self) -> &mut [Vec<f32>; 4] {
        &mut self.channels
    }

    fn get(&self, index: usize) -> Vec4 {
        Vec4::new(
            self.channels[0][index],
            self.channels[1][index],
            self.channels[2][index],
            self.channels[3][index],
        )
    }
    fn set(&mut self, index: usize, color: Vec4) {
        self.channels[0][index] = color.x;
        self.channels[1][index] = color.y;
        self.channels[2][index] = color.z;
        self.channels[3][index] = color.w;
    }
}

/// A texture in canonical float RGBA.
///
/// The depth selects the kind of texture:
///
/// - `1`: a regular 2D image, stored in face 0.
/// - `0`: a cube map with up to 6 faces.
/// - `N > 1`: a volume of `N` slices, all stored in face 0.
///
/// Operations that take a `face` argument address a single 2D surface. For
/// volumes that is the depth slice with the given index.
///
/// Operations that transform the image (scaling, padding, cloning faces)
/// return new images and leave `self` untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    format: ColorFormat,
    width: u32,
    height: u32,
    depth: u32,
    faces: [Option<Face>; CUBE_NUM_FACES],
}

impl Image {
    /// Creates a 2D image filled with transparent black.
    pub fn new(width: u32, height: u32, format: ColorFormat) -> Result<Self, ImageError> {
        Self::new_with_depth(width, height, 1, format)
    }

    /// Creates an image of the given depth filled with transparent black.
    ///
    /// A depth of `0` creates a cube map with all six faces allocated.
    pub fn new_with_depth(
        width: u32,
        height: u32,
        depth: u32,
        format: ColorFormat,
    ) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::ZeroDimension);
        }
        if depth > VOLUME_MAX_DEPTH {
            return Err(ImageError::VolumeTooDeep(depth));
        }

        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|l| l.checked_mul(depth.max(1) as usize))
            .ok_or(ImageError::ZeroDimension)?;

        let mut faces: [Option<Face>; CUBE_NUM_FACES] = Default::default();
        let face_count = TextureType::from_depth(depth).face_count();
        for face in faces.iter_mut().take(face_count) {
            *face = Some(Face::new(len));
        }

        Ok(Self {
            format,
            width,
            height,
            depth,
            faces,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }
    pub fn height(&self) -> u32 {
        self.height
    }
    /// `1` for 2D images, `0` for cube maps and the slice count for volumes.
    pub fn depth(&self) -> u32 {
        self.depth
    }
    /// The format the pixels were loaded from or will be stored as.
    pub fn format(&self) -> ColorFormat {
        self.format
    }
    pub fn set_format(&mut self, format: ColorFormat) {
        self.format = format;
    }
    pub fn texture_type(&self) -> TextureType {
        TextureType::from_depth(self.depth)
    }
    pub fn is_cube_map(&self) -> bool {
        self.depth == 0
    }
    pub fn is_volume(&self) -> bool {
        self.depth > 1
    }

    /// The storage of face `face`. For volumes only face 0 exists.
    pub fn face(&self, face: usize) -> Option<&Face> {
        self.faces.get(face)?.as_ref()
    }
    pub fn face_mut(&mut self, face: usize) -> Option<&mut Face> {
        self.faces.get_mut(face)?.as_mut()
    }
    /// The indexes of all allocated faces.
    pub fn present_faces(&self) -> impl Iterator<Item = usize> + '_ {
        (0..CUBE_NUM_FACES).filter(|&f| self.faces[f].is_some())
    }

    /// The number of texels in one 2D surface.
    pub fn surface_len(&self) -> usize {
        self.width as usize * self.height as usize
    }
    /// The number of texels per channel of a face.
    pub fn plane_len(&self) -> usize {
        self.surface_len() * self.depth.max(1) as usize
    }

    /// Resolves a face or volume slice to its storage and texel range.
    fn surface(&self, face: usize) -> Option<(usize, Range<usize>)> {
        let len = self.surface_len();
        if self.is_volume() {
            if face >= self.depth as usize {
                return None;
            }
            self.faces[0].as_ref()?;
            Some((0, face * len..(face + 1) * len))
        } else {
            self.faces.get(face)?.as_ref()?;
            Some((face, 0..len))
        }
    }

    pub(crate) fn surface_plane(&self, face: usize, channel: usize) -> Option<&[f32]> {
        let (index, range) = self.surface(face)?;
        Some(&self.faces[index].as_ref()?.channels[channel][range])
    }
    fn surface_plane_mut(&mut self, face: usize, channel: usize) -> Option<&mut [f32]> {
        let (index, range) = self.surface(face)?;
        Some(&mut self.faces[index].as_mut()?.channels[channel][range])
    }

    /// Decodes `bytes` of the given format into face `face`.
    ///
    /// For volumes the bytes must contain all slices.
    pub fn fill_face_data(
        &mut self,
        face: usize,
        format: ColorFormat,
        bytes: &[u8],
    ) -> Result<(), ImageError> {
        let plane_len = self.plane_len();
        let bytes_per_pixel = format.bytes_per_pixel();
        let expected = plane_len * bytes_per_pixel;
        if bytes.len() < expected {
            return Err(ImageError::BufferTooSmall {
                expected,
                actual: bytes.len(),
            });
        }

        let target = self.face_mut(face).ok_or(ImageError::InvalidFace(face))?;
        for (i, pixel) in bytes[..expected].chunks_exact(bytes_per_pixel).enumerate() {
            let color = make_hdr_pixel(pixel, format).unwrap_or(Vec4::ZERO);
            target.set(i, color);
        }
        Ok(())
    }

    /// Extracts a single face or volume slice as a 2D image.
    pub fn clone_face(&self, face: usize) -> Option<Image> {
        let (index, range) = self.surface(face)?;
        let source = self.faces[index].as_ref()?;

        let mut channels = source.channels.clone();
        for plane in channels.iter_mut() {
            *plane = plane[range.clone()].to_vec();
        }

        let mut faces: [Option<Face>; CUBE_NUM_FACES] = Default::default();
        faces[0] = Some(Face { channels });
        Some(Image {
            format: self.format,
            width: self.width,
            height: self.height,
            depth: 1,
            faces,
        })
    }

    /// Copies a 2D image into one face of a cube map or one slice of a
    /// volume.
    ///
    /// The source must be 2D and match the size of `self`. Its planes are
    /// copied as they are and take on the format of `self`. Inserting a face
    /// other than 0 into a 2D image turns it into a cube map. Returns `false`
    /// and leaves `self` unchanged if the source does not fit.
    pub fn insert_face(&mut self, image: &Image, face: usize) -> bool {
        if image.depth != 1 || image.width != self.width || image.height != self.height {
            return false;
        }
        let source = match image.face(0) {
            Some(source) => source,
            None => return false,
        };

        if self.is_volume() {
            let (_, range) = match self.surface(face) {
                Some(surface) => surface,
                None => return false,
            };
            let target = match self.faces[0].as_mut() {
                Some(target) => target,
                None => return false,
            };
            for (dst, src) in target.channels.iter_mut().zip(source.channels.iter()) {
                dst[range.clone()].copy_from_slice(src);
            }
            return true;
        }

        if face >= CUBE_NUM_FACES {
            return false;
        }
        if self.faces[face].is_none() && face > 0 && self.depth == 1 {
            self.depth = 0;
        }
        self.faces[face] = Some(source.clone());
        true
    }

    /// Reads the texel at `(x, y)` of a face or volume slice.
    ///
    /// Returns transparent black for missing faces and out of range
    /// coordinates.
    pub fn read(&self, x: u32, y: u32, face: usize) -> Vec4 {
        if x >= self.width || y >= self.height {
            return Vec4::ZERO;
        }
        match self.surface(face) {
            Some((index, range)) => match &self.faces[index] {
                Some(f) => f.get(range.start + (y * self.width + x) as usize),
                None => Vec4::ZERO,
            },
            None => Vec4::ZERO,
        }
    }

    /// Writes the texel at `(x, y)` of a face or volume slice.
    ///
    /// Returns `false` for missing faces and out of range coordinates.
    pub fn write(&mut self, x: u32, y: u32, face: usize, color: Vec4) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let width = self.width;
        match self.surface(face) {
            Some((index, range)) => match &mut self.faces[index] {
                Some(f) => {
                    f.set(range.start + (y * width + x) as usize, color);
                    true
                }
                None => false,
            },
            None => false,
        }
    }

    /// Bilinearly samples a face with wrap around addressing.
    ///
    /// Texel centers are at `x + 0.5`. If `normalized` is set, `u` and `v`
    /// are in `[0, 1]`, otherwise they are in texels.
    pub fn sample_2d(&self, u: f32, v: f32, face: usize, normalized: bool) -> Vec4 {
        let (su, sv) = if normalized {
            (u * self.width as f32, v * self.height as f32)
        } else {
            (u, v)
        };
        let w = self.width as i64;
        let h = self.height as i64;

        let u1 = ((su - 0.5).floor() as i64).rem_euclid(w) as u32;
        let u2 = ((su + 0.5).floor() as i64).rem_euclid(w) as u32;
        let v1 = ((sv - 0.5).floor() as i64).rem_euclid(h) as u32;
        let v2 = ((sv + 0.5).floor() as i64).rem_euclid(h) as u32;

        let fu2 = (su + 0.5).rem_euclid(1.0);
        let fu1 = 1.0 - fu2;
        let fv2 = (sv + 0.5).rem_euclid(1.0);
        let fv1 = 1.0 - fv2;

        self.read(u1, v1, face) * (fu1 * fv1)
            + self.read(u2, v1, face) * (fu2 * fv1)
            + self.read(u1, v2, face) * (fu1 * fv2)
            + self.read(u2, v2, face) * (fu2 * fv2)
    }

    fn for_each_color_plane(&mut self, mut f: impl FnMut(&mut [f32])) {
        for face in self.faces.iter_mut().flatten() {
            for plane in &mut face.channels[..3] {
                f(plane);
            }
        }
    }

    /// Scales the color channels by `2^fstop`.
    ///
    /// Only HDR images can be exposed. Returns `false` and leaves the image
    /// unchanged for other formats.
    pub fn adjust_exposure(&mut self, fstop: f32) -> bool {
        if !self.format.is_hdr() {
            return false;
        }
        let factor = 2.0_f32.powf(fstop);
        self.for_each_color_plane(|plane| plane.iter_mut().for_each(|x| *x *= factor));
        true
    }

    /// Raises the color channels to the power of `gamma`.
    ///
    /// Only HDR images can be adjusted. Returns `false` and leaves the image
    /// unchanged for other formats.
    pub fn adjust_gamma(&mut self, gamma: f32) -> bool {
        if !self.format.is_hdr() {
            return false;
        }
        self.for_each_color_plane(|plane| plane.iter_mut().for_each(|x| *x = x.powf(gamma)));
        true
    }

    pub fn convert_srgb_to_linear(&mut self) {
        self.for_each_color_plane(|plane| plane.iter_mut().for_each(|x| *x = srgb_to_linear(*x)));
    }
    pub fn convert_linear_to_srgb(&mut self) {
        self.for_each_color_plane(|plane| plane.iter_mut().for_each(|x| *x = linear_to_srgb(*x)));
    }

    /// Replaces infinities and NaNs with zero.
    pub fn clean_float_data(&mut self) {
        for face in self.faces.iter_mut().flatten() {
            for plane in face.channels.iter_mut() {
                plane
                    .iter_mut()
                    .filter(|x| !x.is_finite())
                    .for_each(|x| *x = 0.0);
            }
        }
    }

    /// Replaces the color channels with their luminance.
    pub fn convert_gray_scale(&mut self) {
        for face in self.faces.iter_mut().flatten() {
            let [r, g, b, _] = &mut face.channels;
            for ((r, g), b) in r.iter_mut().zip(g.iter_mut()).zip(b.iter_mut()) {
                let gray = luminance(*r, *g, *b);
                *r = gray;
                *g = gray;
                *b = gray;
            }
        }
    }

    pub fn flip_vertical(&mut self, face: usize) {
        let width = self.width as usize;
        let height = self.height as usize;
        for c in 0..4 {
            if let Some(plane) = self.surface_plane_mut(face, c) {
                for y in 0..height / 2 {
                    let (top, bottom) = plane.split_at_mut((height - 1 - y) * width);
                    top[y * width..(y + 1) * width].swap_with_slice(&mut bottom[..width]);
                }
            }
        }
    }

    pub fn flip_horizontal(&mut self, face: usize) {
        let width = self.width as usize;
        for c in 0..4 {
            if let Some(plane) = self.surface_plane_mut(face, c) {
                plane.chunks_exact_mut(width).for_each(|row| row.reverse());
            }
        }
    }

    /// Replaces every channel value `x` of a face with `1 - x`.
    pub fn invert_colors(&mut self, face: usize) {
        for c in 0..4 {
            if let Some(plane) = self.surface_plane_mut(face, c) {
                plane.iter_mut().for_each(|x| *x = 1.0 - *x);
            }
        }
    }

    /// Doubles the distance of every value to the mean of its channel.
    pub fn double_contrast(&mut self, face: usize) {
        for c in 0..4 {
            if let Some(plane) = self.surface_plane_mut(face, c) {
                let mean = plane.iter().sum::<f32>() / plane.len() as f32;
                plane
                    .iter_mut()
                    .for_each(|x| *x = clamp01(mean + (*x - mean) * 2.0));
            }
        }
    }

    /// Blends a face of `source` over a face of `self`.
    ///
    /// Returns `false` if the sizes differ or `strength` is zero.
    pub fn blend_image_face(
        &mut self,
        source: &Image,
        strength: f32,
        mask: Option<&ChannelMask>,
        src_face: usize,
        dst_face: usize,
    ) -> bool {
        if source.width != self.width || source.height != self.height || strength == 0.0 {
            return false;
        }
        for c in 0..4 {
            if !mask_allows(mask, c) {
                continue;
            }
            let (src, dst) = match (
                source.surface_plane(src_face, c),
                self.surface_plane_mut(dst_face, c),
            ) {
                (Some(src), Some(dst)) => (src, dst),
                _ => continue,
            };
            for (d, s) in dst.iter_mut().zip(src) {
                *d = s * strength + *d * (1.0 - strength);
            }
        }
        true
    }

    /// Writes the overlay blend of two faces into `face`.
    ///
    /// Returns `false` if the sizes differ.
    pub fn overlay_blend_image_face(
        &mut self,
        base: &Image,
        overlay: &Image,
        mask: Option<&ChannelMask>,
        face: usize,
        base_face: usize,
        overlay_face: usize,
    ) -> bool {
        if base.width != self.width
            || base.height != self.height
            || overlay.width != self.width
            || overlay.height != self.height
        {
            return false;
        }
        for c in 0..4 {
            if !mask_allows(mask, c) {
                continue;
            }
            let (base, overlay) = match (
                base.surface_plane(base_face, c),
                overlay.surface_plane(overlay_face, c),
            ) {
                (Some(base), Some(overlay)) => (base.to_vec(), overlay),
                _ => continue,
            };
            let dst = match self.surface_plane_mut(face, c) {
                Some(dst) => dst,
                None => continue,
            };
            for ((d, b), o) in dst.iter_mut().zip(base).zip(overlay) {
                *d = if *o < 0.5 {
                    b * o * 2.0
                } else {
                    1.0 - (1.0 - b) * (1.0 - o) * 2.0
                };
            }
        }
        true
    }

    /// Resamples every face to `width * height`.
    ///
    /// Each channel is filtered with its own filter. Volumes cannot be
    /// scaled and return `None`. Scaling to the current size only changes the
    /// format.
    pub fn scale_image(
        &self,
        width: u32,
        height: u32,
        format: ColorFormat,
        filters: [FilterType; 4],
        u_wrap: UVAddressMode,
        v_wrap: UVAddressMode,
    ) -> Option<Image> {
        if self.is_volume() {
            return None;
        }
        if width == self.width && height == self.height {
            let mut result = self.clone();
            result.format = format;
            return Some(result);
        }

        let mut result = Image::new_with_depth(width, height, self.depth, format).ok()?;
        for f in 0..CUBE_NUM_FACES {
            match &self.faces[f] {
                Some(src) => {
                    let mut dst = Face::new(result.plane_len());
                    self.scale_planes(src, &mut dst, width, height, filters, u_wrap, v_wrap);
                    result.faces[f] = Some(dst);
                }
                None => result.faces[f] = None,
            }
        }
        Some(result)
    }

    /// Resamples a single face or volume slice into a new 2D image.
    #[allow(clippy::too_many_arguments)]
    pub fn scale_image_face(
        &self,
        width: u32,
        height: u32,
        face: usize,
        format: ColorFormat,
        filters: [FilterType; 4],
        u_wrap: UVAddressMode,
        v_wrap: UVAddressMode,
    ) -> Option<Image> {
        if self.is_volume() {
            return None;
        }
        let mut result = self.clone_face(face)?;
        result.format = format;
        if width == self.width && height == self.height {
            return Some(result);
        }

        let src = result.faces[0].take()?;
        let mut dst = Face::new(width as usize * height as usize);
        self.scale_planes(&src, &mut dst, width, height, filters, u_wrap, v_wrap);
        result.width = width;
        result.height = height;
        result.faces[0] = Some(dst);
        Some(result)
    }

    /// Scales by a factor per axis, see [`Self::scale_image`].
    pub fn relative_scale_image(
        &self,
        scale_x: f32,
        scale_y: f32,
        format: ColorFormat,
        filters: [FilterType; 4],
        u_wrap: UVAddressMode,
        v_wrap: UVAddressMode,
    ) -> Option<Image> {
        let width = ((self.width as f32 * scale_x) as u32).max(1);
        let height = ((self.height as f32 * scale_y) as u32).max(1);
        self.scale_image(width, height, format, filters, u_wrap, v_wrap)
    }

    #[allow(clippy::too_many_arguments)]
    fn scale_planes(
        &self,
        src: &Face,
        dst: &mut Face,
        width: u32,
        height: u32,
        filters: [FilterType; 4],
        u_wrap: UVAddressMode,
        v_wrap: UVAddressMode,
    ) {
        for c in 0..4 {
            resize_plane(
                &src.channels[c],
                self.width,
                self.height,
                &mut dst.channels[c],
                width,
                height,
                filters[c],
                u_wrap,
                v_wrap,
            );
        }
    }

    /// Pads the image with black to the next power of two size.
    ///
    /// Images that already have power of two sizes are cloned. Volumes that
    /// would need padding return `None`.
    pub fn adjust_to_next_power_of_2(&self) -> Option<Image> {
        if self.width.is_power_of_two() && self.height.is_power_of_two() {
            return Some(self.clone());
        }
        if self.is_volume() {
            return None;
        }

        let width = self.width.checked_next_power_of_two()?;
        let height = self.height.checked_next_power_of_two()?;
        let mut result = Image::new_with_depth(width, height, self.depth, self.format).ok()?;

        for f in 0..CUBE_NUM_FACES {
            let (src, dst) = match (&self.faces[f], &mut result.faces[f]) {
                (Some(src), Some(dst)) => (src, dst),
                (None, dst) => {
                    *dst = None;
                    continue;
                }
                _ => continue,
            };
            for (src, dst) in src.channels.iter().zip(dst.channels.iter_mut()) {
                for (src_row, dst_row) in src
                    .chunks_exact(self.width as usize)
                    .zip(dst.chunks_exact_mut(width as usize))
                {
                    dst_row[..src_row.len()].copy_from_slice(src_row);
                }
            }
        }
        Some(result)
    }

    /// Whether any value of a channel is above (or below) `threshold`.
    ///
    /// For volumes all slices are checked.
    pub fn is_channel_data_set(
        &self,
        face: usize,
        channel: Channel,
        threshold: f32,
        valid_if_greater: bool,
    ) -> bool {
        let plane = match self.face(face) {
            Some(face) => face.channel(channel),
            None => return false,
        };
        if valid_if_greater {
            plane.iter().any(|&x| x > threshold)
        } else {
            plane.iter().any(|&x| x < threshold)
        }
    }

    /// Re-encodes a tangent space normal map for two channel storage.
    ///
    /// Detail maps are stored as partial derivatives, in `r`/`g` or, if
    /// `detail_only` is set, as `y` in all color channels and `x` in alpha.
    /// Other normal maps are projected onto the paraboloid `z = 1 - x² - y²`
    /// and stored with `y` in the color channels and `x` in alpha.
    pub fn prepare_for_2channel_normal_map(&mut self, is_detail: bool, detail_only: bool) {
        let detail_only = is_detail && detail_only;

        for face in self.faces.iter_mut().flatten() {
            for i in 0..face.len() {
                let texel = face.get(i);
                let x = texel.x * 2.0 - 1.0;
                let y = texel.y * 2.0 - 1.0;
                let z = if is_detail {
                    let d = x * x + y * y;
                    if d < 1.0 {
                        (1.0 - d).sqrt()
                    } else {
                        0.0
                    }
                } else {
                    texel.z * 2.0 - 1.0
                };
                let mut normal = glam::Vec3::new(x, y, z).normalize_or_zero();

                let encoded = if is_detail {
                    normal.z = normal.z.max(normal.x.abs()).max(normal.y.abs()).max(0.001);
                    let n = normal / -normal.z * 0.5 + 0.5;
                    let (nx, ny) = (clamp01(n.x), clamp01(n.y));
                    if detail_only {
                        Vec4::new(ny, ny, ny, nx)
                    } else {
                        Vec4::new(nx, ny, texel.z, texel.w)
                    }
                } else {
                    let a = (normal.x * normal.x + normal.y * normal.y).max(0.00001);
                    let b = normal.z;
                    let t = (-b + (b * b + 4.0 * a).sqrt()) / (2.0 * a);
                    let para_x = clamp01(normal.x * t * 0.5 + 0.5);
                    let para_y = clamp01(normal.y * t * 0.5 + 0.5);
                    Vec4::new(para_y, para_y, para_y, para_x)
                };
                face.set(i, encoded);
            }
        }
    }

    /// Packs a face into `format`.
    ///
    /// For volumes face 0 holds all slices. Returns `None` if the face does
    /// not exist.
    pub fn generate_format_data(
        &self,
        face: usize,
        format: ColorFormat,
        convert_to_srgb: bool,
    ) -> Option<Vec<u8>> {
        let [r, g, b, a] = &self.face(face)?.channels;
        let mut data = vec![0; r.len() * format.bytes_per_pixel()];
        make_color_format_batch(&mut data, format, r, g, b, a, convert_to_srgb).ok()?;
        Some(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> Image {
        let mut image = Image::new(width, height, ColorFormat::RGBAFloatMap).unwrap();
        for y in 0..height {
            for x in 0..width {
                let v = (y * width + x) as f32;
                image.write(x, y, 0, Vec4::new(v, v * 2.0, 0.5, 1.0));
            }
        }
        image
    }

    #[test]
    fn construction() {
        let cube = Image::new_with_depth(4, 4, 0, ColorFormat::ARGB8888).unwrap();
        assert_eq!(cube.texture_type(), TextureType::Cube);
        assert_eq!(cube.present_faces().count(), 6);

        let volume = Image::new_with_depth(4, 4, 3, ColorFormat::ARGB8888).unwrap();
        assert_eq!(volume.texture_type(), TextureType::Volume);
        assert_eq!(volume.face(0).unwrap().len(), 48);
        assert!(volume.face(1).is_none());

        assert_eq!(
            Image::new(0, 4, ColorFormat::A8),
            Err(ImageError::ZeroDimension)
        );
        assert_eq!(
            Image::new_with_depth(4, 4, 513, ColorFormat::A8),
            Err(ImageError::VolumeTooDeep(513))
        );
    }

    #[test]
    fn volume_slices_are_faces() {
        let mut volume = Image::new_with_depth(2, 2, 3, ColorFormat::RGBAFloatMap).unwrap();
        let slice = gradient(2, 2);
        assert!(volume.insert_face(&slice, 2));
        assert!(!volume.insert_face(&slice, 3));
        assert_eq!(volume.read(1, 1, 2), slice.read(1, 1, 0));
        assert_eq!(volume.read(1, 1, 1), Vec4::ZERO);
        assert_eq!(volume.clone_face(2).unwrap(), slice);
    }

    #[test]
    fn insert_into_2d_promotes_to_cube() {
        let mut image = gradient(2, 2);
        let face = gradient(2, 2);
        assert!(image.insert_face(&face, 3));
        assert_eq!(image.depth(), 0);
        assert_eq!(image.present_faces().collect::<Vec<_>>(), vec![0, 3]);

        let wrong = gradient(4, 2);
        let before = image.clone();
        assert!(!image.insert_face(&wrong, 1));
        assert_eq!(image, before);
    }

    #[test]
    fn fill_face_data_checks_input() {
        let mut image = Image::new(2, 1, ColorFormat::ARGB8888).unwrap();
        let bytes = [0x00, 0x80, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00];
        image.fill_face_data(0, ColorFormat::ARGB8888, &bytes).unwrap();
        let texel = image.read(0, 0, 0);
        assert_eq!(texel.x, 1.0);
        assert!((texel.y - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(texel.z, 0.0);
        assert_eq!(image.read(1, 0, 0), Vec4::new(0.0, 0.0, 1.0, 0.0));

        assert!(matches!(
            image.fill_face_data(0, ColorFormat::ARGB8888, &bytes[..7]),
            Err(ImageError::BufferTooSmall { expected: 8, .. })
        ));
        assert_eq!(
            image.fill_face_data(1, ColorFormat::ARGB8888, &bytes),
            Err(ImageError::InvalidFace(1))
        );
    }

    #[test]
    fn sample_2d_at_texel_centers() {
        let image = gradient(4, 4);
        assert_eq!(image.sample_2d(1.5, 2.5, 0, false), image.read(1, 2, 0));
        let between = image.sample_2d(2.0, 0.5, 0, false);
        assert!((between.x - 1.5).abs() < 1e-5);
        // wraps around the left edge
        let wrapped = image.sample_2d(0.0, 0.5, 0, false);
        assert!((wrapped.x - 1.5).abs() < 1e-5);
        assert_eq!(image.sample_2d(0.375, 0.625, 0, true), image.read(1, 2, 0));
    }

    #[test]
    fn flips() {
        let mut image = gradient(3, 2);
        image.flip_vertical(0);
        assert_eq!(image.read(0, 0, 0).x, 3.0);
        image.flip_horizontal(0);
        assert_eq!(image.read(0, 0, 0).x, 5.0);
        assert_eq!(image.read(2, 1, 0).x, 0.0);
    }

    #[test]
    fn pad_to_power_of_two() {
        let image = gradient(3, 2);
        let padded = image.adjust_to_next_power_of_2().unwrap();
        assert_eq!((padded.width(), padded.height()), (4, 2));
        assert_eq!(padded.read(2, 1, 0), image.read(2, 1, 0));
        assert_eq!(padded.read(3, 1, 0), Vec4::ZERO);

        let volume = Image::new_with_depth(3, 2, 2, ColorFormat::ARGB8888).unwrap();
        assert!(volume.adjust_to_next_power_of_2().is_none());
    }

    #[test]
    fn blends() {
        let mut dst = Image::new(1, 1, ColorFormat::RGBAFloatMap).unwrap();
        dst.write(0, 0, 0, Vec4::splat(0.2));
        let mut src = dst.clone();
        src.write(0, 0, 0, Vec4::splat(0.6));

        let mask = [true, false, true, true];
        assert!(dst.blend_image_face(&src, 0.5, Some(&mask), 0, 0));
        let texel = dst.read(0, 0, 0);
        assert!((texel.x - 0.4).abs() < 1e-6);
        assert_eq!(texel.y, 0.2);
        assert!(!dst.blend_image_face(&src, 0.0, None, 0, 0));

        let base = dst.clone();
        let overlay = src.clone();
        assert!(dst.overlay_blend_image_face(&base, &overlay, None, 0, 0, 0));
        let texel = dst.read(0, 0, 0);
        // o >= 0.5: 1 - (1 - 0.4) * (1 - 0.6) * 2
        assert!((texel.x - 0.52).abs() < 1e-6);
    }

    #[test]
    fn channel_checks() {
        let image = gradient(2, 2);
        assert!(image.is_channel_data_set(0, Channel::R, 2.5, true));
        assert!(!image.is_channel_data_set(0, Channel::A, 0.99, false));
        assert!(!image.is_channel_data_set(1, Channel::R, 0.0, true));
    }

    #[test]
    fn flat_normal_maps() {
        let mut image = Image::new(1, 1, ColorFormat::ARGB8888).unwrap();
        image.write(0, 0, 0, Vec4::new(0.5, 0.5, 1.0, 1.0));
        let mut detail = image.clone();

        image.prepare_for_2channel_normal_map(false, false);
        assert_eq!(image.read(0, 0, 0), Vec4::splat(0.5));

        detail.prepare_for_2channel_normal_map(true, true);
        assert_eq!(detail.read(0, 0, 0), Vec4::splat(0.5));
    }
}
