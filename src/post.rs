use glam::Vec4;

use crate::{
    color::clamp01, image::ChannelMask, resize::resize_plane, FilterType, Image,
    PostMipImageFilter, UVAddressMode,
};

/// Extra center weight of [`PostMipImageFilter::SharpenGradual`] per mip
/// level. Large levels are sharpened less.
const SHARPEN_GRADUAL: [f32; 4] = [92.0, 46.0, 8.0, 0.0];

/// Offsets of the 8 neighbours of a 3x3 kernel, row by row.
const NEIGHBOURS: [(i32, i32, bool); 8] = [
    (-1, -1, true),
    (0, -1, false),
    (1, -1, true),
    (-1, 0, false),
    (1, 0, false),
    (-1, 1, true),
    (0, 1, false),
    (1, 1, true),
];

static MORE_CONTRAST: [u8; 256] = [
    0x00, 0x00, 0x01, 0x01, 0x02, 0x02, 0x02, 0x03, 0x03, 0x04, 0x04, 0x05, 0x05, 0x06, 0x06, 0x07,
    0x08, 0x08, 0x09, 0x09, 0x0a, 0x0b, 0x0b, 0x0c, 0x0d, 0x0d, 0x0e, 0x0f, 0x0f, 0x10, 0x11, 0x12,
    0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x17, 0x18, 0x19, 0x1a, 0x1b, 0x1c, 0x1d, 0x1e, 0x1e, 0x1f,
    0x20, 0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27, 0x28, 0x29, 0x2a, 0x2b, 0x2c, 0x2d, 0x2e, 0x30,
    0x31, 0x32, 0x33, 0x34, 0x35, 0x36, 0x37, 0x38, 0x3a, 0x3b, 0x3c, 0x3d, 0x3e, 0x3f, 0x41, 0x42,
    0x43, 0x44, 0x45, 0x46, 0x48, 0x49, 0x4a, 0x4b, 0x4d, 0x4e, 0x4f, 0x50, 0x52, 0x53, 0x54, 0x55,
    0x57, 0x58, 0x59, 0x5a, 0x5c, 0x5d, 0x5e, 0x60, 0x61, 0x62, 0x63, 0x65, 0x66, 0x67, 0x69, 0x6a,
    0x6b, 0x6d, 0x6e, 0x6f, 0x71, 0x72, 0x73, 0x74, 0x76, 0x77, 0x78, 0x7a, 0x7b, 0x7c, 0x7e, 0x7f,
    0x80, 0x82, 0x83, 0x84, 0x86, 0x87, 0x88, 0x8a, 0x8b, 0x8c, 0x8e, 0x8f, 0x90, 0x92, 0x93, 0x94,
    0x95, 0x97, 0x98, 0x99, 0x9b, 0x9c, 0x9d, 0x9f, 0xa0, 0xa1, 0xa2, 0xa4, 0xa5, 0xa6, 0xa8, 0xa9,
    0xaa, 0xab, 0xad, 0xae, 0xaf, 0xb0, 0xb2, 0xb3, 0xb4, 0xb5, 0xb6, 0xb8, 0xb9, 0xba, 0xbb, 0xbc,
    0xbe, 0xbf, 0xc0, 0xc1, 0xc2, 0xc4, 0xc5, 0xc6, 0xc7, 0xc8, 0xc9, 0xca, 0xcb, 0xcd, 0xce, 0xcf,
    0xd0, 0xd1, 0xd2, 0xd3, 0xd4, 0xd5, 0xd6, 0xd7, 0xd8, 0xd9, 0xda, 0xdb, 0xdc, 0xdd, 0xde, 0xdf,
    0xe0, 0xe1, 0xe2, 0xe3, 0xe4, 0xe4, 0xe5, 0xe6, 0xe7, 0xe8, 0xe9, 0xea, 0xea, 0xeb, 0xec, 0xed,
    0xed, 0xee, 0xef, 0xf0, 0xf0, 0xf1, 0xf2, 0xf3, 0xf3, 0xf4, 0xf5, 0xf5, 0xf6, 0xf6, 0xf7, 0xf8,
    0xf8, 0xf9, 0xf9, 0xfa, 0xfa, 0xfb, 0xfb, 0xfc, 0xfc, 0xfd, 0xfd, 0xfd, 0xfe, 0xfe, 0xff, 0xff,
];

static LESS_CONTRAST: [u8; 256] = [
    0x00, 0x02, 0x03, 0x05, 0x06, 0x08, 0x09, 0x0b, 0x0c, 0x0e, 0x0f, 0x11, 0x12, 0x13, 0x15, 0x16,
    0x18, 0x19, 0x1a, 0x1c, 0x1d, 0x1e, 0x20, 0x21, 0x22, 0x23, 0x25, 0x26, 0x27, 0x28, 0x2a, 0x2b,
    0x2c, 0x2d, 0x2e, 0x30, 0x31, 0x32, 0x33, 0x34, 0x35, 0x36, 0x37, 0x38, 0x3a, 0x3b, 0x3c, 0x3d,
    0x3e, 0x3f, 0x40, 0x41, 0x42, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49, 0x4a, 0x4b, 0x4b, 0x4c,
    0x4d, 0x4e, 0x4f, 0x50, 0x51, 0x52, 0x53, 0x54, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59, 0x59, 0x5a,
    0x5b, 0x5c, 0x5d, 0x5e, 0x5e, 0x5f, 0x60, 0x61, 0x61, 0x62, 0x63, 0x64, 0x65, 0x65, 0x66, 0x67,
    0x68, 0x68, 0x69, 0x6a, 0x6a, 0x6b, 0x6c, 0x6d, 0x6d, 0x6e, 0x6f, 0x70, 0x70, 0x71, 0x72, 0x72,
    0x73, 0x74, 0x75, 0x75, 0x76, 0x77, 0x77, 0x78, 0x79, 0x79, 0x7a, 0x7b, 0x7c, 0x7c, 0x7d, 0x7e,
    0x7e, 0x7f, 0x80, 0x80, 0x81, 0x82, 0x83, 0x83, 0x84, 0x85, 0x85, 0x86, 0x87, 0x87, 0x88, 0x89,
    0x8a, 0x8a, 0x8b, 0x8c, 0x8c, 0x8d, 0x8e, 0x8f, 0x8f, 0x90, 0x91, 0x92, 0x92, 0x93, 0x94, 0x95,
    0x95, 0x96, 0x97, 0x98, 0x98, 0x99, 0x9a, 0x9b, 0x9c, 0x9c, 0x9d, 0x9e, 0x9f, 0xa0, 0xa0, 0xa1,
    0xa2, 0xa3, 0xa4, 0xa5, 0xa6, 0xa6, 0xa7, 0xa8, 0xa9, 0xaa, 0xab, 0xac, 0xad, 0xae, 0xae, 0xaf,
    0xb0, 0xb1, 0xb2, 0xb3, 0xb4, 0xb5, 0xb6, 0xb7, 0xb8, 0xb9, 0xba, 0xbb, 0xbc, 0xbd, 0xbe, 0xbf,
    0xc0, 0xc2, 0xc3, 0xc4, 0xc5, 0xc6, 0xc7, 0xc8, 0xc9, 0xca, 0xcc, 0xcd, 0xce, 0xcf, 0xd0, 0xd2,
    0xd3, 0xd4, 0xd5, 0xd7, 0xd8, 0xd9, 0xda, 0xdc, 0xdd, 0xde, 0xe0, 0xe1, 0xe3, 0xe4, 0xe5, 0xe7,
    0xe8, 0xea, 0xeb, 0xec, 0xee, 0xef, 0xf1, 0xf2, 0xf4, 0xf5, 0xf7, 0xf9, 0xfa, 0xfc, 0xfd, 0xff,
];

static LIGHTEN: [u8; 256] = [
    0x00, 0x01, 0x03, 0x04, 0x06, 0x07, 0x08, 0x0a, 0x0b, 0x0d, 0x0e, 0x0f, 0x11, 0x12, 0x13, 0x15,
    0x16, 0x18, 0x19, 0x1a, 0x1c, 0x1d, 0x1e, 0x20, 0x21, 0x22, 0x24, 0x25, 0x26, 0x28, 0x29, 0x2a,
    0x2c, 0x2d, 0x2e, 0x30, 0x31, 0x32, 0x34, 0x35, 0x36, 0x38, 0x39, 0x3a, 0x3c, 0x3d, 0x3e, 0x3f,
    0x41, 0x42, 0x43, 0x45, 0x46, 0x47, 0x48, 0x4a, 0x4b, 0x4c, 0x4d, 0x4f, 0x50, 0x51, 0x53, 0x54,
    0x55, 0x56, 0x57, 0x59, 0x5a, 0x5b, 0x5c, 0x5e, 0x5f, 0x60, 0x61, 0x63, 0x64, 0x65, 0x66, 0x67,
    0x69, 0x6a, 0x6b, 0x6c, 0x6d, 0x6f, 0x70, 0x71, 0x72, 0x73, 0x74, 0x76, 0x77, 0x78, 0x79, 0x7a,
    0x7b, 0x7c, 0x7e, 0x7f, 0x80, 0x81, 0x82, 0x83, 0x84, 0x85, 0x87, 0x88, 0x89, 0x8a, 0x8b, 0x8c,
    0x8d, 0x8e, 0x8f, 0x90, 0x91, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98, 0x99, 0x9a, 0x9b, 0x9c, 0x9d,
    0x9e, 0x9f, 0xa0, 0xa1, 0xa2, 0xa3, 0xa4, 0xa5, 0xa6, 0xa7, 0xa8, 0xa9, 0xaa, 0xab, 0xac, 0xad,
    0xae, 0xaf, 0xb0, 0xb1, 0xb2, 0xb3, 0xb4, 0xb5, 0xb5, 0xb6, 0xb7, 0xb8, 0xb9, 0xba, 0xbb, 0xbc,
    0xbd, 0xbe, 0xbf, 0xbf, 0xc0, 0xc1, 0xc2, 0xc3, 0xc4, 0xc5, 0xc5, 0xc6, 0xc7, 0xc8, 0xc9, 0xca,
    0xcb, 0xcb, 0xcc, 0xcd, 0xce, 0xcf, 0xcf, 0xd0, 0xd1, 0xd2, 0xd3, 0xd3, 0xd4, 0xd5, 0xd6, 0xd6,
    0xd7, 0xd8, 0xd9, 0xda, 0xda, 0xdb, 0xdc, 0xdc, 0xdd, 0xde, 0xdf, 0xdf, 0xe0, 0xe1, 0xe2, 0xe2,
    0xe3, 0xe4, 0xe4, 0xe5, 0xe6, 0xe6, 0xe7, 0xe8, 0xe8, 0xe9, 0xea, 0xea, 0xeb, 0xec, 0xec, 0xed,
    0xee, 0xee, 0xef, 0xef, 0xf0, 0xf1, 0xf1, 0xf2, 0xf2, 0xf3, 0xf4, 0xf4, 0xf5, 0xf5, 0xf6, 0xf6,
    0xf7, 0xf8, 0xf8, 0xf9, 0xf9, 0xfa, 0xfa, 0xfb, 0xfb, 0xfc, 0xfc, 0xfd, 0xfd, 0xfe, 0xff, 0xff,
];

static DARKEN: [u8; 256] = [
    0x00, 0x01, 0x01, 0x02, 0x03, 0x03, 0x04, 0x05, 0x06, 0x06, 0x07, 0x08, 0x08, 0x09, 0x0a, 0x0a,
    0x0b, 0x0c, 0x0d, 0x0d, 0x0e, 0x0f, 0x0f, 0x10, 0x11, 0x12, 0x12, 0x13, 0x14, 0x14, 0x15, 0x16,
    0x17, 0x17, 0x18, 0x19, 0x1a, 0x1a, 0x1b, 0x1c, 0x1d, 0x1d, 0x1e, 0x1f, 0x20, 0x20, 0x21, 0x22,
    0x23, 0x23, 0x24, 0x25, 0x26, 0x26, 0x27, 0x28, 0x29, 0x2a, 0x2a, 0x2b, 0x2c, 0x2d, 0x2d, 0x2e,
    0x2f, 0x30, 0x31, 0x31, 0x32, 0x33, 0x34, 0x35, 0x35, 0x36, 0x37, 0x38, 0x39, 0x39, 0x3a, 0x3b,
    0x3c, 0x3d, 0x3e, 0x3e, 0x3f, 0x40, 0x41, 0x42, 0x43, 0x44, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49,
    0x4a, 0x4a, 0x4b, 0x4c, 0x4d, 0x4e, 0x4f, 0x50, 0x51, 0x52, 0x52, 0x53, 0x54, 0x55, 0x56, 0x57,
    0x58, 0x59, 0x5a, 0x5b, 0x5c, 0x5d, 0x5d, 0x5e, 0x5f, 0x60, 0x61, 0x62, 0x63, 0x64, 0x65, 0x66,
    0x67, 0x68, 0x69, 0x6a, 0x6b, 0x6c, 0x6d, 0x6e, 0x6f, 0x70, 0x71, 0x72, 0x73, 0x74, 0x75, 0x76,
    0x77, 0x78, 0x79, 0x7a, 0x7b, 0x7c, 0x7d, 0x7e, 0x7f, 0x80, 0x81, 0x83, 0x84, 0x85, 0x86, 0x87,
    0x88, 0x89, 0x8a, 0x8b, 0x8c, 0x8d, 0x8e, 0x90, 0x91, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97, 0x99,
    0x9a, 0x9b, 0x9c, 0x9d, 0x9e, 0x9f, 0xa1, 0xa2, 0xa3, 0xa4, 0xa5, 0xa6, 0xa8, 0xa9, 0xaa, 0xab,
    0xac, 0xae, 0xaf, 0xb0, 0xb1, 0xb2, 0xb4, 0xb5, 0xb6, 0xb7, 0xb9, 0xba, 0xbb, 0xbc, 0xbd, 0xbf,
    0xc0, 0xc1, 0xc3, 0xc4, 0xc5, 0xc6, 0xc8, 0xc9, 0xca, 0xcb, 0xcd, 0xce, 0xcf, 0xd1, 0xd2, 0xd3,
    0xd5, 0xd6, 0xd7, 0xd8, 0xda, 0xdb, 0xdc, 0xde, 0xdf, 0xe0, 0xe2, 0xe3, 0xe5, 0xe6, 0xe7, 0xe9,
    0xea, 0xeb, 0xed, 0xee, 0xf0, 0xf1, 0xf2, 0xf4, 0xf5, 0xf6, 0xf8, 0xf9, 0xfb, 0xfc, 0xfe, 0xff,
];

/// Maps `x` through a 256 entry tone curve.
///
/// The input is clamped to `[0, 1]` and rounded to the nearest entry.
pub fn curve_evaluate(x: f32, lut: &[u8; 256]) -> f32 {
    let index = (clamp01(x) * 255.0 + 0.5) as usize;
    lut[index.min(255)] as f32 / 255.0
}

#[derive(Debug, Clone, Copy)]
struct ChannelFilter {
    curve: Option<&'static [u8; 256]>,
    center: f32,
    side: f32,
    corner: f32,
    lerp: f32,
}

impl ChannelFilter {
    const IDENTITY: Self = Self {
        curve: None,
        center: 1.0,
        side: 0.0,
        corner: 0.0,
        lerp: 0.0,
    };

    fn new(filter: PostMipImageFilter, mip: usize) -> Self {
        let curve = |lut| Self {
            curve: Some(lut),
            lerp: 1.0,
            ..Self::IDENTITY
        };
        let sharpen = |center| Self {
            center,
            side: -2.0,
            corner: -1.0,
            lerp: 1.0,
            ..Self::IDENTITY
        };

        match filter {
            PostMipImageFilter::Lighter => curve(&LIGHTEN),
            PostMipImageFilter::Darker => curve(&DARKEN),
            PostMipImageFilter::MoreContrast => curve(&MORE_CONTRAST),
            PostMipImageFilter::LessContrast => curve(&LESS_CONTRAST),
            PostMipImageFilter::Smooth => Self {
                center: 12.0,
                side: 2.0,
                corner: 1.0,
                lerp: 1.0,
                ..Self::IDENTITY
            },
            PostMipImageFilter::SharpenGradual => {
                sharpen(23.0 + SHARPEN_GRADUAL.get(mip).copied().unwrap_or(0.0))
            }
            PostMipImageFilter::Sharpen1x => sharpen(23.0),
            PostMipImageFilter::Sharpen2x => sharpen(19.0),
            PostMipImageFilter::Sharpen3x => sharpen(17.0),
            // applied separately with Image::high_pass_filter_image
            PostMipImageFilter::None | PostMipImageFilter::HighPass => Self::IDENTITY,
        }
    }

    fn weight(&self, corner: bool) -> f32 {
        if corner {
            self.corner
        } else {
            self.side
        }
    }
}

impl Image {
    /// Applies a per channel post filter to a face and returns the result as
    /// a new 2D image.
    ///
    /// Tone curves remap each value. Kernel filters (smoothing and
    /// sharpening) convolve the curve mapped center with its 8 neighbours,
    /// reading clamped to the edges. `mip` selects the strength of
    /// [`PostMipImageFilter::SharpenGradual`].
    pub fn filter_image_face(
        &self,
        filters: &[PostMipImageFilter; 4],
        face: usize,
        mip: usize,
    ) -> Option<Image> {
        self.surface_plane(face, 0)?;

        let channels = filters.map(|f| ChannelFilter::new(f, mip));
        let mut result = Image::new(self.width(), self.height(), self.format()).ok()?;

        let max_x = self.width() as i32 - 1;
        let max_y = self.height() as i32 - 1;
        for y in 0..self.height() as i32 {
            for x in 0..self.width() as i32 {
                let texel = self.read(x as u32, y as u32, face).to_array();

                let mut src = [0.0; 4];
                let mut sum = [0.0; 4];
                let mut total = [0.0; 4];
                for c in 0..4 {
                    src[c] = match channels[c].curve {
                        Some(lut) => curve_evaluate(texel[c], lut),
                        None => texel[c],
                    };
                    sum[c] = src[c] * channels[c].center;
                    total[c] = channels[c].center;
                }

                for (dx, dy, corner) in NEIGHBOURS {
                    let nx = (x + dx).clamp(0, max_x) as u32;
                    let ny = (y + dy).clamp(0, max_y) as u32;
                    let neighbour = self.read(nx, ny, face).to_array();
                    for c in 0..4 {
                        let weight = channels[c].weight(corner);
                        sum[c] += neighbour[c] * weight;
                        total[c] += weight;
                    }
                }

                let mut out = [0.0; 4];
                for c in 0..4 {
                    let filtered = clamp01(sum[c] / total[c]);
                    out[c] = src[c] + (filtered - src[c]) * channels[c].lerp;
                }
                result.write(x as u32, y as u32, 0, Vec4::from_array(out));
            }
        }

        Some(result)
    }

    /// Sharpens a face in place with a high pass overlay.
    ///
    /// A blurred copy of the face is inverted, mixed 50% with the face,
    /// contrast enhanced and finally overlay blended onto the channels
    /// selected by `mask`. Returns `false` if the face does not exist.
    pub fn high_pass_filter_image(
        &mut self,
        mask: Option<&ChannelMask>,
        face: usize,
        u_wrap: UVAddressMode,
        v_wrap: UVAddressMode,
    ) -> bool {
        let base = match self.clone_face(face) {
            Some(base) => base,
            None => return false,
        };

        let blur = resample_same_size(&base, FilterType::Quadratic, u_wrap, v_wrap);
        let mut overlay = match blur {
            Some(blur) => resample_same_size(&blur, FilterType::Cubic, u_wrap, v_wrap),
            None => None,
        };
        let overlay = match overlay.as_mut() {
            Some(overlay) => overlay,
            None => return false,
        };

        overlay.invert_colors(0);
        overlay.blend_image_face(&base, 0.5, None, 0, 0);
        overlay.double_contrast(0);

        self.overlay_blend_image_face(&base, overlay, mask, face, 0, 0)
    }
}

/// Filters a 2D image without changing its size.
fn resample_same_size(
    image: &Image,
    filter: FilterType,
    u_wrap: UVAddressMode,
    v_wrap: UVAddressMode,
) -> Option<Image> {
    let (width, height) = (image.width(), image.height());
    let mut result = Image::new(width, height, image.format()).ok()?;
    let src = image.face(0)?;
    let dst = result.face_mut(0)?;
    for (src, dst) in src.planes().iter().zip(dst.planes_mut().iter_mut()) {
        resize_plane(src, width, height, dst, width, height, filter, u_wrap, v_wrap);
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ColorFormat;

    fn filled(width: u32, height: u32, color: Vec4) -> Image {
        let mut image = Image::new(width, height, ColorFormat::ARGB8888).unwrap();
        for y in 0..height {
            for x in 0..width {
                image.write(x, y, 0, color);
            }
        }
        image
    }

    #[test]
    fn curve_endpoints() {
        for lut in [&LIGHTEN, &DARKEN, &MORE_CONTRAST, &LESS_CONTRAST] {
            assert_eq!(curve_evaluate(0.0, lut), 0.0);
            assert_eq!(curve_evaluate(1.0, lut), 1.0);
            assert_eq!(curve_evaluate(-5.0, lut), 0.0);
            assert_eq!(curve_evaluate(7.0, lut), 1.0);
        }
        assert!(curve_evaluate(0.5, &LIGHTEN) > 0.5);
        assert!(curve_evaluate(0.5, &DARKEN) < 0.5);
        assert_eq!(curve_evaluate(0.5, &LIGHTEN), 0x9e as f32 / 255.0);
    }

    #[test]
    fn kernels_preserve_constant_images() {
        let image = filled(5, 3, Vec4::new(0.25, 0.5, 0.75, 1.0));
        for filter in [
            PostMipImageFilter::Smooth,
            PostMipImageFilter::SharpenGradual,
            PostMipImageFilter::Sharpen1x,
            PostMipImageFilter::Sharpen2x,
            PostMipImageFilter::Sharpen3x,
        ] {
            let result = image.filter_image_face(&[filter; 4], 0, 0).unwrap();
            for y in 0..3 {
                for x in 0..5 {
                    let diff = (result.read(x, y, 0) - image.read(x, y, 0)).abs();
                    assert!(diff.max_element() < 1e-5, "{:?}", filter);
                }
            }
        }
    }

    #[test]
    fn none_channels_are_unchanged() {
        let mut image = filled(3, 3, Vec4::splat(0.2));
        image.write(1, 1, 0, Vec4::splat(0.9));
        let filters = [
            PostMipImageFilter::Smooth,
            PostMipImageFilter::None,
            PostMipImageFilter::Lighter,
            PostMipImageFilter::HighPass,
        ];
        let result = image.filter_image_face(&filters, 0, 3).unwrap();
        let center = result.read(1, 1, 0);
        // (0.9 * 12 + 0.2 * (4 * 2 + 4 * 1)) / 24
        assert!((center.x - 0.55).abs() < 1e-5);
        assert_eq!(center.y, 0.9);
        assert_eq!(center.z, curve_evaluate(0.9, &LIGHTEN));
        assert_eq!(center.w, 0.9);
    }

    #[test]
    fn missing_face() {
        let image = filled(2, 2, Vec4::ONE);
        assert!(image
            .filter_image_face(&[PostMipImageFilter::Smooth; 4], 1, 0)
            .is_none());
    }

    #[test]
    fn high_pass_keeps_flat_gray() {
        let mut image = filled(4, 4, Vec4::splat(0.5));
        assert!(image.high_pass_filter_image(
            None,
            0,
            UVAddressMode::Wrap,
            UVAddressMode::Wrap
        ));
        for y in 0..4 {
            for x in 0..4 {
                let diff = (image.read(x, y, 0) - Vec4::splat(0.5)).abs();
                assert!(diff.max_element() < 1e-4);
            }
        }
        assert!(!image.high_pass_filter_image(
            None,
            2,
            UVAddressMode::Wrap,
            UVAddressMode::Wrap
        ));
    }
}
