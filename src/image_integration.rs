use std::ops::Deref;

use image::{DynamicImage, ImageBuffer, Rgba32FImage};

use crate::{ColorFormat, Image, ImageError};

/// Converts an `image::ImageBuffer` into a 2D [`Image`] by normalizing every
/// channel to `[0, 1]` (float buffers are copied as is). Missing channels
/// are filled like the matching DDS format would: gray is replicated and
/// alpha is one.
macro_rules! image_buffer_to_image {
    ($pixel:ty, $sub_pixel:ty, $format:expr, $p:ident => $convert:expr) => {
        impl<Container> TryFrom<&ImageBuffer<$pixel, Container>> for Image
        where
            Container: Deref<Target = [$sub_pixel]>,
        {
            type Error = ImageError;

            /// Returns an error if the buffer is empty.
            fn try_from(buffer: &ImageBuffer<$pixel, Container>) -> Result<Self, Self::Error> {
                let mut image = Image::new(buffer.width(), buffer.height(), $format)?;
                if let Some(face) = image.face_mut(0) {
                    let [r, g, b, a] = face.planes_mut();
                    for (i, $p) in buffer.pixels().enumerate() {
                        let [cr, cg, cb, ca]: [f32; 4] = $convert;
                        r[i] = cr;
                        g[i] = cg;
                        b[i] = cb;
                        a[i] = ca;
                    }
                }
                Ok(image)
            }
        }
    };
}

fn n8(x: u8) -> f32 {
    x as f32 / 255.0
}

image_buffer_to_image!(image::Luma<u8>, u8, ColorFormat::L8, p => {
    let l = n8(p.0[0]);
    [l, l, l, 1.0]
});
image_buffer_to_image!(image::LumaA<u8>, u8, ColorFormat::AL88, p => {
    let l = n8(p.0[0]);
    [l, l, l, n8(p.0[1])]
});
image_buffer_to_image!(image::Rgb<u8>, u8, ColorFormat::ARGB8888, p => {
    let [r, g, b] = p.0;
    [n8(r), n8(g), n8(b), 1.0]
});
image_buffer_to_image!(image::Rgba<u8>, u8, ColorFormat::ARGB8888, p => p.0.map(n8));
image_buffer_to_image!(image::Luma<f32>, f32, ColorFormat::F32, p => {
    let l = p.0[0];
    [l, l, l, 1.0]
});
image_buffer_to_image!(image::Rgb<f32>, f32, ColorFormat::RGBAFloatMap, p => {
    let [r, g, b] = p.0;
    [r, g, b, 1.0]
});
image_buffer_to_image!(image::Rgba<f32>, f32, ColorFormat::RGBAFloatMap, p => p.0);

impl TryFrom<&DynamicImage> for Image {
    type Error = ImageError;

    /// Converts any `DynamicImage`.
    ///
    /// Color types without a matching [`ColorFormat`] are converted to 32 bit
    /// float RGBA first.
    fn try_from(image: &DynamicImage) -> Result<Self, Self::Error> {
        match image {
            DynamicImage::ImageLuma8(buffer) => Image::try_from(buffer),
            DynamicImage::ImageLumaA8(buffer) => Image::try_from(buffer),
            DynamicImage::ImageRgb8(buffer) => Image::try_from(buffer),
            DynamicImage::ImageRgba8(buffer) => Image::try_from(buffer),
            DynamicImage::ImageRgb32F(buffer) => Image::try_from(buffer),
            DynamicImage::ImageRgba32F(buffer) => Image::try_from(buffer),
            other => Image::try_from(&other.to_rgba32f()),
        }
    }
}

impl Image {
    /// Copies a face or volume slice into a float RGBA `image` buffer.
    pub fn to_rgba32f(&self, face: usize) -> Option<Rgba32FImage> {
        let surface = self.clone_face(face)?;
        let [r, g, b, a] = surface.face(0)?.planes();

        let mut data = Vec::with_capacity(r.len() * 4);
        for i in 0..r.len() {
            data.extend_from_slice(&[r[i], g[i], b[i], a[i]]);
        }
        Rgba32FImage::from_raw(self.width(), self.height(), data)
    }
}
