//! Separable polyphase resampling of single `f32` planes.
//!
//! Each destination texel is a normalized weighted sum of source texels
//! covered by the scaled kernel, first along rows and then along columns.
//! Texture addressing picks the edge policy per axis. The Clamp and Border
//! modes repeat the edge texel, which is the edge handling of the `resize`
//! crate; Wrap and Mirror have no counterpart there.

use crate::{filter::Kernel, FilterType, UVAddressMode};

/// Sub samples per destination texel when building a downsampling kernel.
const KERNEL_SAMPLES: u32 = 32;

/// How texel indexes outside the image are resolved while filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WrapMode {
    Clamp,
    Repeat,
    Mirror,
}
impl From<UVAddressMode> for WrapMode {
    fn from(mode: UVAddressMode) -> Self {
        match mode {
            UVAddressMode::Wrap => WrapMode::Repeat,
            UVAddressMode::Mirror => WrapMode::Mirror,
            UVAddressMode::Clamp | UVAddressMode::Border => WrapMode::Clamp,
        }
    }
}
impl WrapMode {
    fn index(self, x: i64, len: usize) -> usize {
        let len_i = len as i64;
        match self {
            WrapMode::Clamp => x.clamp(0, len_i - 1) as usize,
            WrapMode::Repeat => x.rem_euclid(len_i) as usize,
            WrapMode::Mirror => {
                if len == 1 {
                    return 0;
                }
                let mut x = x.abs();
                while x >= len_i {
                    x = (len_i + len_i - x - 2).abs();
                }
                x as usize
            }
        }
    }
}

/// Precomputed, normalized filter weights for resampling one axis.
struct PolyphaseKernel {
    /// Half the support of the kernel in source texels.
    width: f32,
    window_size: usize,
    /// `window_size` weights per destination texel.
    weights: Vec<f32>,
}

impl PolyphaseKernel {
    fn new(kernel: Kernel, src_len: usize, dst_len: usize) -> Self {
        let mut scale = dst_len as f32 / src_len as f32;
        let inv_scale = 1.0 / scale;
        let mut samples = KERNEL_SAMPLES;
        if scale > 1.0 {
            // upsampling
            samples = 1;
            scale = 1.0;
        }

        let width = kernel.width() * inv_scale;
        let window_size = (width * 2.0).ceil() as usize + 1;

        let mut weights = vec![0.0; window_size * dst_len];
        for (i, row) in weights.chunks_exact_mut(window_size).enumerate() {
            let center = (0.5 + i as f32) * inv_scale;
            let left = (center - width).floor();

            let mut total = 0.0;
            for (j, weight) in row.iter_mut().enumerate() {
                *weight = kernel.sample_box(left + j as f32 - center, scale, samples);
                total += *weight;
            }

            if total != 0.0 {
                row.iter_mut().for_each(|w| *w /= total);
            } else {
                // the kernel missed every texel, fall back to the nearest one
                let nearest = (center - left).floor() as usize;
                row[nearest.min(window_size - 1)] = 1.0;
            }
        }

        Self {
            width,
            window_size,
            weights,
        }
    }

    fn apply(
        &self,
        src_len: usize,
        dst_len: usize,
        wrap: WrapMode,
        read: impl Fn(usize) -> f32,
        mut write: impl FnMut(usize, f32),
    ) {
        let inv_scale = src_len as f32 / dst_len as f32;
        for (i, row) in self.weights.chunks_exact(self.window_size).enumerate() {
            let center = (0.5 + i as f32) * inv_scale;
            let left = (center - self.width).floor() as i64;

            let sum: f32 = row
                .iter()
                .enumerate()
                .map(|(j, weight)| weight * read(wrap.index(left + j as i64, src_len)))
                .sum();
            write(i, sum);
        }
    }
}

/// Resamples one channel plane of `src_width * src_height` texels.
///
/// Filters with a kernel are applied separably, horizontal first. Point
/// filters pick the nearest texel with clamped addressing.
#[allow(clippy::too_many_arguments)]
pub(crate) fn resize_plane(
    src: &[f32],
    src_width: u32,
    src_height: u32,
    dst: &mut [f32],
    dst_width: u32,
    dst_height: u32,
    filter: FilterType,
    u_wrap: UVAddressMode,
    v_wrap: UVAddressMode,
) {
    let (sw, sh) = (src_width as usize, src_height as usize);
    let (dw, dh) = (dst_width as usize, dst_height as usize);
    debug_assert!(src.len() >= sw * sh);
    debug_assert!(dst.len() >= dw * dh);

    let kernel = match Kernel::for_filter(filter) {
        Some(kernel) => kernel,
        None => {
            point_sample(src, sw, sh, dst, dw, dh);
            return;
        }
    };

    let x_kernel = PolyphaseKernel::new(kernel, sw, dw);
    let y_kernel = PolyphaseKernel::new(kernel, sh, dh);
    let u_wrap = WrapMode::from(u_wrap);
    let v_wrap = WrapMode::from(v_wrap);

    let mut tmp = vec![0.0_f32; dw * sh];
    for y in 0..sh {
        let src_row = &src[y * sw..(y + 1) * sw];
        let tmp_row = &mut tmp[y * dw..(y + 1) * dw];
        x_kernel.apply(sw, dw, u_wrap, |x| src_row[x], |x, v| tmp_row[x] = v);
    }

    for x in 0..dw {
        y_kernel.apply(
            sh,
            dh,
            v_wrap,
            |y| tmp[y * dw + x],
            |y, v| dst[y * dw + x] = v,
        );
    }
}

fn point_sample(src: &[f32], sw: usize, sh: usize, dst: &mut [f32], dw: usize, dh: usize) {
    let x_scale = 1.0 / dw as f32;
    let y_scale = 1.0 / dh as f32;
    for y in 0..dh {
        let sy = nearest(y as f32 * y_scale, sh);
        for x in 0..dw {
            let sx = nearest(x as f32 * x_scale, sw);
            dst[y * dw + x] = src[sy * sw + sx];
        }
    }
}

fn nearest(coord: f32, len: usize) -> usize {
    let i = (coord * len as f32 + 0.5).floor() as i64;
    i.clamp(0, len as i64 - 1) as usize
}
