use std::f32::consts::PI;

use crate::FilterType;

/// A continuous, symmetric reconstruction kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Kernel {
    Box,
    Triangle,
    Quadratic,
    Cubic,
    Mitchell { b: f32, c: f32 },
    Lanczos,
    Kaiser { width: f32, alpha: f32, stretch: f32 },
}

impl Kernel {
    /// The kernel used to resample with the given filter.
    ///
    /// `None` and `Point` have no kernel and are resampled by picking the
    /// nearest texel.
    pub fn for_filter(filter: FilterType) -> Option<Self> {
        match filter {
            FilterType::None | FilterType::Point => None,
            FilterType::Box => Some(Kernel::Box),
            FilterType::Triangle => Some(Kernel::Triangle),
            FilterType::Quadratic => Some(Kernel::Quadratic),
            FilterType::Cubic | FilterType::PointComposite => Some(Kernel::Cubic),
            FilterType::Mitchell | FilterType::Gaussian => Some(Kernel::Mitchell {
                b: 1.0 / 3.0,
                c: 1.0 / 3.0,
            }),
            FilterType::Sinc => Some(Kernel::Lanczos),
            FilterType::Kaiser => Some(Kernel::Kaiser {
                width: 3.0,
                alpha: 4.0,
                stretch: 1.0,
            }),
        }
    }

    /// The radius of the kernel's support.
    pub fn width(&self) -> f32 {
        match self {
            Kernel::Box => 0.5,
            Kernel::Triangle => 1.0,
            Kernel::Quadratic => 1.5,
            Kernel::Cubic => 1.0,
            Kernel::Mitchell { .. } => 2.0,
            Kernel::Lanczos => 3.0,
            Kernel::Kaiser { width, .. } => *width,
        }
    }

    pub fn evaluate(&self, x: f32) -> f32 {
        let x = x.abs();
        match *self {
            Kernel::Box => {
                if x <= 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            Kernel::Triangle => {
                if x < 1.0 {
                    1.0 - x
                } else {
                    0.0
                }
            }
            Kernel::Quadratic => {
                if x < 0.5 {
                    0.75 - x * x
                } else if x < 1.5 {
                    let t = x - 1.5;
                    0.5 * t * t
                } else {
                    0.0
                }
            }
            Kernel::Cubic => {
                if x < 1.0 {
                    (2.0 * x - 3.0) * x * x + 1.0
                } else {
                    0.0
                }
            }
            Kernel::Mitchell { b, c } => {
                if x < 1.0 {
                    let p0 = (6.0 - 2.0 * b) / 6.0;
                    let p2 = (-18.0 + 12.0 * b + 6.0 * c) / 6.0;
                    let p3 = (12.0 - 9.0 * b - 6.0 * c) / 6.0;
                    p0 + x * x * (p2 + x * p3)
                } else if x < 2.0 {
                    let q0 = (8.0 * b + 24.0 * c) / 6.0;
                    let q1 = (-12.0 * b - 48.0 * c) / 6.0;
                    let q2 = (6.0 * b + 30.0 * c) / 6.0;
                    let q3 = (-b - 6.0 * c) / 6.0;
                    q0 + x * (q1 + x * (q2 + x * q3))
                } else {
                    0.0
                }
            }
            Kernel::Lanczos => {
                if x < 3.0 {
                    sinc(PI * x) * sinc(PI * x / 3.0)
                } else {
                    0.0
                }
            }
            Kernel::Kaiser {
                width,
                alpha,
                stretch,
            } => {
                let t = x / width;
                if 1.0 - t * t >= 0.0 {
                    sinc(PI * x * stretch) * bessel0(alpha * (1.0 - t * t).sqrt()) / bessel0(alpha)
                } else {
                    0.0
                }
            }
        }
    }

    /// The average of the kernel over a box of one destination texel,
    /// evaluated with `samples` sub samples.
    pub fn sample_box(&self, x: f32, scale: f32, samples: u32) -> f32 {
        let inv_samples = 1.0 / samples as f32;
        let sum: f32 = (0..samples)
            .map(|s| {
                let p = (x + (s as f32 + 0.5) * inv_samples) * scale;
                self.evaluate(p)
            })
            .sum();
        sum * inv_samples
    }
}

fn sinc(x: f32) -> f32 {
    if x.abs() < 0.0001 {
        1.0 + x * x * (-1.0 / 6.0 + x * x * 1.0 / 120.0)
    } else {
        x.sin() / x
    }
}

/// The zeroth order modified Bessel function of the first kind.
fn bessel0(x: f32) -> f32 {
    const EPSILON_RATIO: f32 = 1e-6;

    let xh = 0.5 * x;
    let mut sum = 1.0;
    let mut pow = 1.0;
    let mut k = 0;
    let mut ds = 1.0;
    while ds > sum * EPSILON_RATIO {
        k += 1;
        pow *= xh / k as f32;
        ds = pow * pow;
        sum += ds;
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernels_peak_at_zero() {
        for filter in [
            FilterType::Box,
            FilterType::Triangle,
            FilterType::Cubic,
            FilterType::Sinc,
            FilterType::Kaiser,
        ] {
            let kernel = Kernel::for_filter(filter).unwrap();
            assert!((kernel.evaluate(0.0) - 1.0).abs() < 1e-5, "{:?}", filter);
            assert_eq!(kernel.evaluate(kernel.width() + 0.01), 0.0, "{:?}", filter);
        }

        let quadratic = Kernel::Quadratic;
        assert_eq!(quadratic.evaluate(0.0), 0.75);
        assert_eq!(quadratic.evaluate(1.5), 0.0);
    }

    #[test]
    fn point_filters_have_no_kernel() {
        assert_eq!(Kernel::for_filter(FilterType::Point), None);
        assert_eq!(Kernel::for_filter(FilterType::None), None);
        assert_eq!(
            Kernel::for_filter(FilterType::PointComposite),
            Some(Kernel::Cubic)
        );
        assert_eq!(
            Kernel::for_filter(FilterType::Gaussian),
            Kernel::for_filter(FilterType::Mitchell)
        );
    }

    #[test]
    fn bessel_matches_reference() {
        assert!((bessel0(0.0) - 1.0).abs() < 1e-6);
        assert!((bessel0(4.0) - 11.301922).abs() < 1e-3);
    }
}
