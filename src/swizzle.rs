use crate::SwizzleError;

/// Converts between linear texel coordinates and swizzled (Morton order)
/// offsets.
///
/// The bits of an offset are distributed round robin over the three axes
/// until each axis can address its whole extent. An axis that runs out of
/// extent stops receiving bits, so non-square textures are supported as
/// long as every dimension is a power of two.
///
/// Swizzled coordinates may be updated in place with the `add_*`, `sub_*`,
/// `inc_*` and `dec_*` helpers. These only touch the bits of one axis and
/// allow walking a swizzled buffer without recomputing full offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Swizzler {
    width: u32,
    height: u32,
    depth: u32,
    mask_u: u32,
    mask_v: u32,
    mask_w: u32,
}

impl Swizzler {
    pub fn new(width: u32, height: u32, depth: u32) -> Self {
        let mut mask_u = 0;
        let mut mask_v = 0;
        let mut mask_w = 0;

        let mut extent: u64 = 1;
        let mut bit: u32 = 1;
        loop {
            let mut assigned = false;
            if extent < width as u64 && bit != 0 {
                mask_u |= bit;
                bit = bit.wrapping_shl(1);
                assigned = true;
            }
            if extent < height as u64 && bit != 0 {
                mask_v |= bit;
                bit = bit.wrapping_shl(1);
                assigned = true;
            }
            if extent < depth as u64 && bit != 0 {
                mask_w |= bit;
                bit = bit.wrapping_shl(1);
                assigned = true;
            }
            extent <<= 1;
            if !assigned {
                break;
            }
        }

        Self {
            width,
            height,
            depth,
            mask_u,
            mask_v,
            mask_w,
        }
    }

    /// Creates a swizzler and checks that all dimensions are powers of two.
    pub fn new_checked(width: u32, height: u32, depth: u32) -> Result<Self, SwizzleError> {
        if !width.is_power_of_two() || !height.is_power_of_two() || !depth.is_power_of_two() {
            return Err(SwizzleError::NotPowerOfTwo {
                width,
                height,
                depth,
            });
        }
        Ok(Self::new(width, height, depth))
    }

    pub fn width(&self) -> u32 {
        self.width
    }
    pub fn height(&self) -> u32 {
        self.height
    }
    pub fn depth(&self) -> u32 {
        self.depth
    }
    pub fn masks(&self) -> [u32; 3] {
        [self.mask_u, self.mask_v, self.mask_w]
    }

    /// The number of texels covered by the swizzled address space.
    pub fn texel_count(&self) -> usize {
        self.width as usize * self.height as usize * self.depth as usize
    }

    pub fn swizzle_u(&self, u: u32) -> u32 {
        scatter(u, self.mask_u)
    }
    pub fn swizzle_v(&self, v: u32) -> u32 {
        scatter(v, self.mask_v)
    }
    pub fn swizzle_w(&self, w: u32) -> u32 {
        scatter(w, self.mask_w)
    }

    /// The swizzled offset of the texel at `(u, v, w)`.
    pub fn swizzle(&self, u: u32, v: u32, w: u32) -> u32 {
        self.swizzle_u(u) | self.swizzle_v(v) | self.swizzle_w(w)
    }

    pub fn unswizzle_u(&self, offset: u32) -> u32 {
        gather(offset, self.mask_u)
    }
    pub fn unswizzle_v(&self, offset: u32) -> u32 {
        gather(offset, self.mask_v)
    }
    pub fn unswizzle_w(&self, offset: u32) -> u32 {
        gather(offset, self.mask_w)
    }

    /// The linear coordinates of a swizzled offset.
    pub fn unswizzle(&self, offset: u32) -> (u32, u32, u32) {
        (
            self.unswizzle_u(offset),
            self.unswizzle_v(offset),
            self.unswizzle_w(offset),
        )
    }

    pub fn add_u(&self, offset: u32, swizzled: u32) -> u32 {
        masked_add(offset, swizzled, self.mask_u)
    }
    pub fn add_v(&self, offset: u32, swizzled: u32) -> u32 {
        masked_add(offset, swizzled, self.mask_v)
    }
    pub fn add_w(&self, offset: u32, swizzled: u32) -> u32 {
        masked_add(offset, swizzled, self.mask_w)
    }

    pub fn sub_u(&self, offset: u32, swizzled: u32) -> u32 {
        masked_sub(offset, swizzled, self.mask_u)
    }
    pub fn sub_v(&self, offset: u32, swizzled: u32) -> u32 {
        masked_sub(offset, swizzled, self.mask_v)
    }
    pub fn sub_w(&self, offset: u32, swizzled: u32) -> u32 {
        masked_sub(offset, swizzled, self.mask_w)
    }

    pub fn inc_u(&self, offset: u32) -> u32 {
        masked_add(offset, lowest_bit(self.mask_u), self.mask_u)
    }
    pub fn inc_v(&self, offset: u32) -> u32 {
        masked_add(offset, lowest_bit(self.mask_v), self.mask_v)
    }
    pub fn inc_w(&self, offset: u32) -> u32 {
        masked_add(offset, lowest_bit(self.mask_w), self.mask_w)
    }

    pub fn dec_u(&self, offset: u32) -> u32 {
        masked_sub(offset, lowest_bit(self.mask_u), self.mask_u)
    }
    pub fn dec_v(&self, offset: u32) -> u32 {
        masked_sub(offset, lowest_bit(self.mask_v), self.mask_v)
    }
    pub fn dec_w(&self, offset: u32) -> u32 {
        masked_sub(offset, lowest_bit(self.mask_w), self.mask_w)
    }

    /// Replaces the u bits of `offset` with the swizzled `u`.
    pub fn set_u(&self, offset: u32, u: u32) -> u32 {
        (offset & !self.mask_u) | self.swizzle_u(u)
    }
    pub fn set_v(&self, offset: u32, v: u32) -> u32 {
        (offset & !self.mask_v) | self.swizzle_v(v)
    }
    pub fn set_w(&self, offset: u32, w: u32) -> u32 {
        (offset & !self.mask_w) | self.swizzle_w(w)
    }

    /// Copies a linear buffer of `width * height * depth` texels into
    /// swizzled order.
    pub fn swizzle_box(
        &self,
        src: &[u8],
        dst: &mut [u8],
        bytes_per_pixel: usize,
    ) -> Result<(), SwizzleError> {
        self.check_box(src, dst, bytes_per_pixel)?;

        let mut linear = 0;
        let mut offset_w = 0;
        for _ in 0..self.depth {
            let mut offset_v = offset_w;
            for _ in 0..self.height {
                let mut offset = offset_v;
                for _ in 0..self.width {
                    let to = offset as usize * bytes_per_pixel;
                    dst[to..to + bytes_per_pixel]
                        .copy_from_slice(&src[linear..linear + bytes_per_pixel]);
                    linear += bytes_per_pixel;
                    offset = self.inc_u(offset);
                }
                offset_v = self.inc_v(offset_v);
            }
            offset_w = self.inc_w(offset_w);
        }

        Ok(())
    }

    /// The inverse of [`Self::swizzle_box`].
    pub fn unswizzle_box(
        &self,
        src: &[u8],
        dst: &mut [u8],
        bytes_per_pixel: usize,
    ) -> Result<(), SwizzleError> {
        self.check_box(src, dst, bytes_per_pixel)?;

        let mut linear = 0;
        let mut offset_w = 0;
        for _ in 0..self.depth {
            let mut offset_v = offset_w;
            for _ in 0..self.height {
                let mut offset = offset_v;
                for _ in 0..self.width {
                    let from = offset as usize * bytes_per_pixel;
                    dst[linear..linear + bytes_per_pixel]
                        .copy_from_slice(&src[from..from + bytes_per_pixel]);
                    linear += bytes_per_pixel;
                    offset = self.inc_u(offset);
                }
                offset_v = self.inc_v(offset_v);
            }
            offset_w = self.inc_w(offset_w);
        }

        Ok(())
    }

    fn check_box(&self, src: &[u8], dst: &[u8], bytes_per_pixel: usize) -> Result<(), SwizzleError> {
        if !self.width.is_power_of_two()
            || !self.height.is_power_of_two()
            || !self.depth.is_power_of_two()
        {
            return Err(SwizzleError::NotPowerOfTwo {
                width: self.width,
                height: self.height,
                depth: self.depth,
            });
        }

        let expected = self.texel_count() * bytes_per_pixel;
        let actual = src.len().min(dst.len());
        if actual < expected {
            return Err(SwizzleError::NotEnoughData { expected, actual });
        }
        Ok(())
    }
}

fn scatter(mut value: u32, mask: u32) -> u32 {
    let mut result = 0;
    let mut bit: u32 = 1;
    while bit != 0 && bit <= mask {
        if mask & bit != 0 {
            result |= value & bit;
        } else {
            value <<= 1;
        }
        bit = bit.wrapping_shl(1);
    }
    result
}

fn gather(offset: u32, mask: u32) -> u32 {
    let mut result = 0;
    let mut out_bit: u32 = 1;
    let mut bit: u32 = 1;
    while bit != 0 {
        if mask & bit != 0 {
            if offset & bit != 0 {
                result |= out_bit;
            }
            out_bit = out_bit.wrapping_shl(1);
        }
        bit = bit.wrapping_shl(1);
    }
    result
}

fn lowest_bit(mask: u32) -> u32 {
    mask & mask.wrapping_neg()
}

// Setting all bits outside the mask makes carries skip over the other axes.
fn masked_add(offset: u32, swizzled: u32, mask: u32) -> u32 {
    let sum = (offset | !mask).wrapping_add(swizzled & mask) & mask;
    sum | (offset & !mask)
}

fn masked_sub(offset: u32, swizzled: u32, mask: u32) -> u32 {
    let diff = (offset & mask).wrapping_sub(swizzled & mask) & mask;
    diff | (offset & !mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_partition_address_space() {
        let s = Swizzler::new(8, 4, 2);
        let [u, v, w] = s.masks();
        assert_eq!(u & v, 0);
        assert_eq!(u & w, 0);
        assert_eq!(v & w, 0);
        assert_eq!(u | v | w, 63);
        assert_eq!(u, 0b001001 | 0b100000);
        assert_eq!(v, 0b010010);
        assert_eq!(w, 0b000100);
    }

    #[test]
    fn two_dimensional_is_morton_order() {
        let s = Swizzler::new(4, 4, 1);
        assert_eq!(s.swizzle(1, 0, 0), 1);
        assert_eq!(s.swizzle(0, 1, 0), 2);
        assert_eq!(s.swizzle(1, 1, 0), 3);
        assert_eq!(s.swizzle(2, 0, 0), 4);
        assert_eq!(s.swizzle(3, 3, 0), 15);
    }

    #[test]
    fn increments_wrap_within_axis() {
        let s = Swizzler::new(4, 4, 1);
        let last_u = s.swizzle(3, 2, 0);
        assert_eq!(s.inc_u(last_u), s.swizzle(0, 2, 0));
        assert_eq!(s.dec_u(s.swizzle(0, 2, 0)), last_u);
        assert_eq!(s.add_v(s.swizzle(1, 1, 0), s.swizzle_v(2)), s.swizzle(1, 3, 0));
        assert_eq!(s.sub_v(s.swizzle(1, 3, 0), s.swizzle_v(2)), s.swizzle(1, 1, 0));
        assert_eq!(s.set_u(s.swizzle(1, 3, 0), 2), s.swizzle(2, 3, 0));
    }

    #[test]
    fn box_rejects_non_power_of_two() {
        let s = Swizzler::new(17, 4, 1);
        let src = vec![0; 17 * 4];
        let mut dst = vec![0; 17 * 4];
        assert!(matches!(
            s.swizzle_box(&src, &mut dst, 1),
            Err(SwizzleError::NotPowerOfTwo { width: 17, .. })
        ));
        assert!(Swizzler::new_checked(17, 4, 1).is_err());
    }
}
