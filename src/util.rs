pub(crate) fn read_u32_le_array<const N: usize>(
    reader: &mut impl std::io::Read,
) -> std::io::Result<[u32; N]> {
    let mut buffer = [0; N];
    reader.read_exact(bytemuck::cast_slice_mut(buffer.as_mut_slice()))?;
    for i in buffer.iter_mut() {
        *i = u32::from_le(*i);
    }
    Ok(buffer)
}

pub(crate) fn write_u32_le_array<const N: usize>(
    writer: &mut impl std::io::Write,
    buffer: &[u32; N],
) -> std::io::Result<()> {
    let mut le = *buffer;
    for i in le.iter_mut() {
        *i = i.to_le();
    }
    writer.write_all(bytemuck::cast_slice(le.as_slice()))
}

/// An implementation of div_ceil to lower MSRV.
pub(crate) fn div_ceil(a: u32, b: u32) -> u32 {
    debug_assert!(b > 0);

    let d = a / b;
    if a % b != 0 {
        d + 1
    } else {
        d
    }
}

/// Number of halvings of `dim` (starting at 1) until it no longer exceeds
/// `limit`.
pub(crate) fn mip_count_for(mut dim: u32, limit: u32) -> u32 {
    let mut count = 1;
    while dim > limit {
        dim >>= 1;
        count += 1;
    }
    count
}
