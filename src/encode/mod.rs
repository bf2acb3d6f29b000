use crate::{cast, util::div_ceil, CodecError, DxtFlags};

pub(crate) mod bc;

/// Encodes tightly packed RGBA8 pixels into DXT blocks.
///
/// Blocks that reach past the right or bottom edge repeat the last row and
/// column of the surface.
pub(crate) fn compress_surface(
    rgba: &[u8],
    width: u32,
    height: u32,
    flags: DxtFlags,
    blocks: &mut [u8],
) -> Result<(), CodecError> {
    let bytes_per_block = flags.bytes_per_block()?;
    let blocks_x = div_ceil(width, 4) as usize;
    let blocks_y = div_ceil(height, 4) as usize;
    let width = width as usize;
    let height = height as usize;

    let required = width * height * 4;
    if rgba.len() < required {
        return Err(CodecError::BufferTooSmall {
            expected: required,
            actual: rgba.len(),
        });
    }
    let required = blocks_x * blocks_y * bytes_per_block;
    if blocks.len() < required {
        return Err(CodecError::BufferTooSmall {
            expected: required,
            actual: blocks.len(),
        });
    }
    if width == 0 || height == 0 {
        return Ok(());
    }

    let pixels = cast::as_rgba_pixels(rgba);
    for (block_index, out) in blocks[..required]
        .chunks_exact_mut(bytes_per_block)
        .enumerate()
    {
        let bx = (block_index % blocks_x) * 4;
        let by = (block_index / blocks_x) * 4;

        let mut block = [[0_u8; 4]; 16];
        for (i, pixel) in block.iter_mut().enumerate() {
            let x = (bx + i % 4).min(width - 1);
            let y = (by + i / 4).min(height - 1);
            *pixel = pixels[y * width + x];
        }

        if flags.contains(DxtFlags::DXT1) {
            out.copy_from_slice(&bc::dxt1_block(&block));
        } else if flags.contains(DxtFlags::DXT3) {
            out.copy_from_slice(&bc::dxt3_block(&block));
        } else {
            out.copy_from_slice(&bc::dxt5_block(&block));
        }
    }

    Ok(())
}
