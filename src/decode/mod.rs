use crate::{util::div_ceil, CodecError, DxtFlags};

pub(crate) mod bc;

/// Decodes a whole surface of DXT blocks into tightly packed RGBA8 pixels.
///
/// Partial blocks at the right and bottom edges only write the pixels that
/// are inside the surface.
pub(crate) fn decompress_surface(
    blocks: &[u8],
    width: u32,
    height: u32,
    flags: DxtFlags,
    rgba: &mut [u8],
) -> Result<(), CodecError> {
    let bytes_per_block = flags.bytes_per_block()?;
    let blocks_x = div_ceil(width, 4) as usize;
    let blocks_y = div_ceil(height, 4) as usize;
    let width = width as usize;
    let height = height as usize;

    let required = blocks_x * blocks_y * bytes_per_block;
    if blocks.len() < required {
        return Err(CodecError::BufferTooSmall {
            expected: required,
            actual: blocks.len(),
        });
    }
    let required = width * height * 4;
    if rgba.len() < required {
        return Err(CodecError::BufferTooSmall {
            expected: required,
            actual: rgba.len(),
        });
    }

    let pixels = crate::cast::as_rgba_pixels_mut(rgba);
    for (block_index, block_bytes) in blocks[..blocks_x * blocks_y * bytes_per_block]
        .chunks_exact(bytes_per_block)
        .enumerate()
    {
        let decoded = decode_block(block_bytes, flags);

        let bx = (block_index % blocks_x) * 4;
        let by = (block_index / blocks_x) * 4;
        for (i, pixel) in decoded.iter().enumerate() {
            let x = bx + i % 4;
            let y = by + i / 4;
            if x < width && y < height {
                pixels[y * width + x] = *pixel;
            }
        }
    }

    Ok(())
}

fn decode_block(block_bytes: &[u8], flags: DxtFlags) -> [[u8; 4]; 16] {
    if flags.contains(DxtFlags::DXT1) {
        let mut block = [0; 8];
        block.copy_from_slice(&block_bytes[..8]);
        bc::dxt1_block(block)
    } else {
        let mut block = [0; 16];
        block.copy_from_slice(&block_bytes[..16]);
        if flags.contains(DxtFlags::DXT3) {
            bc::dxt3_block(block)
        } else {
            bc::dxt5_block(block)
        }
    }
}
