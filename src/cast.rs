//! An internal module for casting between pixel and byte buffers.
//!
//! This serves as a wrapper around `bytemuck` to provide panic safety. All
//! functions in this module are guaranteed to be safe and **NEVER** panic.

/// Casts a slice of `u8` to RGBA8 pixels.
///
/// Trailing bytes that do not form a whole pixel are ignored.
pub(crate) fn as_rgba_pixels(buffer: &[u8]) -> &[[u8; 4]] {
    let len = buffer.len() / 4 * 4;
    bytemuck::cast_slice(&buffer[..len])
}

/// Casts a mutable slice of `u8` to RGBA8 pixels.
///
/// Trailing bytes that do not form a whole pixel are ignored.
pub(crate) fn as_rgba_pixels_mut(buffer: &mut [u8]) -> &mut [[u8; 4]] {
    let len = buffer.len() / 4 * 4;
    bytemuck::cast_slice_mut(&mut buffer[..len])
}
