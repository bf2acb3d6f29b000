#![forbid(unsafe_code)]

mod cast;
mod codec;
mod color;
mod decode;
mod decoder;
mod encode;
mod encoder;
mod error;
mod filter;
mod format;
mod generate;
mod header;
mod image;
#[cfg(feature = "image")]
mod image_integration;
mod layout;
mod mipset;
mod post;
mod resize;
mod settings;
mod swizzle;
mod util;

pub use codec::*;
pub use color::{
    color_format_create_rgbe, color_format_expand_rgbe, linear_to_srgb, make_color_format_batch,
    make_color_format_pixel, make_hdr_pixel, srgb_to_linear, ColorFormat, PixelBytes,
};
pub use decoder::*;
pub use error::*;
pub use format::*;
pub use header::*;
pub use layout::*;
pub use mipset::*;
pub use post::curve_evaluate;
pub use self::image::{Channel, ChannelMask, Face, Image};
pub use settings::*;
pub use swizzle::*;
