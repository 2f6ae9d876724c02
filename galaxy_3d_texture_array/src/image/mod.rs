//! Decoded image values and block decompression
//!
//! Decoding encoded byte streams (PNG, DDS, KTX...) happens outside this
//! crate; the decoder hands over `Image` values.

#[allow(clippy::module_inception)]
mod image;
pub mod decompress;

pub use image::{Image, CompressedFormat, CompressedLevel};
