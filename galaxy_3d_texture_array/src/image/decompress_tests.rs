//! Unit tests for decompress.rs
//!
//! Blocks are hand-assembled so every expected texel can be derived from the
//! format definitions.

use crate::error::Error;
use crate::image::decompress::decompress_level;
use crate::image::CompressedFormat;

fn decode(format: CompressedFormat, block: &[u8], width: u32, height: u32) -> Vec<[u8; 4]> {
    let mut dest = vec![0u8; (width * height * 4) as usize];
    decompress_level(format, block, width, height, &mut dest).unwrap();
    dest.chunks_exact(4).map(|t| [t[0], t[1], t[2], t[3]]).collect()
}

// Pure red 565 endpoint, black second endpoint
const RED_BLACK: [u8; 4] = [0x00, 0xF8, 0x00, 0x00];

// ============================================================================
// BC1
// ============================================================================

#[test]
fn test_bc1_endpoint_color() {
    let block = [RED_BLACK[0], RED_BLACK[1], RED_BLACK[2], RED_BLACK[3], 0, 0, 0, 0];
    let texels = decode(CompressedFormat::Dxt1, &block, 4, 4);
    assert!(texels.iter().all(|&t| t == [255, 0, 0, 255]));
}

#[test]
fn test_bc1_interpolated_color() {
    // Index 2 everywhere: 2/3 of color0 + 1/3 of color1
    let block = [RED_BLACK[0], RED_BLACK[1], RED_BLACK[2], RED_BLACK[3], 0xAA, 0xAA, 0xAA, 0xAA];
    let texels = decode(CompressedFormat::Dxt1, &block, 4, 4);
    assert!(texels.iter().all(|&t| t == [170, 0, 0, 255]));
}

#[test]
fn test_bc1_transparent_mode() {
    // color0 <= color1 selects 3 colors + transparent; index 3 is transparent black
    let block = [0x00, 0x00, 0x00, 0xF8, 0xFF, 0xFF, 0xFF, 0xFF];
    let texels = decode(CompressedFormat::Dxt1, &block, 4, 4);
    assert!(texels.iter().all(|&t| t == [0, 0, 0, 0]));
}

#[test]
fn test_partial_block_is_clipped() {
    let block = [RED_BLACK[0], RED_BLACK[1], RED_BLACK[2], RED_BLACK[3], 0, 0, 0, 0];
    let texels = decode(CompressedFormat::Dxt1, &block, 2, 2);
    assert_eq!(texels.len(), 4);
    assert!(texels.iter().all(|&t| t == [255, 0, 0, 255]));
}

// ============================================================================
// BC2 / BC3
// ============================================================================

#[test]
fn test_bc2_explicit_alpha() {
    let mut block = [0u8; 16];
    block[..8].copy_from_slice(&[0x77; 8]);
    block[8..12].copy_from_slice(&RED_BLACK);
    let texels = decode(CompressedFormat::Dxt3, &block, 4, 4);
    // 4-bit alpha 7 expands to 0x77
    assert!(texels.iter().all(|&t| t == [255, 0, 0, 0x77]));
}

#[test]
fn test_bc3_endpoint_alpha() {
    let mut block = [0u8; 16];
    block[0] = 128;
    block[1] = 0;
    block[8..12].copy_from_slice(&RED_BLACK);
    let texels = decode(CompressedFormat::Dxt5, &block, 4, 4);
    assert!(texels.iter().all(|&t| t == [255, 0, 0, 128]));
}

#[test]
fn test_bc3_six_value_mode_opaque_index() {
    // alpha0 <= alpha1: index 7 is fully opaque
    let mut block = [0u8; 16];
    block[0] = 0;
    block[1] = 100;
    block[2..8].copy_from_slice(&[0xFF; 6]);
    block[8..12].copy_from_slice(&RED_BLACK);
    let texels = decode(CompressedFormat::Dxt5, &block, 4, 4);
    assert!(texels.iter().all(|&t| t[3] == 255));
}

// ============================================================================
// ETC1
// ============================================================================

#[test]
fn test_etc1_individual_mode() {
    // Both sub-blocks base 0x8 (expands to 136), table 0, all indices 0 (+2)
    let block = [0x88, 0x88, 0x88, 0x00, 0x00, 0x00, 0x00, 0x00];
    let texels = decode(CompressedFormat::Etc1, &block, 4, 4);
    assert!(texels.iter().all(|&t| t == [138, 138, 138, 255]));
}

#[test]
fn test_etc1_negative_modifier() {
    // Every most significant index bit set: index 2 (-2)
    let block = [0x88, 0x88, 0x88, 0x00, 0xFF, 0xFF, 0x00, 0x00];
    let texels = decode(CompressedFormat::Etc1, &block, 4, 4);
    assert!(texels.iter().all(|&t| t == [134, 134, 134, 255]));
}

#[test]
fn test_etc1_sub_blocks_split_columns() {
    // Left sub-block base 0x0, right sub-block base 0xF; no flip splits by column
    let block = [0x0F, 0x0F, 0x0F, 0x00, 0x00, 0x00, 0x00, 0x00];
    let texels = decode(CompressedFormat::Etc1, &block, 4, 4);
    for y in 0..4 {
        assert_eq!(texels[y * 4], [2, 2, 2, 255]);
        assert_eq!(texels[y * 4 + 3], [255, 255, 255, 255]);
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[test]
fn test_short_data_is_rejected() {
    let mut dest = vec![0u8; 8 * 8 * 4];
    let result = decompress_level(CompressedFormat::Dxt1, &[0; 8], 8, 8, &mut dest);
    assert!(matches!(result, Err(Error::ImageLoadFailed(_))));
}
