/// Block decompression to RGBA8
///
/// Used as an upload fallback when the device cannot sample a compressed
/// format natively. Every format is decoded one 4x4 block at a time; texels
/// of edge blocks that fall outside the level are dropped.

use crate::error::{Error, Result};
use crate::image::CompressedFormat;

type Block = [[u8; 4]; 16];

/// ETC1 intensity modifier table
const ETC1_MODIFIERS: [[i32; 4]; 8] = [
    [2, 8, -2, -8],
    [5, 17, -5, -17],
    [9, 29, -9, -29],
    [13, 42, -13, -42],
    [18, 60, -18, -60],
    [24, 80, -24, -80],
    [33, 106, -33, -106],
    [47, 183, -47, -183],
];

/// Decompress a whole level into `dest` (exactly `width * height * 4` bytes)
pub fn decompress_level(
    format: CompressedFormat,
    data: &[u8],
    width: u32,
    height: u32,
    dest: &mut [u8],
) -> Result<()> {
    let block_size = format.block_size() as usize;
    let blocks_x = width.div_ceil(4) as usize;
    let blocks_y = height.div_ceil(4) as usize;
    if data.len() < blocks_x * blocks_y * block_size {
        return Err(Error::ImageLoadFailed(format!(
            "compressed level holds {} bytes, expected {}",
            data.len(), blocks_x * blocks_y * block_size
        )));
    }

    let pixels: &mut [[u8; 4]] = bytemuck::cast_slice_mut(dest);
    for by in 0..blocks_y {
        for bx in 0..blocks_x {
            let offset = (by * blocks_x + bx) * block_size;
            let source = &data[offset..offset + block_size];
            let block = match format {
                CompressedFormat::Dxt1 => decode_color_block(source, true),
                CompressedFormat::Dxt3 => decode_dxt3_block(source),
                CompressedFormat::Dxt5 => decode_dxt5_block(source),
                CompressedFormat::Etc1 => decode_etc1_block(source),
            };
            write_block(pixels, width as usize, height as usize, bx * 4, by * 4, &block);
        }
    }
    Ok(())
}

fn write_block(pixels: &mut [[u8; 4]], width: usize, height: usize, x0: usize, y0: usize, block: &Block) {
    for y in 0..4 {
        if y0 + y >= height {
            break;
        }
        for x in 0..4 {
            if x0 + x >= width {
                break;
            }
            pixels[(y0 + y) * width + x0 + x] = block[y * 4 + x];
        }
    }
}

fn expand_565(color: u16) -> [u8; 4] {
    let r = ((color >> 11) & 0x1f) as u8;
    let g = ((color >> 5) & 0x3f) as u8;
    let b = (color & 0x1f) as u8;
    [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2), 255]
}

fn mix(a: [u8; 4], b: [u8; 4], weight_a: u32, weight_b: u32) -> [u8; 4] {
    let total = weight_a + weight_b;
    let mut out = [0u8; 4];
    for c in 0..3 {
        out[c] = ((a[c] as u32 * weight_a + b[c] as u32 * weight_b) / total) as u8;
    }
    out[3] = 255;
    out
}

/// BC1 color block (8 bytes). `one_bit_alpha` enables the 3-color + transparent mode.
fn decode_color_block(source: &[u8], one_bit_alpha: bool) -> Block {
    let c0 = u16::from_le_bytes([source[0], source[1]]);
    let c1 = u16::from_le_bytes([source[2], source[3]]);
    let color0 = expand_565(c0);
    let color1 = expand_565(c1);

    let palette = if c0 > c1 || !one_bit_alpha {
        [color0, color1, mix(color0, color1, 2, 1), mix(color0, color1, 1, 2)]
    } else {
        [color0, color1, mix(color0, color1, 1, 1), [0, 0, 0, 0]]
    };

    let indices = u32::from_le_bytes([source[4], source[5], source[6], source[7]]);
    let mut block = [[0u8; 4]; 16];
    for (i, texel) in block.iter_mut().enumerate() {
        *texel = palette[((indices >> (i * 2)) & 3) as usize];
    }
    block
}

/// BC2: 64 bits of explicit 4-bit alpha followed by a BC1 color block
fn decode_dxt3_block(source: &[u8]) -> Block {
    let mut block = decode_color_block(&source[8..16], false);
    let mut alpha_bits = [0u8; 8];
    alpha_bits.copy_from_slice(&source[0..8]);
    let alpha = u64::from_le_bytes(alpha_bits);
    for (i, texel) in block.iter_mut().enumerate() {
        let a = ((alpha >> (i * 4)) & 0xf) as u8;
        texel[3] = a | (a << 4);
    }
    block
}

/// BC3: two alpha endpoints, 48 bits of 3-bit alpha indices, then a BC1 color block
fn decode_dxt5_block(source: &[u8]) -> Block {
    let mut block = decode_color_block(&source[8..16], false);

    let a0 = source[0] as u32;
    let a1 = source[1] as u32;
    let mut alphas = [0u8; 8];
    alphas[0] = a0 as u8;
    alphas[1] = a1 as u8;
    if a0 > a1 {
        for i in 1..7u32 {
            alphas[i as usize + 1] = (((7 - i) * a0 + i * a1) / 7) as u8;
        }
    } else {
        for i in 1..5u32 {
            alphas[i as usize + 1] = (((5 - i) * a0 + i * a1) / 5) as u8;
        }
        alphas[6] = 0;
        alphas[7] = 255;
    }

    let mut index_bits = [0u8; 8];
    index_bits[..6].copy_from_slice(&source[2..8]);
    let indices = u64::from_le_bytes(index_bits);
    for (i, texel) in block.iter_mut().enumerate() {
        texel[3] = alphas[((indices >> (i * 3)) & 7) as usize];
    }
    block
}

/// ETC1 block (big-endian 64 bits): two sub-blocks with base colors and intensity tables
fn decode_etc1_block(source: &[u8]) -> Block {
    let high = u32::from_be_bytes([source[0], source[1], source[2], source[3]]);
    let low = u32::from_be_bytes([source[4], source[5], source[6], source[7]]);

    let differential = (high >> 1) & 1 == 1;
    let flipped = high & 1 == 1;
    let tables = [((high >> 5) & 7) as usize, ((high >> 2) & 7) as usize];

    let bases: [[i32; 3]; 2] = if differential {
        let expand = |v: u32| ((v << 3) | (v >> 2)) as i32;
        let delta = |v: u32| ((v as i32) << 29) >> 29;
        let r = (high >> 27) & 31;
        let g = (high >> 19) & 31;
        let b = (high >> 11) & 31;
        let r2 = (r as i32 + delta((high >> 24) & 7)) as u32 & 31;
        let g2 = (g as i32 + delta((high >> 16) & 7)) as u32 & 31;
        let b2 = (b as i32 + delta((high >> 8) & 7)) as u32 & 31;
        [
            [expand(r), expand(g), expand(b)],
            [expand(r2), expand(g2), expand(b2)],
        ]
    } else {
        let expand = |v: u32| (v * 17) as i32;
        [
            [expand((high >> 28) & 15), expand((high >> 20) & 15), expand((high >> 12) & 15)],
            [expand((high >> 24) & 15), expand((high >> 16) & 15), expand((high >> 8) & 15)],
        ]
    };

    let mut block = [[0u8; 4]; 16];
    for y in 0..4 {
        for x in 0..4 {
            let sub = if flipped { usize::from(y >= 2) } else { usize::from(x >= 2) };
            // Pixel indices are stored column-major
            let bit = x * 4 + y;
            let msb = (low >> (bit + 16)) & 1;
            let lsb = (low >> bit) & 1;
            let modifier = ETC1_MODIFIERS[tables[sub]][((msb << 1) | lsb) as usize];
            let base = bases[sub];
            block[y * 4 + x] = [
                (base[0] + modifier).clamp(0, 255) as u8,
                (base[1] + modifier).clamp(0, 255) as u8,
                (base[2] + modifier).clamp(0, 255) as u8,
                255,
            ];
        }
    }
    block
}

#[cfg(test)]
#[path = "decompress_tests.rs"]
mod tests;
