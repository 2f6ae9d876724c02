/// Decoded image value
///
/// An `Image` is what the external decoder produces: either uncompressed
/// texels (1 to 4 components of 8 bits) or a table of compressed levels.
/// Uncompressed images derive their mip chain lazily with `next_level`; the
/// chain can be precomputed once with `precalculate_levels`.

use std::sync::{Arc, OnceLock};
use crate::error::{Error, Result};
use crate::image::decompress;

/// Compressed block format of a source image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressedFormat {
    /// BC1, 8 bytes per 4x4 block, 1-bit alpha
    Dxt1,
    /// BC2, 16 bytes per block, explicit 4-bit alpha
    Dxt3,
    /// BC3, 16 bytes per block, interpolated alpha
    Dxt5,
    /// ETC1 RGB, 8 bytes per block
    Etc1,
}

impl CompressedFormat {
    /// Size of one 4x4 block in bytes
    pub fn block_size(self) -> u32 {
        match self {
            CompressedFormat::Dxt1 | CompressedFormat::Etc1 => 8,
            CompressedFormat::Dxt3 | CompressedFormat::Dxt5 => 16,
        }
    }
}

/// One level of a compressed image
#[derive(Debug, Clone)]
pub struct CompressedLevel {
    pub format: CompressedFormat,
    pub width: u32,
    pub height: u32,
    /// Bytes per block
    pub block_size: u32,
    /// Bytes per row of blocks
    pub row_size: u32,
    /// Rows of blocks
    pub rows: u32,
    pub data: Vec<u8>,
}

impl CompressedLevel {
    /// Decompress this level into RGBA8 texels
    ///
    /// `dest` must hold at least `width * height * 4` bytes.
    pub fn decompress(&self, dest: &mut [u8]) -> Result<()> {
        let size = self.width as usize * self.height as usize * 4;
        if dest.len() < size {
            return Err(Error::NullData);
        }
        decompress::decompress_level(self.format, &self.data, self.width, self.height, &mut dest[..size])
    }

    /// Byte size of the block data
    pub fn data_size(&self) -> usize {
        self.rows as usize * self.row_size as usize
    }
}

#[derive(Debug, Clone)]
struct CompressedData {
    format: CompressedFormat,
    levels: Vec<CompressedLevel>,
}

/// Decoded image
#[derive(Debug, Clone)]
pub struct Image {
    width: u32,
    height: u32,
    components: u32,
    data: Vec<u8>,
    compressed: Option<CompressedData>,
    next_level: OnceLock<Arc<Image>>,
}

impl Image {
    /// Create an uncompressed image from tightly packed 8-bit texels
    ///
    /// # Errors
    ///
    /// Returns `ImageLoadFailed` if a dimension is zero, the component count is
    /// outside 1..=4, or `data` does not hold exactly `width * height * components` bytes.
    pub fn from_pixels(width: u32, height: u32, components: u32, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::ImageLoadFailed(format!("zero image size {}x{}", width, height)));
        }
        if !(1..=4).contains(&components) {
            return Err(Error::ImageLoadFailed(format!("unsupported component count {}", components)));
        }
        let expected = width as usize * height as usize * components as usize;
        if data.len() != expected {
            return Err(Error::ImageLoadFailed(format!(
                "pixel buffer holds {} bytes, expected {}", data.len(), expected
            )));
        }
        Ok(Self {
            width,
            height,
            components,
            data,
            compressed: None,
            next_level: OnceLock::new(),
        })
    }

    /// Create a compressed image from its level table, largest level first
    ///
    /// Level `i` is `max(width >> i, 1)` x `max(height >> i, 1)`.
    pub fn from_compressed(
        format: CompressedFormat,
        width: u32,
        height: u32,
        levels: Vec<Vec<u8>>,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::ImageLoadFailed(format!("zero image size {}x{}", width, height)));
        }
        if levels.is_empty() {
            return Err(Error::ImageLoadFailed("compressed image has no levels".to_string()));
        }

        let block_size = format.block_size();
        let mut table = Vec::with_capacity(levels.len());
        for (index, data) in levels.into_iter().enumerate() {
            let level_width = (width >> index).max(1);
            let level_height = (height >> index).max(1);
            let row_size = level_width.div_ceil(4) * block_size;
            let rows = level_height.div_ceil(4);
            if data.len() != row_size as usize * rows as usize {
                return Err(Error::ImageLoadFailed(format!(
                    "compressed level {} holds {} bytes, expected {}",
                    index, data.len(), row_size as usize * rows as usize
                )));
            }
            table.push(CompressedLevel {
                format,
                width: level_width,
                height: level_height,
                block_size,
                row_size,
                rows,
                data,
            });
        }

        Ok(Self {
            width,
            height,
            components: 0,
            data: Vec::new(),
            compressed: Some(CompressedData { format, levels: table }),
            next_level: OnceLock::new(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Component count (0 for compressed images)
    pub fn components(&self) -> u32 {
        self.components
    }

    /// Uncompressed texels (empty for compressed images)
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed.is_some()
    }

    pub fn compressed_format(&self) -> Option<CompressedFormat> {
        self.compressed.as_ref().map(|c| c.format)
    }

    pub fn num_compressed_levels(&self) -> u32 {
        self.compressed.as_ref().map_or(0, |c| c.levels.len() as u32)
    }

    pub fn compressed_level(&self, index: u32) -> Option<&CompressedLevel> {
        self.compressed.as_ref()?.levels.get(index as usize)
    }

    /// Number of levels in this image's own chain
    ///
    /// Compressed images report their level table; uncompressed images the
    /// full chain down to 1x1.
    pub fn level_count(&self) -> u32 {
        match &self.compressed {
            Some(compressed) => compressed.levels.len() as u32,
            None => u32::BITS - self.width.max(self.height).leading_zeros(),
        }
    }

    /// Next mip level (half size, box filtered)
    ///
    /// Returns the precalculated level when available, otherwise derives a
    /// fresh one that is not retained.
    ///
    /// # Errors
    ///
    /// Compressed images carry their own level table and cannot derive levels.
    pub fn next_level(&self) -> Result<Arc<Image>> {
        if self.is_compressed() {
            return Err(Error::ImageLoadFailed(
                "can not derive mip levels of a compressed image".to_string()
            ));
        }
        Ok(match self.next_level.get() {
            Some(level) => Arc::clone(level),
            None => Arc::new(self.downsample()),
        })
    }

    /// Derive and retain the whole mip chain down to 1x1
    pub fn precalculate_levels(&self) {
        if self.is_compressed() || (self.width <= 1 && self.height <= 1) {
            return;
        }
        let mut current = Arc::clone(self.next_level.get_or_init(|| Arc::new(self.downsample())));
        while current.width > 1 || current.height > 1 {
            let next = Arc::clone(current.next_level.get_or_init(|| Arc::new(current.downsample())));
            current = next;
        }
    }

    /// Returns true if the next level has been precalculated
    pub fn has_precalculated_levels(&self) -> bool {
        self.next_level.get().is_some()
    }

    /// Convert to 4 components
    ///
    /// Luminance expands to RGB with opaque alpha; RGB gains an opaque alpha.
    pub fn convert_to_rgba(&self) -> Result<Image> {
        if self.is_compressed() {
            return Err(Error::ImageLoadFailed(
                "can not convert a compressed image to RGBA".to_string()
            ));
        }
        let pixel_count = self.width as usize * self.height as usize;
        let mut rgba = Vec::with_capacity(pixel_count * 4);
        for texel in self.data.chunks_exact(self.components as usize) {
            let pixel = match *texel {
                [l] => [l, l, l, 255],
                [l, a] => [l, l, l, a],
                [r, g, b] => [r, g, b, 255],
                [r, g, b, a] => [r, g, b, a],
                _ => unreachable!("component count validated at construction"),
            };
            rgba.extend_from_slice(&pixel);
        }
        Image::from_pixels(self.width, self.height, 4, rgba)
    }

    /// 2x2 box filter, clamping at the edges for odd or unit dimensions
    fn downsample(&self) -> Image {
        let components = self.components as usize;
        let width_out = (self.width / 2).max(1);
        let height_out = (self.height / 2).max(1);
        let src_width = self.width as usize;
        let max_x = self.width as usize - 1;
        let max_y = self.height as usize - 1;
        let mut data = vec![0u8; width_out as usize * height_out as usize * components];

        for y in 0..height_out as usize {
            let y0 = (y * 2).min(max_y);
            let y1 = (y * 2 + 1).min(max_y);
            for x in 0..width_out as usize {
                let x0 = (x * 2).min(max_x);
                let x1 = (x * 2 + 1).min(max_x);
                let dst = (y * width_out as usize + x) * components;
                for c in 0..components {
                    let sum = self.data[(y0 * src_width + x0) * components + c] as u32
                        + self.data[(y0 * src_width + x1) * components + c] as u32
                        + self.data[(y1 * src_width + x0) * components + c] as u32
                        + self.data[(y1 * src_width + x1) * components + c] as u32;
                    data[dst + c] = ((sum + 2) / 4) as u8;
                }
            }
        }

        Image {
            width: width_out,
            height: height_out,
            components: self.components,
            data,
            compressed: None,
            next_level: OnceLock::new(),
        }
    }
}

#[cfg(test)]
#[path = "image_tests.rs"]
mod tests;
