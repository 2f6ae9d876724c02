/// GPU-resident pixel formats and the format-translation helpers shared by
/// every upload path (sRGB variant, external layout, data size).

use crate::image::CompressedFormat;

/// GPU-resident pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum GpuFormat {
    // Narrow-channel formats
    A8_UNORM,
    L8_UNORM,
    L8A8_UNORM,

    // Color formats
    R8G8B8_UNORM,
    R8G8B8_SRGB,
    R8G8B8A8_UNORM,
    R8G8B8A8_SRGB,

    // Block-compressed formats
    BC1_UNORM,
    BC1_SRGB,
    BC2_UNORM,
    BC2_SRGB,
    BC3_UNORM,
    BC3_SRGB,
    ETC1_RGB8,
}

/// Layout of pixel data on the CPU side of an upload or readback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelLayout {
    Alpha,
    Luminance,
    LuminanceAlpha,
    Rgb,
    Rgba,
    /// Opaque block data, sized by `GpuFormat::data_size`
    Compressed,
}

impl PixelLayout {
    /// Bytes per texel (0 for compressed block data)
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            PixelLayout::Alpha | PixelLayout::Luminance => 1,
            PixelLayout::LuminanceAlpha => 2,
            PixelLayout::Rgb => 3,
            PixelLayout::Rgba => 4,
            PixelLayout::Compressed => 0,
        }
    }
}

impl GpuFormat {
    /// Canonical uncompressed format for a component count
    ///
    /// Single-channel data maps to alpha or luminance depending on `use_alpha`.
    /// Returns None for component counts outside 1..=4.
    pub fn from_components(components: u32, use_alpha: bool) -> Option<Self> {
        match components {
            1 if use_alpha => Some(GpuFormat::A8_UNORM),
            1 => Some(GpuFormat::L8_UNORM),
            2 => Some(GpuFormat::L8A8_UNORM),
            3 => Some(GpuFormat::R8G8B8_UNORM),
            4 => Some(GpuFormat::R8G8B8A8_UNORM),
            _ => None,
        }
    }

    /// Native GPU format for a compressed block format
    ///
    /// Whether the running device can sample it is decided by the GPU context.
    pub fn from_compressed(format: CompressedFormat) -> Self {
        match format {
            CompressedFormat::Dxt1 => GpuFormat::BC1_UNORM,
            CompressedFormat::Dxt3 => GpuFormat::BC2_UNORM,
            CompressedFormat::Dxt5 => GpuFormat::BC3_UNORM,
            CompressedFormat::Etc1 => GpuFormat::ETC1_RGB8,
        }
    }

    /// Returns true for block-compressed formats
    pub fn is_compressed(self) -> bool {
        matches!(
            self,
            GpuFormat::BC1_UNORM
                | GpuFormat::BC1_SRGB
                | GpuFormat::BC2_UNORM
                | GpuFormat::BC2_SRGB
                | GpuFormat::BC3_UNORM
                | GpuFormat::BC3_SRGB
                | GpuFormat::ETC1_RGB8
        )
    }

    /// sRGB variant of this format, or the format itself when none exists
    pub fn srgb(self) -> Self {
        match self {
            GpuFormat::R8G8B8_UNORM => GpuFormat::R8G8B8_SRGB,
            GpuFormat::R8G8B8A8_UNORM => GpuFormat::R8G8B8A8_SRGB,
            GpuFormat::BC1_UNORM => GpuFormat::BC1_SRGB,
            GpuFormat::BC2_UNORM => GpuFormat::BC2_SRGB,
            GpuFormat::BC3_UNORM => GpuFormat::BC3_SRGB,
            other => other,
        }
    }

    /// CPU-side layout used when transferring data of this format
    pub fn external_layout(self) -> PixelLayout {
        match self {
            GpuFormat::A8_UNORM => PixelLayout::Alpha,
            GpuFormat::L8_UNORM => PixelLayout::Luminance,
            GpuFormat::L8A8_UNORM => PixelLayout::LuminanceAlpha,
            GpuFormat::R8G8B8_UNORM | GpuFormat::R8G8B8_SRGB => PixelLayout::Rgb,
            GpuFormat::R8G8B8A8_UNORM | GpuFormat::R8G8B8A8_SRGB => PixelLayout::Rgba,
            _ => PixelLayout::Compressed,
        }
    }

    /// Size of one 4x4 block in bytes (None for uncompressed formats)
    pub fn block_size(self) -> Option<u32> {
        match self {
            GpuFormat::BC1_UNORM | GpuFormat::BC1_SRGB | GpuFormat::ETC1_RGB8 => Some(8),
            GpuFormat::BC2_UNORM
            | GpuFormat::BC2_SRGB
            | GpuFormat::BC3_UNORM
            | GpuFormat::BC3_SRGB => Some(16),
            _ => None,
        }
    }

    /// Byte size of a `width` x `height` image of this format (one layer)
    pub fn data_size(self, width: u32, height: u32) -> usize {
        match self.block_size() {
            Some(block) => {
                let blocks_x = (width as usize).div_ceil(4);
                let blocks_y = (height as usize).div_ceil(4);
                blocks_x * blocks_y * block as usize
            }
            None => {
                width as usize * height as usize
                    * self.external_layout().bytes_per_pixel() as usize
            }
        }
    }
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
