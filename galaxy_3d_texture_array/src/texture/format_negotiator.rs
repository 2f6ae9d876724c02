/// Format negotiation
///
/// Maps a source image (component count or compressed block format) and a
/// quality tier to the GPU format the texture array allocates, whether the
/// source must be converted or decompressed first, and how many of its
/// highest-resolution levels are discarded.

use crate::config::TextureQuality;
use crate::gpu::{DeviceCaps, GpuContext, GpuFormat};
use crate::image::Image;

/// Smallest width/height the top surviving mip may have after skipping
const MIN_SKIPPED_SIZE: u32 = 4;

/// Supplies the renderer's current texture quality tier
pub trait QualityTierProvider: Send + Sync {
    fn texture_quality(&self) -> TextureQuality;
}

/// Fixed quality tier
impl QualityTierProvider for TextureQuality {
    fn texture_quality(&self) -> TextureQuality {
        *self
    }
}

/// Result of negotiating a source image against the running device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatPlan {
    /// GPU format of the allocated texture (linear; sRGB is applied at allocation)
    pub format: GpuFormat,
    /// Leading levels to discard
    pub mips_to_skip: u32,
    /// Uncompressed source must be expanded to 4 components first
    pub convert_to_rgba: bool,
    /// Compressed levels must be decompressed to RGBA at upload time
    pub need_decompress: bool,
}

/// Returns true if a 1 or 2 channel image must be expanded to RGBA
///
/// Alpha-only single-channel data keeps its narrow format.
pub fn needs_rgba_conversion(components: u32, use_alpha: bool, caps: DeviceCaps) -> bool {
    !caps.contains(DeviceCaps::NARROW_CHANNEL_FORMATS)
        && ((components == 1 && !use_alpha) || components == 2)
}

/// Canonical GPU format for an uncompressed component count
///
/// # Panics
///
/// Component counts outside 1..=4 cannot come out of a decoded `Image`.
pub fn uncompressed_format(components: u32, use_alpha: bool) -> GpuFormat {
    match GpuFormat::from_components(components, use_alpha) {
        Some(format) => format,
        None => unreachable!("invalid image component count {}", components),
    }
}

/// Clamp a requested mip-skip count
///
/// Never skips past the image's own last level, and decrements until the top
/// surviving level is at least 4x4.
pub fn clamp_mips_to_skip(requested: u32, level_count: u32, width: u32, height: u32) -> u32 {
    let mut skip = requested.min(level_count.saturating_sub(1));
    while skip > 0 && ((width >> skip) < MIN_SKIPPED_SIZE || (height >> skip) < MIN_SKIPPED_SIZE) {
        skip -= 1;
    }
    skip
}

/// Negotiate the GPU format and skip count for an image
pub fn negotiate(
    image: &Image,
    use_alpha: bool,
    requested_skip: u32,
    context: &dyn GpuContext,
) -> FormatPlan {
    let mips_to_skip = clamp_mips_to_skip(
        requested_skip,
        image.level_count(),
        image.width(),
        image.height(),
    );

    match image.compressed_format() {
        Some(compressed) => {
            let native = context.compressed_format(compressed);
            FormatPlan {
                format: native.unwrap_or(GpuFormat::R8G8B8A8_UNORM),
                mips_to_skip,
                convert_to_rgba: false,
                need_decompress: native.is_none(),
            }
        }
        None => {
            let convert_to_rgba = needs_rgba_conversion(image.components(), use_alpha, context.caps());
            let components = if convert_to_rgba { 4 } else { image.components() };
            FormatPlan {
                format: uncompressed_format(components, use_alpha),
                mips_to_skip,
                convert_to_rgba,
                need_decompress: false,
            }
        }
    }
}

#[cfg(test)]
#[path = "format_negotiator_tests.rs"]
mod tests;
