/// Texture array configuration
///
/// Holds the tunables a host application sets once for all texture arrays:
/// the mip-skip table per quality tier, the fallback quality when no quality
/// provider is attached, the texture memory budget and the sampler defaults.

use serde::Deserialize;
use crate::gpu::SamplerParameters;

/// Texture quality tier, used to index the mips-to-skip table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextureQuality {
    Low,
    Medium,
    High,
}

impl TextureQuality {
    /// Index into a per-quality table
    pub fn index(self) -> usize {
        match self {
            TextureQuality::Low => 0,
            TextureQuality::Medium => 1,
            TextureQuality::High => 2,
        }
    }
}

/// Texture array configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TextureArrayConfig {
    /// Highest-resolution mip levels discarded per quality tier (low, medium, high)
    pub mips_to_skip: [u32; 3],
    /// Quality used when no quality provider is attached
    pub default_quality: TextureQuality,
    /// Texture memory budget in bytes (None = unlimited)
    pub texture_budget: Option<u64>,
    /// Sampler parameters applied to newly created GPU objects
    #[serde(skip)]
    pub sampler: SamplerParameters,
}

impl TextureArrayConfig {
    /// Mip levels to skip for the given quality tier
    pub fn mips_to_skip(&self, quality: TextureQuality) -> u32 {
        self.mips_to_skip[quality.index()]
    }

    /// Parse a configuration from a JSON document
    ///
    /// Missing fields keep their default value.
    pub fn from_json(source: &str) -> crate::error::Result<Self> {
        serde_json::from_str(source).map_err(|e| {
            crate::engine_err!("galaxy3d::Config", "Invalid texture array config: {}", e)
        })
    }
}

impl Default for TextureArrayConfig {
    fn default() -> Self {
        Self {
            mips_to_skip: [2, 1, 0],
            default_quality: TextureQuality::High,
            texture_budget: None,
            sampler: SamplerParameters::default(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
