/// Texture array descriptor
///
/// JSON document listing the layer images of an array plus optional sampling
/// parameters:
///
/// ```json
/// {
///     "layer": [ { "name": "grass.png" }, { "name": "rock.png" } ],
///     "filter": { "mode": "trilinear", "anisotropy": 4 },
///     "address": { "u": "wrap", "v": "clamp" },
///     "border": [0.0, 0.0, 0.0, 1.0],
///     "srgb": true,
///     "mipmap": true,
///     "quality": { "low": 2, "medium": 1, "high": 0 }
/// }
/// ```
///
/// Layer names without a directory are resolved relative to the descriptor.

use glam::Vec4;
use serde::Deserialize;
use crate::error::{Error, Result};
use crate::gpu::{AddressMode, FilterMode, SamplerParameters, TextureCoordinate};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LayerEntry {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FilterEntry {
    pub mode: Option<FilterMode>,
    pub anisotropy: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddressEntry {
    pub u: Option<AddressMode>,
    pub v: Option<AddressMode>,
    pub w: Option<AddressMode>,
}

/// Mips to skip per quality tier
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QualityEntry {
    pub low: Option<u32>,
    pub medium: Option<u32>,
    pub high: Option<u32>,
}

/// Parsed texture array descriptor
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TextureArrayDescriptor {
    #[serde(rename = "layer", default)]
    pub layers: Vec<LayerEntry>,
    pub filter: Option<FilterEntry>,
    pub address: Option<AddressEntry>,
    pub border: Option<[f32; 4]>,
    pub srgb: Option<bool>,
    pub mipmap: Option<bool>,
    pub quality: Option<QualityEntry>,
}

impl TextureArrayDescriptor {
    /// Parse a descriptor from raw bytes
    ///
    /// # Errors
    ///
    /// `InvalidDescriptor` for malformed JSON or an empty layer list.
    pub fn from_slice(source: &[u8]) -> Result<Self> {
        let descriptor: Self = serde_json::from_slice(source)
            .map_err(|e| Error::InvalidDescriptor(e.to_string()))?;
        if descriptor.layers.is_empty() {
            return Err(Error::InvalidDescriptor("no layer entries".to_string()));
        }
        Ok(descriptor)
    }

    /// Apply the sampling parameters present in the descriptor
    pub fn apply_sampler(&self, params: &mut SamplerParameters) {
        if let Some(filter) = &self.filter {
            if let Some(mode) = filter.mode {
                params.filter = mode;
            }
            if let Some(anisotropy) = filter.anisotropy {
                params.anisotropy = anisotropy;
            }
        }
        if let Some(address) = &self.address {
            let modes = [
                (TextureCoordinate::U, address.u),
                (TextureCoordinate::V, address.v),
                (TextureCoordinate::W, address.w),
            ];
            for (coord, mode) in modes {
                if let Some(mode) = mode {
                    params.set_address_mode(coord, mode);
                }
            }
        }
        if let Some(border) = self.border {
            params.border_color = Vec4::from_array(border);
        }
        if let Some(srgb) = self.srgb {
            params.srgb = srgb;
        }
    }

    /// Apply per-tier mip skip overrides
    pub fn apply_mips_to_skip(&self, table: &mut [u32; 3]) {
        if let Some(quality) = &self.quality {
            for (slot, value) in table.iter_mut().zip([quality.low, quality.medium, quality.high]) {
                if let Some(value) = value {
                    *slot = value;
                }
            }
        }
    }

    /// Requested mip count implied by the descriptor (Some(1) when mipmapping is off)
    pub fn requested_levels(&self) -> Option<u32> {
        match self.mipmap {
            Some(false) => Some(1),
            Some(true) => Some(0),
            None => None,
        }
    }
}

/// Resolve a layer name against the descriptor's own path
///
/// Bare file names live next to the descriptor; names with a directory are
/// kept as they are.
pub fn resolve_layer_name(descriptor_name: &str, layer_name: &str) -> String {
    let layer_name = layer_name.trim();
    if layer_name.contains(['/', '\\']) {
        return layer_name.to_string();
    }
    match descriptor_name.rfind(['/', '\\']) {
        Some(index) => format!("{}{}", &descriptor_name[..=index], layer_name),
        None => layer_name.to_string(),
    }
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
