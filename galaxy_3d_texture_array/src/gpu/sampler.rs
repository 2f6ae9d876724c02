/// Sampler parameters applied to a GPU texture object

use glam::Vec4;
use serde::Deserialize;

/// Texture filtering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    Nearest,
    Bilinear,
    Trilinear,
    Anisotropic,
    /// Use the renderer-wide default
    Default,
}

/// Texture addressing mode for one coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressMode {
    Wrap,
    Mirror,
    Clamp,
    Border,
}

/// Texture coordinate selector for addressing modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureCoordinate {
    U,
    V,
    W,
}

/// Filtering, addressing and color-space parameters of a texture
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerParameters {
    pub filter: FilterMode,
    /// Addressing mode for U, V, W
    pub address: [AddressMode; 3],
    /// Border color used with `AddressMode::Border`
    pub border_color: Vec4,
    /// Max anisotropy (0 = renderer default)
    pub anisotropy: u32,
    /// Sample as sRGB (converted to linear on read)
    pub srgb: bool,
}

impl SamplerParameters {
    /// Addressing mode for one coordinate
    pub fn address_mode(&self, coord: TextureCoordinate) -> AddressMode {
        self.address[coord as usize]
    }

    /// Set the addressing mode for one coordinate
    pub fn set_address_mode(&mut self, coord: TextureCoordinate, mode: AddressMode) {
        self.address[coord as usize] = mode;
    }
}

impl Default for SamplerParameters {
    fn default() -> Self {
        Self {
            filter: FilterMode::Default,
            address: [AddressMode::Wrap; 3],
            border_color: Vec4::ZERO,
            anisotropy: 0,
            srgb: false,
        }
    }
}
