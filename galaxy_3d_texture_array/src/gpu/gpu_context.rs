/// GPU context trait - the immediate-mode GPU API used by texture objects
///
/// Every upload, allocation and readback call operates on the texture
/// currently bound to unit 0 (see `bind_for_update`). Callers restore unit 0
/// to "no texture" before returning.

use bitflags::bitflags;
use slotmap::new_key_type;
use crate::error::Result;
use crate::gpu::{GpuFormat, PixelLayout, SamplerParameters};
use crate::image::CompressedFormat;

new_key_type! {
    /// Opaque GPU texture object name
    pub struct TextureHandle;
}

bitflags! {
    /// Capabilities of the running GPU profile
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DeviceCaps: u32 {
        /// Luminance / luminance-alpha formats can be sampled natively
        const NARROW_CHANNEL_FORMATS = 1 << 0;
        /// sRGB internal formats are available
        const SRGB_TEXTURES = 1 << 1;
        /// Anisotropic filtering is available
        const ANISOTROPIC_FILTERING = 1 << 2;
    }
}

/// Destination of a sub-region upload (one layer, one level)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadRegion {
    pub x: u32,
    pub y: u32,
    pub layer: u32,
    pub width: u32,
    pub height: u32,
}

/// GPU context trait
///
/// Implemented by the backend that owns the GPU API. The texture array only
/// decides which calls to issue, with which parameters and in which order.
pub trait GpuContext: Send {
    /// Returns true while the device is lost (no GPU work possible)
    fn is_device_lost(&self) -> bool;

    /// Capabilities of the running GPU profile
    fn caps(&self) -> DeviceCaps;

    /// GPU format for a compressed block format, None if the device cannot sample it
    fn compressed_format(&self, format: CompressedFormat) -> Option<GpuFormat>;

    /// Number of texture units
    fn max_texture_units(&self) -> u32;

    /// Allocate a new texture object name
    fn generate_texture(&mut self) -> Result<TextureHandle>;

    /// Delete a texture object
    fn delete_texture(&mut self, handle: TextureHandle);

    /// Bind a texture to unit 0 for update
    fn bind_for_update(&mut self, handle: TextureHandle);

    /// Texture currently bound to a unit
    fn bound_texture(&self, unit: u32) -> Option<TextureHandle>;

    /// Bind "no texture" to a unit
    fn unbind(&mut self, unit: u32);

    /// Allocate storage for one mip level of every layer (null data)
    fn allocate_level(
        &mut self,
        level: u32,
        format: GpuFormat,
        width: u32,
        height: u32,
        layers: u32,
    ) -> Result<()>;

    /// Upload uncompressed texels to a sub-region of one layer
    fn update_level(
        &mut self,
        level: u32,
        region: UploadRegion,
        layout: PixelLayout,
        data: &[u8],
    ) -> Result<()>;

    /// Allocate storage for one compressed mip level of every layer
    fn allocate_compressed_level(
        &mut self,
        level: u32,
        format: GpuFormat,
        width: u32,
        height: u32,
        layers: u32,
        size: usize,
    ) -> Result<()>;

    /// Upload compressed blocks to a block-aligned sub-region of one layer
    fn update_compressed_level(
        &mut self,
        level: u32,
        region: UploadRegion,
        format: GpuFormat,
        data: &[u8],
    ) -> Result<()>;

    /// Set the valid mip range of the bound texture
    fn set_level_range(&mut self, base_level: u32, max_level: u32);

    /// Apply filtering / addressing parameters to the bound texture
    fn apply_sampler(&mut self, params: &SamplerParameters, levels: u32);

    /// Read back one uncompressed mip level of every layer
    fn read_level(&mut self, level: u32, layout: PixelLayout, dest: &mut [u8]) -> Result<()>;

    /// Read back one compressed mip level of every layer
    fn read_compressed_level(&mut self, level: u32, dest: &mut [u8]) -> Result<()>;
}
