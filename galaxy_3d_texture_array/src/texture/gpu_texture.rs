/// GPU texture object of a texture array
///
/// Owns the opaque GPU handle together with the geometry and sampling state
/// it was created with. Every GPU-touching helper binds the handle to unit 0
/// for update and restores unit 0 to "no texture" before returning.

use crate::error::{Error, Result};
use crate::gpu::{DeviceCaps, GpuContext, GpuFormat, SamplerParameters, TextureHandle, UploadRegion};
use crate::{engine_debug, engine_warn};

const SOURCE: &str = "galaxy3d::TextureArray";

/// GPU-side state of a texture array
#[derive(Debug, Clone)]
pub struct GpuTexture {
    handle: Option<TextureHandle>,
    width: u32,
    height: u32,
    layers: u32,
    format: GpuFormat,
    /// Requested mip count, 0 = full chain
    requested_levels: u32,
    /// Mip count of the current GPU object
    levels: u32,
    sampler: SamplerParameters,
}

/// Full mip chain length for a size (bit length of the largest dimension)
pub fn full_chain_levels(width: u32, height: u32) -> u32 {
    u32::BITS - width.max(height).leading_zeros()
}

impl GpuTexture {
    pub fn new(sampler: SamplerParameters) -> Self {
        Self {
            handle: None,
            width: 0,
            height: 0,
            layers: 0,
            format: GpuFormat::R8G8B8A8_UNORM,
            requested_levels: 0,
            levels: 0,
            sampler,
        }
    }

    // ===== ACCESSORS =====

    pub fn handle(&self) -> Option<TextureHandle> {
        self.handle
    }

    pub fn has_handle(&self) -> bool {
        self.handle.is_some()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layers(&self) -> u32 {
        self.layers
    }

    pub fn format(&self) -> GpuFormat {
        self.format
    }

    pub fn levels(&self) -> u32 {
        self.levels
    }

    pub fn requested_levels(&self) -> u32 {
        self.requested_levels
    }

    pub fn sampler(&self) -> &SamplerParameters {
        &self.sampler
    }

    pub fn sampler_mut(&mut self) -> &mut SamplerParameters {
        &mut self.sampler
    }

    pub fn is_compressed(&self) -> bool {
        self.format.is_compressed()
    }

    pub fn set_size(&mut self, width: u32, height: u32, format: GpuFormat) {
        self.width = width;
        self.height = height;
        self.format = format;
    }

    pub fn set_layers(&mut self, layers: u32) {
        self.layers = layers;
    }

    /// Set the requested mip count (0 = full chain); applies on next create
    pub fn set_requested_levels(&mut self, levels: u32) {
        self.requested_levels = levels;
    }

    /// Width of a mip level (0 past the last level)
    pub fn level_width(&self, level: u32) -> u32 {
        if level >= self.levels.max(1) {
            return 0;
        }
        (self.width >> level).max(1)
    }

    /// Height of a mip level (0 past the last level)
    pub fn level_height(&self, level: u32) -> u32 {
        if level >= self.levels.max(1) {
            return 0;
        }
        (self.height >> level).max(1)
    }

    /// Byte size of one mip level of all layers
    pub fn level_data_size(&self, level: u32) -> usize {
        self.format.data_size(self.level_width(level), self.level_height(level)) * self.layers as usize
    }

    /// Format actually allocated on the device
    pub fn internal_format(&self, caps: DeviceCaps) -> GpuFormat {
        if self.sampler.srgb && caps.contains(DeviceCaps::SRGB_TEXTURES) {
            self.format.srgb()
        } else {
            self.format
        }
    }

    // ===== GPU OBJECT =====

    /// (Re)create the GPU object from the current geometry
    ///
    /// Releases any previous handle first. A lost device is not an error: the
    /// object is recreated on device reset.
    pub fn create(&mut self, context: &mut dyn GpuContext) -> Result<()> {
        self.release(context);

        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidSize { width: self.width as i32, height: self.height as i32 });
        }
        if self.layers == 0 {
            return Err(Error::LayerCountNotSet);
        }
        if context.is_device_lost() {
            engine_warn!(SOURCE, "Texture array creation while device is lost");
            return Ok(());
        }

        let handle = context.generate_texture()?;
        self.handle = Some(handle);
        context.bind_for_update(handle);

        // Compressed levels are allocated level by level on upload
        let allocation = if self.format.is_compressed() {
            Ok(())
        } else {
            let format = self.internal_format(context.caps());
            context.allocate_level(0, format, self.width, self.height, self.layers)
        };

        self.levels = if self.requested_levels > 0 {
            self.requested_levels
        } else {
            full_chain_levels(self.width, self.height)
        };
        context.set_level_range(0, self.levels - 1);
        context.apply_sampler(&self.sampler, self.levels);
        context.unbind(0);

        engine_debug!(SOURCE, "Created {}x{}x{} {:?} with {} levels",
            self.width, self.height, self.layers, self.format, self.levels);
        allocation
    }

    /// Delete the GPU object
    ///
    /// Units still sampling the handle are unbound first. On a lost device the
    /// handle is only forgotten.
    pub fn release(&mut self, context: &mut dyn GpuContext) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        if context.is_device_lost() {
            return;
        }
        for unit in 0..context.max_texture_units() {
            if context.bound_texture(unit) == Some(handle) {
                context.unbind(unit);
            }
        }
        context.delete_texture(handle);
    }

    /// Forget the handle without touching the device
    pub fn forget_handle(&mut self) {
        self.handle = None;
    }

    /// Run `f` with the handle bound to unit 0 for update
    pub fn with_bound<R>(
        &self,
        context: &mut dyn GpuContext,
        f: impl FnOnce(&mut dyn GpuContext) -> Result<R>,
    ) -> Result<R> {
        let handle = self.handle.ok_or(Error::NotCreated)?;
        context.bind_for_update(handle);
        let result = f(&mut *context);
        context.unbind(0);
        result
    }

    /// Write texels to a validated region of one layer and level
    ///
    /// A region covering the whole level of layer 0 (re)allocates the level
    /// for every layer before the update.
    pub fn write_region(
        &self,
        context: &mut dyn GpuContext,
        level: u32,
        region: UploadRegion,
        data: &[u8],
    ) -> Result<()> {
        let whole_level = region.x == 0
            && region.y == 0
            && region.width == self.level_width(level)
            && region.height == self.level_height(level)
            && region.layer == 0;
        let format = self.internal_format(context.caps());
        let layers = self.layers;

        self.with_bound(context, |context| {
            if !format.is_compressed() {
                if whole_level {
                    context.allocate_level(level, format, region.width, region.height, layers)?;
                }
                context.update_level(level, region, format.external_layout(), data)
            } else {
                if whole_level {
                    let size = format.data_size(region.width, region.height) * layers as usize;
                    context.allocate_compressed_level(
                        level, format, region.width, region.height, layers, size,
                    )?;
                }
                context.update_compressed_level(level, region, format, data)
            }
        })
    }

    /// Read back one level of every layer
    pub fn read_level(&self, context: &mut dyn GpuContext, level: u32, dest: &mut [u8]) -> Result<()> {
        let format = self.format;
        self.with_bound(context, |context| {
            if format.is_compressed() {
                context.read_compressed_level(level, dest)
            } else {
                context.read_level(level, format.external_layout(), dest)
            }
        })
    }

    /// Re-apply the sampler state to the live object
    pub fn apply_sampler(&self, context: &mut dyn GpuContext) -> Result<()> {
        let levels = self.levels;
        self.with_bound(context, |context| {
            context.apply_sampler(&self.sampler, levels);
            Ok(())
        })
    }
}

#[cfg(test)]
#[path = "gpu_texture_tests.rs"]
mod tests;
