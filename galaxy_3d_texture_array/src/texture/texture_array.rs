/// Texture array - a single GPU texture holding N equally sized layers
///
/// Layer 0 defines the size and format of the whole array; every other layer
/// must match it. Layers are uploaded one level at a time from decoded
/// images (after format negotiation and mip skipping) or from raw regions.
/// Loading from a descriptor and device-loss recovery live in `lifecycle.rs`.

use std::mem;
use std::sync::{Arc, Mutex};
use crate::config::{TextureArrayConfig, TextureQuality};
use crate::error::{Error, Result};
use crate::gpu::{
    FilterMode, GpuContext, GpuFormat, GraphicsDevice, SamplerParameters, UploadRegion,
};
use crate::image::Image;
use crate::resource::ResourceCache;
use crate::texture::{
    format_negotiator, GpuTexture, LoadContext, LoadPhase, MipChain, QualityTierProvider,
    RenderSurface, RenderSurfaceQueue, SurfaceUpdateMode,
};
use crate::{engine_debug, engine_warn};

pub(super) const SOURCE: &str = "galaxy3d::TextureArray";

/// Texture usage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureUsage {
    /// Uploaded once, sampled many times
    #[default]
    Static,
    /// Updated frequently from the CPU
    Dynamic,
    /// Rendered into through a render surface
    RenderTarget,
    /// Not supported for texture arrays
    DepthStencil,
}

/// Texture array resource
pub struct TextureArray {
    pub(super) name: String,
    pub(super) device: Option<Arc<GraphicsDevice>>,
    pub(super) cache: Arc<dyn ResourceCache>,
    pub(super) quality: Option<Arc<dyn QualityTierProvider>>,
    pub(super) config: TextureArrayConfig,
    pub(super) gpu: GpuTexture,
    pub(super) usage: TextureUsage,
    /// Bytes uploaded per layer
    pub(super) layer_memory_use: Vec<u32>,
    /// Layer 0 was uploaded into the current GPU object
    pub(super) layer_zero_loaded: bool,
    pub(super) memory_use: u64,
    pub(super) render_surface: Option<RenderSurface>,
    pub(super) surface_updates: bool,
    pub(super) load_context: Option<LoadContext>,
    pub(super) load_phase: LoadPhase,
    /// Content must be re-supplied once the device is back
    pub(super) data_pending: bool,
    /// Content was lost with the device and could not be restored
    pub(super) data_lost: bool,
}

impl TextureArray {
    /// Create an empty texture array
    ///
    /// `device` is None when running headless: loads still parse descriptors,
    /// but no GPU work is ever issued.
    pub fn new(
        name: impl Into<String>,
        device: Option<Arc<GraphicsDevice>>,
        cache: Arc<dyn ResourceCache>,
        config: TextureArrayConfig,
    ) -> Self {
        let gpu = GpuTexture::new(config.sampler.clone());
        Self {
            name: name.into(),
            device,
            cache,
            quality: None,
            config,
            gpu,
            usage: TextureUsage::Static,
            layer_memory_use: Vec::new(),
            layer_zero_loaded: false,
            memory_use: 0,
            render_surface: None,
            surface_updates: false,
            load_context: None,
            load_phase: LoadPhase::Empty,
            data_pending: false,
            data_lost: false,
        }
    }

    /// Create a texture array and register it for device-loss notifications
    pub fn new_registered(
        name: impl Into<String>,
        device: Option<Arc<GraphicsDevice>>,
        cache: Arc<dyn ResourceCache>,
        config: TextureArrayConfig,
    ) -> Arc<Mutex<Self>> {
        let texture = Arc::new(Mutex::new(Self::new(name, device.clone(), cache, config)));
        if let Some(device) = device {
            device.register(&texture);
        }
        texture
    }

    /// Use a quality tier provider instead of the configured default quality
    pub fn with_quality_provider(mut self, provider: Arc<dyn QualityTierProvider>) -> Self {
        self.quality = Some(provider);
        self
    }

    pub fn set_quality_provider(&mut self, provider: Option<Arc<dyn QualityTierProvider>>) {
        self.quality = provider;
    }

    // ===== ACCESSORS =====

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.gpu.width()
    }

    pub fn height(&self) -> u32 {
        self.gpu.height()
    }

    pub fn layers(&self) -> u32 {
        self.gpu.layers()
    }

    pub fn format(&self) -> GpuFormat {
        self.gpu.format()
    }

    /// Mip levels of the current GPU object
    pub fn levels(&self) -> u32 {
        self.gpu.levels()
    }

    pub fn level_width(&self, level: u32) -> u32 {
        self.gpu.level_width(level)
    }

    pub fn level_height(&self, level: u32) -> u32 {
        self.gpu.level_height(level)
    }

    pub fn usage(&self) -> TextureUsage {
        self.usage
    }

    pub fn is_compressed(&self) -> bool {
        self.gpu.is_compressed()
    }

    pub fn has_gpu_object(&self) -> bool {
        self.gpu.has_handle()
    }

    pub fn gpu_texture(&self) -> &GpuTexture {
        &self.gpu
    }

    pub fn sampler(&self) -> &SamplerParameters {
        self.gpu.sampler()
    }

    pub fn memory_use(&self) -> u64 {
        self.memory_use
    }

    /// Bytes uploaded to one layer (0 if never uploaded)
    pub fn layer_memory_use(&self, layer: u32) -> u32 {
        self.layer_memory_use.get(layer as usize).copied().unwrap_or(0)
    }

    pub fn is_data_pending(&self) -> bool {
        self.data_pending
    }

    pub fn is_data_lost(&self) -> bool {
        self.data_lost
    }

    /// Acknowledge lost content (after the owner re-supplied it)
    pub fn clear_data_lost(&mut self) {
        self.data_lost = false;
    }

    pub fn render_surface(&self) -> Option<&RenderSurface> {
        self.render_surface.as_ref()
    }

    pub fn render_surface_mut(&mut self) -> Option<&mut RenderSurface> {
        self.render_surface.as_mut()
    }

    pub fn load_phase(&self) -> LoadPhase {
        self.load_context.as_ref().map_or(self.load_phase, |context| context.phase())
    }

    /// Quality tier used for mip skipping
    pub fn quality(&self) -> TextureQuality {
        self.quality
            .as_ref()
            .map_or(self.config.default_quality, |provider| provider.texture_quality())
    }

    // ===== CONFIGURATION =====

    /// Set the requested mip count (0 = full chain); applies on next create
    pub fn set_num_levels(&mut self, levels: u32) {
        self.gpu.set_requested_levels(levels);
    }

    /// Replace the sampler state, re-applying it to a live GPU object
    pub fn set_sampler(&mut self, params: SamplerParameters) -> Result<()> {
        *self.gpu.sampler_mut() = params;
        if !self.gpu.has_handle() {
            return Ok(());
        }
        let Some(device) = self.device.clone() else {
            return Ok(());
        };
        let mut context = device.context()?;
        if context.is_device_lost() {
            return Ok(());
        }
        self.gpu.apply_sampler(&mut **context)
    }

    /// Set size, format, usage and (when nonzero) the layer count, then create the GPU object
    ///
    /// # Errors
    ///
    /// `InvalidSize` for a zero or negative size and `UnsupportedUsage` for
    /// depth-stencil usage; in both cases nothing is changed.
    pub fn set_size(
        &mut self,
        layers: u32,
        width: i32,
        height: i32,
        format: GpuFormat,
        usage: TextureUsage,
    ) -> Result<()> {
        self.apply_size(layers, width, height, format, usage)?;
        self.create()
    }

    fn apply_size(
        &mut self,
        layers: u32,
        width: i32,
        height: i32,
        format: GpuFormat,
        usage: TextureUsage,
    ) -> Result<()> {
        if width <= 0 || height <= 0 {
            return Err(Error::InvalidSize { width, height }.report(SOURCE));
        }
        if usage == TextureUsage::DepthStencil {
            return Err(Error::UnsupportedUsage.report(SOURCE));
        }

        if let Some(mut surface) = self.render_surface.take() {
            surface.release();
        }
        self.usage = usage;
        if usage == TextureUsage::RenderTarget {
            self.render_surface = Some(RenderSurface::new());
            // Nearest filtering and no mipmaps by default
            self.gpu.sampler_mut().filter = FilterMode::Nearest;
            self.gpu.set_requested_levels(1);
        }
        self.surface_updates = usage == TextureUsage::RenderTarget;

        self.gpu.set_size(width as u32, height as u32, format);
        if layers > 0 {
            self.gpu.set_layers(layers);
        }
        self.layer_memory_use = vec![0; self.gpu.layers() as usize];
        self.layer_zero_loaded = false;
        Ok(())
    }

    /// Set the layer count; the GPU object is released and rebuilt by the next layer 0 upload
    pub fn set_layer_count(&mut self, layers: u32) {
        self.release();
        self.layer_zero_loaded = false;
        self.gpu.set_layers(layers);
        self.layer_memory_use.resize(layers as usize, 0);
    }

    // ===== GPU OBJECT =====

    /// (Re)create the GPU object from the current size and format
    ///
    /// Headless arrays have nothing to create. On a lost device creation is
    /// deferred to the device reset.
    pub fn create(&mut self) -> Result<()> {
        let Some(device) = self.device.clone() else {
            engine_debug!(SOURCE, "'{}' has no graphics device, GPU object not created", self.name);
            return Ok(());
        };
        let mut context = device.context()?;
        self.create_with(&mut **context)
    }

    pub(super) fn create_with(&mut self, context: &mut dyn GpuContext) -> Result<()> {
        self.release_with(context);
        self.gpu.create(context).map_err(|e| e.report(SOURCE))
    }

    /// Destroy the GPU object
    ///
    /// Unbinds the texture from every unit still sampling it and detaches the
    /// render surface. Calling it again, or without a device, does nothing.
    pub fn release(&mut self) {
        if !self.gpu.has_handle() {
            return;
        }
        let Some(device) = self.device.clone() else {
            return;
        };
        let context = device.context();
        match context {
            Ok(mut context) => self.release_with(&mut **context),
            Err(_) => {
                self.gpu.forget_handle();
                self.layer_zero_loaded = false;
                if let Some(surface) = &mut self.render_surface {
                    surface.release();
                }
            }
        }
    }

    fn release_with(&mut self, context: &mut dyn GpuContext) {
        if !self.gpu.has_handle() {
            return;
        }
        self.gpu.release(context);
        self.layer_zero_loaded = false;
        if let Some(surface) = &mut self.render_surface {
            surface.release();
        }
    }

    // ===== LAYER UPLOAD =====

    /// Upload a rectangle of pixel data to one layer and mip level
    ///
    /// For compressed formats `x` and `y` are rounded down to the 4x4 block
    /// grid and `data` holds whole blocks. On a lost device the upload is
    /// dropped and the array is marked as data pending.
    #[allow(clippy::too_many_arguments)]
    pub fn set_data(
        &mut self,
        layer: u32,
        level: u32,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        data: &[u8],
    ) -> Result<()> {
        let Some(device) = self.device.clone() else {
            return Err(Error::NotCreated.report(SOURCE));
        };
        let mut context = device.context()?;
        self.write_region(&mut **context, layer, level, x, y, width, height, data)
    }

    #[allow(clippy::too_many_arguments)]
    fn write_region(
        &mut self,
        context: &mut dyn GpuContext,
        layer: u32,
        level: u32,
        mut x: i32,
        mut y: i32,
        width: i32,
        height: i32,
        data: &[u8],
    ) -> Result<()> {
        if !self.gpu.has_handle() {
            return Err(Error::NotCreated.report(SOURCE));
        }
        if data.is_empty() {
            return Err(Error::NullData.report(SOURCE));
        }
        let layers = self.gpu.layers();
        if layer >= layers {
            return Err(Error::LayerOutOfRange { layer, layers }.report(SOURCE));
        }
        let levels = self.gpu.levels();
        if level >= levels {
            return Err(Error::LevelOutOfRange { level, levels }.report(SOURCE));
        }
        if context.is_device_lost() {
            engine_warn!(SOURCE, "'{}' data assignment while device is lost", self.name);
            self.data_pending = true;
            return Ok(());
        }

        if self.gpu.is_compressed() {
            x &= !3;
            y &= !3;
        }
        // Widened so extreme offsets cannot overflow
        let level_width = i64::from(self.gpu.level_width(level));
        let level_height = i64::from(self.gpu.level_height(level));
        let (left, top, right, bottom) = (
            i64::from(x),
            i64::from(y),
            i64::from(x) + i64::from(width),
            i64::from(y) + i64::from(height),
        );
        if left < 0 || right > level_width || top < 0 || bottom > level_height || width <= 0 || height <= 0 {
            return Err(Error::InvalidRegion { x, y, width, height }.report(SOURCE));
        }

        let required = self.gpu.format().data_size(width as u32, height as u32);
        if data.len() < required {
            return Err(Error::InvalidResource(format!(
                "pixel buffer holds {} bytes, region needs {}", data.len(), required
            )).report(SOURCE));
        }

        let region = UploadRegion {
            x: x as u32,
            y: y as u32,
            layer,
            width: width as u32,
            height: height as u32,
        };
        self.gpu.write_region(context, level, region, data).map_err(|e| e.report(SOURCE))
    }

    /// Upload a decoded image to one layer
    ///
    /// Layer 0 (re)defines the array size and format from the image, after
    /// format negotiation and mip skipping; every other layer must match it.
    /// All mip levels are uploaded and the layer's memory use is recorded.
    pub fn set_image(&mut self, layer: u32, image: Arc<Image>, use_alpha: bool) -> Result<()> {
        let layers = self.gpu.layers();
        if layers == 0 {
            return Err(Error::LayerCountNotSet.report(SOURCE));
        }
        if layer >= layers {
            return Err(Error::LayerOutOfRange { layer, layers }.report(SOURCE));
        }
        let Some(device) = self.device.clone() else {
            engine_debug!(SOURCE, "'{}' has no graphics device, layer {} not uploaded", self.name, layer);
            return Ok(());
        };
        let mut guard = device.context()?;
        let context: &mut dyn GpuContext = &mut **guard;
        if context.is_device_lost() {
            engine_warn!(SOURCE, "'{}' layer {} assignment while device is lost", self.name, layer);
            self.data_pending = true;
            return Ok(());
        }

        let requested_skip = self.config.mips_to_skip(self.quality());
        let plan = format_negotiator::negotiate(&image, use_alpha, requested_skip, context);
        let compressed_source = image.is_compressed();
        let mut chain = MipChain::new(image, &plan)?;
        let top = chain.top_size();

        if layer == 0 {
            if let Some(remaining) = chain.remaining_levels() {
                self.gpu.set_requested_levels(remaining.max(1));
            } else if self.gpu.is_compressed() && self.gpu.requested_levels() > 1 {
                // Level count of the old compressed image may be too high for the new size
                self.gpu.set_requested_levels(0);
            }
            self.apply_size(0, top.x as i32, top.y as i32, plan.format, self.usage)?;
            self.create_with(context)?;
        } else {
            if !self.layer_zero_loaded || !self.gpu.has_handle() {
                return Err(Error::LayerZeroNotLoaded.report(SOURCE));
            }
            if top.x != self.gpu.width() || top.y != self.gpu.height() || plan.format != self.gpu.format() {
                return Err(Error::LayerMismatch { layer }.report(SOURCE));
            }
        }

        let levels = match chain.remaining_levels() {
            Some(remaining) => remaining.min(self.gpu.levels()),
            None => self.gpu.levels(),
        };
        let mut memory_use = 0u32;
        for (index, level) in chain.by_ref().take(levels as usize).enumerate() {
            let level = level?;
            self.write_region(
                context,
                layer,
                index as u32,
                0,
                0,
                level.size.x as i32,
                level.size.y as i32,
                level.data(),
            )?;
            memory_use += level.memory_use();
        }

        engine_debug!(SOURCE, "'{}' layer {}: {} levels, {} bytes ({})",
            self.name, layer, levels, memory_use,
            if compressed_source && plan.need_decompress { "decompressed" } else { "native" });

        if layer == 0 {
            self.layer_zero_loaded = true;
        }
        self.layer_memory_use[layer as usize] = memory_use;
        self.update_memory_use();
        Ok(())
    }

    /// Read back one mip level of the whole array into `dest`
    ///
    /// Only layer 0 is accepted; the read covers every layer, layer 0 first.
    pub fn get_data(&self, layer: u32, level: u32, dest: &mut [u8]) -> Result<()> {
        let Some(device) = self.device.clone() else {
            return Err(Error::NotCreated.report(SOURCE));
        };
        if !self.gpu.has_handle() {
            return Err(Error::NotCreated.report(SOURCE));
        }
        if dest.is_empty() {
            return Err(Error::NullData.report(SOURCE));
        }
        if layer != 0 {
            return Err(Error::UnsupportedReadback { layer }.report(SOURCE));
        }
        let levels = self.gpu.levels();
        if level >= levels {
            return Err(Error::LevelOutOfRange { level, levels }.report(SOURCE));
        }
        let required = self.gpu.level_data_size(level);
        if dest.len() < required {
            return Err(Error::InvalidResource(format!(
                "readback buffer holds {} bytes, level needs {}", dest.len(), required
            )).report(SOURCE));
        }

        let mut context = device.context()?;
        if context.is_device_lost() {
            engine_warn!(SOURCE, "'{}' data read while device is lost", self.name);
            return Err(Error::DeviceLost);
        }
        self.gpu.read_level(&mut **context, level, dest).map_err(|e| e.report(SOURCE))
    }

    // ===== MEMORY =====

    pub(super) fn update_memory_use(&mut self) {
        let counters = self.layer_memory_use.capacity() * mem::size_of::<u32>();
        let uploaded: u64 = self.layer_memory_use.iter().map(|&bytes| u64::from(bytes)).sum();
        self.memory_use = (mem::size_of::<TextureArray>() + counters) as u64 + uploaded;
        self.cache.record_memory_use(&self.name, self.memory_use);
    }

    // ===== RENDER SURFACE =====

    /// Queue the render surface for rendering when it updates every frame or an update was requested
    pub fn handle_render_surface_update(&mut self, queue: &mut dyn RenderSurfaceQueue) {
        if !self.surface_updates {
            return;
        }
        if let Some(surface) = &mut self.render_surface {
            if surface.update_mode() == SurfaceUpdateMode::UpdateAlways || surface.is_update_queued() {
                queue.queue_render_surface(&self.name, surface);
                surface.reset_update_queued();
            }
        }
    }
}

impl Drop for TextureArray {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
#[path = "texture_array_tests.rs"]
mod tests;
