/// Texture array lifecycle: descriptor loading and device-loss recovery

use crate::error::{Error, Result};
use crate::gpu::GpuObject;
use crate::resource::Resource;
use crate::texture::texture_array::SOURCE;
use crate::texture::{LoadContext, LoadMode, LoadPhase, TextureArray};
use crate::{engine_debug, engine_error, engine_info, engine_warn};

impl TextureArray {
    /// Parse a descriptor and resolve its layer images
    ///
    /// Safe to call away from the GPU thread: no GPU work happens here. On a
    /// lost device nothing is parsed and the array is marked data pending so
    /// the device reset reloads it.
    pub fn begin_load_with(&mut self, source: &[u8], mode: LoadMode) -> Result<()> {
        if let Some(device) = &self.device {
            if device.is_device_lost() {
                engine_warn!(SOURCE, "'{}' load while device is lost", self.name);
                self.data_pending = true;
                return Ok(());
            }
        }

        self.cache.reset_dependencies(&self.name);
        let context = LoadContext::parse(&self.name, source, self.cache.as_ref(), mode)
            .map_err(|e| e.report(SOURCE))?;
        if self.device.is_none() {
            engine_debug!(SOURCE, "'{}' is headless, descriptor retained without GPU work", self.name);
        }
        self.load_context = Some(context);
        Ok(())
    }

    /// Finalize a load with a context parsed elsewhere (usually on a worker thread)
    ///
    /// Applies the descriptor's parameters, sizes the array to the layer count
    /// and uploads every layer in order; the first failing layer aborts the
    /// load. Headless or on a lost device the context is kept for later.
    pub fn finalize_load(&mut self, context: LoadContext) -> Result<()> {
        let live = self.device.as_ref().is_some_and(|device| !device.is_device_lost());
        if !live {
            self.load_context = Some(context);
            return Ok(());
        }

        self.check_texture_budget();

        let descriptor = context.descriptor();
        descriptor.apply_sampler(self.gpu.sampler_mut());
        descriptor.apply_mips_to_skip(&mut self.config.mips_to_skip);
        if let Some(levels) = descriptor.requested_levels() {
            self.gpu.set_requested_levels(levels);
        }

        self.set_layer_count(context.layers().len() as u32);
        for (index, layer) in context.layers().iter().enumerate() {
            let image = layer.image.clone().ok_or_else(|| {
                Error::ImageLoadFailed(format!("layer image '{}' not available", layer.name))
                    .report(SOURCE)
            })?;
            self.set_image(index as u32, image, false)?;
        }

        self.load_phase = LoadPhase::Finalized;
        self.data_pending = false;
        self.data_lost = false;
        engine_info!(SOURCE, "Loaded '{}' ({} layers, {}x{}, {} levels)",
            self.name, self.layers(), self.width(), self.height(), self.levels());
        Ok(())
    }

    /// Ask the cache to free unused materials when over the texture budget
    fn check_texture_budget(&self) {
        let Some(budget) = self.config.texture_budget else {
            return;
        };
        let used = self.cache.texture_memory_use();
        if used > budget {
            engine_debug!(SOURCE, "Texture memory {} over budget {}, releasing unused materials", used, budget);
            self.cache.release_unused_materials();
        }
    }
}

impl Resource for TextureArray {
    fn name(&self) -> &str {
        &self.name
    }

    fn begin_load(&mut self, source: &[u8]) -> Result<()> {
        self.begin_load_with(source, LoadMode::Synchronous)
    }

    fn end_load(&mut self) -> Result<()> {
        match self.load_context.take() {
            Some(context) => self.finalize_load(context),
            None => Ok(()),
        }
    }

    fn memory_use(&self) -> u64 {
        self.memory_use
    }
}

impl GpuObject for TextureArray {
    fn create(&mut self) -> Result<()> {
        TextureArray::create(self)
    }

    fn release(&mut self) {
        TextureArray::release(self);
    }

    fn on_device_lost(&mut self) {
        // The destroyed context took the GPU name with it
        self.gpu.forget_handle();
        self.layer_zero_loaded = false;
        if let Some(surface) = &mut self.render_surface {
            surface.on_device_lost();
        }
    }

    fn on_device_reset(&mut self) {
        if let Some(surface) = &mut self.render_surface {
            surface.on_device_reset();
        }

        if !self.gpu.has_handle() || self.data_pending {
            // Reload through the cache when backed by a file, otherwise recreate empty
            if self.cache.exists(&self.name) {
                let cache = self.cache.clone();
                self.data_lost = !cache.reload(self);
            }
            if !self.gpu.has_handle() {
                if let Err(e) = TextureArray::create(self) {
                    engine_error!(SOURCE, "'{}' could not be recreated: {}", self.name, e);
                }
                self.data_lost = true;
            }
        }
        self.data_pending = false;
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
