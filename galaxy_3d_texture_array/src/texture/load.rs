/// Two-phase load context
///
/// `LoadContext::parse` is the worker-thread half of a texture array load:
/// it parses the descriptor, resolves every layer image through the cache and
/// registers them as dependencies. The context is then handed to the thread
/// owning the GPU context, which consumes it in `TextureArray::finalize_load`.

use std::sync::Arc;
use crate::error::Result;
use crate::image::Image;
use crate::resource::ResourceCache;
use crate::texture::descriptor::{resolve_layer_name, TextureArrayDescriptor};

/// Progress of a texture array load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    /// Nothing parsed yet
    #[default]
    Empty,
    /// Descriptor parsed, layer images requested
    DescriptorParsed,
    /// Layer images are being prepared ahead of upload (mip chains derived)
    Prefetching,
    /// Layers uploaded, the context has been consumed
    Finalized,
}

/// How a load is driven
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Both phases run back to back on the calling thread
    #[default]
    Synchronous,
    /// The first phase runs on a worker thread; mip chains are precalculated there
    Asynchronous,
}

/// One layer image requested by a descriptor
#[derive(Debug, Clone)]
pub struct LayerImage {
    /// Resolved cache name
    pub name: String,
    /// Decoded image, None if the cache could not provide it
    pub image: Option<Arc<Image>>,
}

/// State carried from the parse phase to the finalize phase
#[derive(Debug, Clone)]
pub struct LoadContext {
    phase: LoadPhase,
    descriptor: TextureArrayDescriptor,
    layers: Vec<LayerImage>,
}

impl LoadContext {
    /// Parse a descriptor and resolve its layer images
    ///
    /// `owner` is the name of the texture array being loaded; it anchors
    /// relative layer names and owns the registered dependencies.
    pub fn parse(
        owner: &str,
        source: &[u8],
        cache: &dyn ResourceCache,
        mode: LoadMode,
    ) -> Result<Self> {
        let descriptor = TextureArrayDescriptor::from_slice(source)?;

        let mut layers = Vec::with_capacity(descriptor.layers.len());
        for entry in &descriptor.layers {
            let name = resolve_layer_name(owner, &entry.name);
            cache.store_dependency(owner, &name);
            let image = cache.resolve_image(&name);
            layers.push(LayerImage { name, image });
        }

        let mut context = Self {
            phase: LoadPhase::DescriptorParsed,
            descriptor,
            layers,
        };
        if mode == LoadMode::Asynchronous {
            context.prefetch();
        }
        Ok(context)
    }

    /// Derive the mip chains of every resolved layer image
    pub fn prefetch(&mut self) {
        self.phase = LoadPhase::Prefetching;
        for image in self.layers.iter().filter_map(|layer| layer.image.as_ref()) {
            image.precalculate_levels();
        }
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn descriptor(&self) -> &TextureArrayDescriptor {
        &self.descriptor
    }

    pub fn layers(&self) -> &[LayerImage] {
        &self.layers
    }
}

#[cfg(test)]
#[path = "load_tests.rs"]
mod tests;
