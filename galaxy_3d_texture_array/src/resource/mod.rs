//! Resource management module
//!
//! Defines the contract between loadable resources and the resource cache
//! that resolves names, tracks dependencies and reloads resources.

mod memory_cache;

use std::sync::Arc;
use crate::error::Result;
use crate::image::Image;

pub use memory_cache::MemoryResourceCache;

/// A resource loaded in two phases
///
/// `begin_load` parses the source and may run on a worker thread;
/// `end_load` finalizes on the thread that owns the GPU context.
pub trait Resource: Send {
    /// Resource name (path inside the cache)
    fn name(&self) -> &str;

    /// Parse the source and request dependencies
    fn begin_load(&mut self, source: &[u8]) -> Result<()>;

    /// Finalize loading (GPU work happens here)
    fn end_load(&mut self) -> Result<()>;

    /// Estimated memory use in bytes
    fn memory_use(&self) -> u64;

    /// Load synchronously: `begin_load` followed by `end_load`
    fn load(&mut self, source: &[u8]) -> Result<()> {
        self.begin_load(source)?;
        self.end_load()
    }
}

/// Resource cache contract
///
/// Implementations use interior mutability; every method takes `&self` so a
/// cache can be shared between resources through an `Arc`.
pub trait ResourceCache: Send + Sync {
    /// Returns true if a resource with this name can be read
    fn exists(&self, name: &str) -> bool;

    /// Read the raw bytes of a resource
    fn read(&self, name: &str) -> Result<Vec<u8>>;

    /// Resolve an image by name, without blocking on decoding
    fn resolve_image(&self, name: &str) -> Option<Arc<Image>>;

    /// Forget every dependency registered by `owner`
    fn reset_dependencies(&self, owner: &str);

    /// Record that `owner` must be reloaded when `dependency` changes
    fn store_dependency(&self, owner: &str, dependency: &str);

    /// Reload a resource from its source
    ///
    /// Returns false if the source could not be read or the load failed.
    fn reload(&self, resource: &mut dyn Resource) -> bool {
        match self.read(resource.name()) {
            Ok(source) => resource.load(&source).is_ok(),
            Err(_) => false,
        }
    }

    /// Report the memory use of a resource
    fn record_memory_use(&self, _name: &str, _bytes: u64) {}

    /// Total memory used by textures known to the cache
    fn texture_memory_use(&self) -> u64 {
        0
    }

    /// Release materials nobody references, so their textures can be freed
    fn release_unused_materials(&self) {}
}
