/// In-memory resource cache
///
/// Holds decoded images and raw resource files registered by the host,
/// dependency lists per owner, and per-resource memory use.

use std::sync::{Arc, Mutex, MutexGuard};
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use crate::image::Image;
use crate::resource::ResourceCache;
use crate::engine_debug;

#[derive(Default)]
struct CacheState {
    images: FxHashMap<String, Arc<Image>>,
    files: FxHashMap<String, Vec<u8>>,
    dependencies: FxHashMap<String, Vec<String>>,
    memory_use: FxHashMap<String, u64>,
    requested: Vec<String>,
    material_releases: u32,
}

/// In-memory resource cache
#[derive(Default)]
pub struct MemoryResourceCache {
    state: Mutex<CacheState>,
}

impl MemoryResourceCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a decoded image under a name
    pub fn add_image(&self, name: &str, image: Image) {
        self.lock().images.insert(name.to_string(), Arc::new(image));
    }

    /// Register a raw resource file under a name
    pub fn add_file(&self, name: &str, bytes: impl Into<Vec<u8>>) {
        self.lock().files.insert(name.to_string(), bytes.into());
    }

    /// Remove a raw resource file
    pub fn remove_file(&self, name: &str) -> bool {
        self.lock().files.remove(name).is_some()
    }

    /// Dependencies registered by `owner`, in registration order
    pub fn dependencies(&self, owner: &str) -> Vec<String> {
        self.lock().dependencies.get(owner).cloned().unwrap_or_default()
    }

    /// Image names requested through `resolve_image`, in request order
    pub fn requested_images(&self) -> Vec<String> {
        self.lock().requested.clone()
    }

    /// Memory use last reported for a resource
    pub fn memory_use(&self, name: &str) -> Option<u64> {
        self.lock().memory_use.get(name).copied()
    }

    /// Number of times unused materials were released
    pub fn material_release_count(&self) -> u32 {
        self.lock().material_releases
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ResourceCache for MemoryResourceCache {
    fn exists(&self, name: &str) -> bool {
        self.lock().files.contains_key(name)
    }

    fn read(&self, name: &str) -> Result<Vec<u8>> {
        self.lock()
            .files
            .get(name)
            .cloned()
            .ok_or_else(|| Error::InvalidResource(format!("resource '{}' not found", name)))
    }

    fn resolve_image(&self, name: &str) -> Option<Arc<Image>> {
        let mut state = self.lock();
        state.requested.push(name.to_string());
        state.images.get(name).cloned()
    }

    fn reset_dependencies(&self, owner: &str) {
        self.lock().dependencies.remove(owner);
    }

    fn store_dependency(&self, owner: &str, dependency: &str) {
        self.lock()
            .dependencies
            .entry(owner.to_string())
            .or_default()
            .push(dependency.to_string());
    }

    fn record_memory_use(&self, name: &str, bytes: u64) {
        self.lock().memory_use.insert(name.to_string(), bytes);
    }

    fn texture_memory_use(&self) -> u64 {
        self.lock().memory_use.values().sum()
    }

    fn release_unused_materials(&self) {
        let mut state = self.lock();
        state.material_releases += 1;
        engine_debug!("galaxy3d::ResourceCache", "Releasing unused materials");
    }
}

#[cfg(test)]
#[path = "memory_cache_tests.rs"]
mod tests;
