/// Mock GPU context for unit tests (no GPU required)
///
/// Records every call as a string, stores texel data per texture object so
/// readback can be verified, and can simulate a lost device. All state lives
/// behind a shared handle so tests keep inspecting it after the context has
/// been moved into a `GraphicsDevice`.

use std::sync::{Arc, Mutex, MutexGuard};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use crate::error::{Error, Result};
use crate::gpu::{
    DeviceCaps, GpuContext, GpuFormat, PixelLayout, SamplerParameters, TextureHandle,
    UploadRegion,
};
use crate::image::CompressedFormat;

pub const MOCK_TEXTURE_UNITS: u32 = 8;

/// One allocated mip level (all layers)
#[derive(Debug, Clone)]
pub struct MockLevel {
    pub format: GpuFormat,
    pub width: u32,
    pub height: u32,
    pub layers: u32,
    pub data: Vec<u8>,
}

impl MockLevel {
    fn layer_size(&self) -> usize {
        self.format.data_size(self.width, self.height)
    }
}

/// Mock texture object
#[derive(Debug, Clone, Default)]
pub struct MockTextureObject {
    pub levels: FxHashMap<u32, MockLevel>,
    pub level_range: Option<(u32, u32)>,
    pub sampler: Option<SamplerParameters>,
}

/// Shared mock state
#[derive(Debug)]
pub struct MockGpuState {
    pub device_lost: bool,
    pub caps: DeviceCaps,
    pub supported_compressed: Vec<CompressedFormat>,
    pub textures: SlotMap<TextureHandle, MockTextureObject>,
    pub units: Vec<Option<TextureHandle>>,
    pub commands: Vec<String>,
    /// Make the next `allocate_level` call fail
    pub fail_next_allocation: bool,
}

impl MockGpuState {
    fn bound_object(&mut self) -> Result<&mut MockTextureObject> {
        let handle = self.units[0]
            .ok_or_else(|| Error::BackendError("no texture bound to unit 0".to_string()))?;
        self.textures
            .get_mut(handle)
            .ok_or_else(|| Error::BackendError("bound texture was deleted".to_string()))
    }

    fn bound_level(&mut self, level: u32) -> Result<&mut MockLevel> {
        self.bound_object()?
            .levels
            .get_mut(&level)
            .ok_or_else(|| Error::BackendError(format!("level {} not allocated", level)))
    }
}

/// Mock GPU context
#[derive(Debug, Clone)]
pub struct MockGpuContext {
    state: Arc<Mutex<MockGpuState>>,
}

impl MockGpuContext {
    /// Create a live mock device with every capability and every compressed format
    pub fn new() -> Self {
        Self::with_caps(DeviceCaps::all())
    }

    /// Create a live mock device with the given capabilities
    pub fn with_caps(caps: DeviceCaps) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockGpuState {
                device_lost: false,
                caps,
                supported_compressed: vec![
                    CompressedFormat::Dxt1,
                    CompressedFormat::Dxt3,
                    CompressedFormat::Dxt5,
                    CompressedFormat::Etc1,
                ],
                textures: SlotMap::with_key(),
                units: vec![None; MOCK_TEXTURE_UNITS as usize],
                commands: Vec::new(),
                fail_next_allocation: false,
            })),
        }
    }

    /// Shared handle on the mock state
    pub fn state(&self) -> Arc<Mutex<MockGpuState>> {
        Arc::clone(&self.state)
    }

    fn lock(&self) -> MutexGuard<'_, MockGpuState> {
        self.state.lock().unwrap()
    }
}

/// Convenience accessors used by tests
pub trait MockGpuStateExt {
    fn commands(&self) -> Vec<String>;
    fn clear_commands(&self);
    fn set_device_lost(&self, lost: bool);
    fn texture_count(&self) -> usize;
}

impl MockGpuStateExt for Arc<Mutex<MockGpuState>> {
    fn commands(&self) -> Vec<String> {
        self.lock().unwrap().commands.clone()
    }

    fn clear_commands(&self) {
        self.lock().unwrap().commands.clear();
    }

    /// Losing the device destroys every texture object, like a destroyed GL context
    fn set_device_lost(&self, lost: bool) {
        let mut state = self.lock().unwrap();
        state.device_lost = lost;
        if lost {
            state.textures.clear();
            state.units.iter_mut().for_each(|unit| *unit = None);
        }
    }

    fn texture_count(&self) -> usize {
        self.lock().unwrap().textures.len()
    }
}

impl GpuContext for MockGpuContext {
    fn is_device_lost(&self) -> bool {
        self.lock().device_lost
    }

    fn caps(&self) -> DeviceCaps {
        self.lock().caps
    }

    fn compressed_format(&self, format: CompressedFormat) -> Option<GpuFormat> {
        let state = self.lock();
        state
            .supported_compressed
            .contains(&format)
            .then(|| GpuFormat::from_compressed(format))
    }

    fn max_texture_units(&self) -> u32 {
        MOCK_TEXTURE_UNITS
    }

    fn generate_texture(&mut self) -> Result<TextureHandle> {
        let mut state = self.lock();
        state.commands.push("generate_texture".to_string());
        Ok(state.textures.insert(MockTextureObject::default()))
    }

    fn delete_texture(&mut self, handle: TextureHandle) {
        let mut state = self.lock();
        state.commands.push("delete_texture".to_string());
        state.textures.remove(handle);
    }

    fn bind_for_update(&mut self, handle: TextureHandle) {
        let mut state = self.lock();
        state.commands.push("bind_for_update".to_string());
        state.units[0] = Some(handle);
    }

    fn bound_texture(&self, unit: u32) -> Option<TextureHandle> {
        self.lock().units.get(unit as usize).copied().flatten()
    }

    fn unbind(&mut self, unit: u32) {
        let mut state = self.lock();
        state.commands.push(format!("unbind {}", unit));
        if let Some(slot) = state.units.get_mut(unit as usize) {
            *slot = None;
        }
    }

    fn allocate_level(
        &mut self,
        level: u32,
        format: GpuFormat,
        width: u32,
        height: u32,
        layers: u32,
    ) -> Result<()> {
        let mut state = self.lock();
        state.commands.push(format!(
            "allocate_level {} {:?} {}x{}x{}", level, format, width, height, layers
        ));
        if std::mem::take(&mut state.fail_next_allocation) {
            return Err(Error::OutOfMemory);
        }
        let size = format.data_size(width, height) * layers as usize;
        state.bound_object()?.levels.insert(level, MockLevel {
            format,
            width,
            height,
            layers,
            data: vec![0; size],
        });
        Ok(())
    }

    fn update_level(
        &mut self,
        level: u32,
        region: UploadRegion,
        layout: PixelLayout,
        data: &[u8],
    ) -> Result<()> {
        let mut state = self.lock();
        state.commands.push(format!(
            "update_level {} layer {} ({}, {}) {}x{}",
            level, region.layer, region.x, region.y, region.width, region.height
        ));
        let target = state.bound_level(level)?;
        let bpp = layout.bytes_per_pixel() as usize;
        let row_bytes = region.width as usize * bpp;
        if region.layer >= target.layers
            || region.x + region.width > target.width
            || region.y + region.height > target.height
            || data.len() < row_bytes * region.height as usize
        {
            return Err(Error::BackendError("update_level out of bounds".to_string()));
        }
        let layer_offset = region.layer as usize * target.layer_size();
        for row in 0..region.height as usize {
            let dst = layer_offset
                + ((region.y as usize + row) * target.width as usize + region.x as usize) * bpp;
            let src = row * row_bytes;
            target.data[dst..dst + row_bytes].copy_from_slice(&data[src..src + row_bytes]);
        }
        Ok(())
    }

    fn allocate_compressed_level(
        &mut self,
        level: u32,
        format: GpuFormat,
        width: u32,
        height: u32,
        layers: u32,
        size: usize,
    ) -> Result<()> {
        let mut state = self.lock();
        state.commands.push(format!(
            "allocate_compressed_level {} {:?} {}x{}x{}", level, format, width, height, layers
        ));
        state.bound_object()?.levels.insert(level, MockLevel {
            format,
            width,
            height,
            layers,
            data: vec![0; size],
        });
        Ok(())
    }

    fn update_compressed_level(
        &mut self,
        level: u32,
        region: UploadRegion,
        format: GpuFormat,
        data: &[u8],
    ) -> Result<()> {
        let mut state = self.lock();
        state.commands.push(format!(
            "update_compressed_level {} layer {} ({}, {}) {}x{}",
            level, region.layer, region.x, region.y, region.width, region.height
        ));
        let target = state.bound_level(level)?;
        let block = format
            .block_size()
            .ok_or_else(|| Error::BackendError("format is not compressed".to_string()))?
            as usize;
        let level_blocks_x = (target.width as usize).div_ceil(4);
        let blocks_x = (region.width as usize).div_ceil(4);
        let blocks_y = (region.height as usize).div_ceil(4);
        let row_bytes = blocks_x * block;
        if data.len() < row_bytes * blocks_y {
            return Err(Error::BackendError("compressed data too small".to_string()));
        }
        let layer_offset = region.layer as usize * target.layer_size();
        for row in 0..blocks_y {
            let dst = layer_offset
                + ((region.y as usize / 4 + row) * level_blocks_x + region.x as usize / 4) * block;
            let src = row * row_bytes;
            target.data[dst..dst + row_bytes].copy_from_slice(&data[src..src + row_bytes]);
        }
        Ok(())
    }

    fn set_level_range(&mut self, base_level: u32, max_level: u32) {
        let mut state = self.lock();
        state.commands.push(format!("set_level_range {} {}", base_level, max_level));
        if let Ok(object) = state.bound_object() {
            object.level_range = Some((base_level, max_level));
        }
    }

    fn apply_sampler(&mut self, params: &SamplerParameters, levels: u32) {
        let mut state = self.lock();
        state.commands.push(format!("apply_sampler {:?} levels {}", params.filter, levels));
        if let Ok(object) = state.bound_object() {
            object.sampler = Some(params.clone());
        }
    }

    fn read_level(&mut self, level: u32, _layout: PixelLayout, dest: &mut [u8]) -> Result<()> {
        let mut state = self.lock();
        state.commands.push(format!("read_level {}", level));
        let source = state.bound_level(level)?;
        if dest.len() < source.data.len() {
            return Err(Error::BackendError("readback destination too small".to_string()));
        }
        dest[..source.data.len()].copy_from_slice(&source.data);
        Ok(())
    }

    fn read_compressed_level(&mut self, level: u32, dest: &mut [u8]) -> Result<()> {
        let mut state = self.lock();
        state.commands.push(format!("read_compressed_level {}", level));
        let source = state.bound_level(level)?;
        if dest.len() < source.data.len() {
            return Err(Error::BackendError("readback destination too small".to_string()));
        }
        dest[..source.data.len()].copy_from_slice(&source.data);
        Ok(())
    }
}
