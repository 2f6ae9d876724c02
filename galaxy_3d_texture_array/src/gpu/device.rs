/// Graphics device - owns the GPU context and the list of GPU objects
///
/// GPU objects (texture arrays, and any other device-dependent resource)
/// register themselves here. When the host detects a device loss or reset it
/// calls `notify_device_lost` / `notify_device_reset` and the device walks its
/// object list directly, in registration order.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use slotmap::{new_key_type, SlotMap};
use crate::error::Result;
use crate::gpu::GpuContext;
use crate::{engine_debug, engine_err, engine_info};

new_key_type! {
    /// Registration key of a GPU object
    pub struct GpuObjectKey;
}

/// Capability set of every device-dependent object
pub trait GpuObject: Send {
    /// (Re)create the GPU-side object from the current CPU-side description
    fn create(&mut self) -> Result<()>;

    /// Destroy the GPU-side object
    fn release(&mut self);

    /// The GPU context was destroyed; GPU names are no longer valid
    fn on_device_lost(&mut self);

    /// The GPU context was recreated; restore content
    fn on_device_reset(&mut self);
}

/// Graphics device
pub struct GraphicsDevice {
    context: Mutex<Box<dyn GpuContext>>,
    objects: Mutex<SlotMap<GpuObjectKey, Weak<Mutex<dyn GpuObject>>>>,
}

impl GraphicsDevice {
    /// Create a device around a GPU context
    pub fn new<C: GpuContext + 'static>(context: C) -> Self {
        Self {
            context: Mutex::new(Box::new(context)),
            objects: Mutex::new(SlotMap::with_key()),
        }
    }

    /// Lock the GPU context
    ///
    /// Must not be called while the same thread already holds the context.
    pub fn context(&self) -> Result<MutexGuard<'_, Box<dyn GpuContext>>> {
        self.context
            .lock()
            .map_err(|_| engine_err!("galaxy3d::Device", "GPU context lock poisoned"))
    }

    /// Returns true while the device is lost
    ///
    /// A poisoned context is treated as lost.
    pub fn is_device_lost(&self) -> bool {
        self.context()
            .map(|context| context.is_device_lost())
            .unwrap_or(true)
    }

    /// Register a GPU object for device loss/reset notifications
    ///
    /// The device keeps a weak reference; dropping the object unregisters it
    /// implicitly.
    pub fn register<T: GpuObject + 'static>(&self, object: &Arc<Mutex<T>>) -> GpuObjectKey {
        let shared: Arc<Mutex<dyn GpuObject>> = object.clone();
        let mut objects = self.lock_objects();
        let key = objects.insert(Arc::downgrade(&shared));
        engine_debug!("galaxy3d::Device", "Registered GPU object ({} total)", objects.len());
        key
    }

    /// Remove a GPU object from the notification list
    ///
    /// Returns false if the key was not registered.
    pub fn unregister(&self, key: GpuObjectKey) -> bool {
        self.lock_objects().remove(key).is_some()
    }

    /// Number of registered objects that are still alive
    pub fn object_count(&self) -> usize {
        self.lock_objects()
            .values()
            .filter(|object| object.strong_count() > 0)
            .count()
    }

    /// Forward a device loss to every registered object
    pub fn notify_device_lost(&self) {
        let objects = self.live_objects();
        engine_info!("galaxy3d::Device", "Device lost, notifying {} GPU objects", objects.len());
        for object in objects {
            if let Ok(mut object) = object.lock() {
                object.on_device_lost();
            }
        }
    }

    /// Forward a device reset to every registered object
    pub fn notify_device_reset(&self) {
        let objects = self.live_objects();
        engine_info!("galaxy3d::Device", "Device reset, notifying {} GPU objects", objects.len());
        for object in objects {
            if let Ok(mut object) = object.lock() {
                object.on_device_reset();
            }
        }
    }

    /// Upgrade live objects and prune dead ones, releasing the list lock
    /// before any object is notified
    fn live_objects(&self) -> Vec<Arc<Mutex<dyn GpuObject>>> {
        let mut objects = self.lock_objects();
        objects.retain(|_, object| object.strong_count() > 0);
        objects.values().filter_map(Weak::upgrade).collect()
    }

    fn lock_objects(&self) -> MutexGuard<'_, SlotMap<GpuObjectKey, Weak<Mutex<dyn GpuObject>>>> {
        // The list holds only weak references, a poisoned guard is still usable
        self.objects.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
#[path = "device_tests.rs"]
mod tests;
