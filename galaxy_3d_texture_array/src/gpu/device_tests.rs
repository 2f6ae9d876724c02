//! Unit tests for device.rs
//!
//! Uses MockGpuContext and a recording GpuObject (no GPU required).

use std::sync::{Arc, Mutex};
use crate::error::Result;
use crate::gpu::mock_gpu_context::{MockGpuContext, MockGpuStateExt};
use crate::gpu::{GpuObject, GraphicsDevice};

/// GPU object recording the notifications it receives
#[derive(Default)]
struct RecordingObject {
    events: Vec<&'static str>,
}

impl GpuObject for RecordingObject {
    fn create(&mut self) -> Result<()> {
        self.events.push("create");
        Ok(())
    }

    fn release(&mut self) {
        self.events.push("release");
    }

    fn on_device_lost(&mut self) {
        self.events.push("lost");
    }

    fn on_device_reset(&mut self) {
        self.events.push("reset");
    }
}

// ============================================================================
// CONTEXT ACCESS
// ============================================================================

#[test]
fn test_context_lock_and_device_lost() {
    let mock = MockGpuContext::new();
    let state = mock.state();
    let device = GraphicsDevice::new(mock);

    assert!(!device.is_device_lost());
    state.set_device_lost(true);
    assert!(device.is_device_lost());
    assert!(device.context().unwrap().is_device_lost());
}

// ============================================================================
// REGISTRATION
// ============================================================================

#[test]
fn test_register_and_unregister() {
    let device = GraphicsDevice::new(MockGpuContext::new());
    let object = Arc::new(Mutex::new(RecordingObject::default()));

    let key = device.register(&object);
    assert_eq!(device.object_count(), 1);

    assert!(device.unregister(key));
    assert!(!device.unregister(key));
    assert_eq!(device.object_count(), 0);
}

#[test]
fn test_dropped_object_is_not_counted() {
    let device = GraphicsDevice::new(MockGpuContext::new());
    let object = Arc::new(Mutex::new(RecordingObject::default()));
    device.register(&object);

    drop(object);
    assert_eq!(device.object_count(), 0);
    // Notifying with a dead entry must not panic
    device.notify_device_lost();
}

// ============================================================================
// NOTIFICATIONS
// ============================================================================

#[test]
fn test_notifications_reach_every_object_in_order() {
    let device = GraphicsDevice::new(MockGpuContext::new());
    let first = Arc::new(Mutex::new(RecordingObject::default()));
    let second = Arc::new(Mutex::new(RecordingObject::default()));
    device.register(&first);
    device.register(&second);

    device.notify_device_lost();
    device.notify_device_reset();

    assert_eq!(first.lock().unwrap().events, vec!["lost", "reset"]);
    assert_eq!(second.lock().unwrap().events, vec!["lost", "reset"]);
}

#[test]
fn test_object_may_lock_context_during_notification() {
    struct ContextUser {
        device: Arc<GraphicsDevice>,
        saw_lost: Option<bool>,
    }

    impl GpuObject for ContextUser {
        fn create(&mut self) -> Result<()> {
            Ok(())
        }
        fn release(&mut self) {}
        fn on_device_lost(&mut self) {}
        fn on_device_reset(&mut self) {
            self.saw_lost = Some(self.device.context().unwrap().is_device_lost());
        }
    }

    let device = Arc::new(GraphicsDevice::new(MockGpuContext::new()));
    let user = Arc::new(Mutex::new(ContextUser { device: Arc::clone(&device), saw_lost: None }));
    device.register(&user);

    device.notify_device_reset();

    assert_eq!(user.lock().unwrap().saw_lost, Some(false));
}
