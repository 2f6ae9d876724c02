/// GPU module - formats, sampler parameters, GPU context trait and device

// Module declarations
pub mod format;
pub mod sampler;
pub mod gpu_context;
pub mod device;

// Re-export everything
pub use format::*;
pub use sampler::*;
pub use gpu_context::*;
pub use device::*;

// Mock GPU context for tests (no GPU required)
#[cfg(test)]
pub mod mock_gpu_context;
