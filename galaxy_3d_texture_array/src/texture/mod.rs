//! Texture array module
//!
//! The texture array itself plus the pieces it is built from: format
//! negotiation, the mip chain builder, the GPU texture object, the load
//! context of the two-phase load and the render surface of render targets.

pub mod format_negotiator;
pub mod mip_chain;
pub mod gpu_texture;
pub mod render_surface;
pub mod descriptor;
pub mod load;
pub mod texture_array;
mod lifecycle;

pub use format_negotiator::{FormatPlan, QualityTierProvider};
pub use mip_chain::{MipChain, MipLevel};
pub use gpu_texture::GpuTexture;
pub use render_surface::{RenderSurface, RenderSurfaceQueue, SurfaceUpdateMode};
pub use descriptor::{resolve_layer_name, TextureArrayDescriptor};
pub use load::{LayerImage, LoadContext, LoadMode, LoadPhase};
pub use texture_array::{TextureArray, TextureUsage};
