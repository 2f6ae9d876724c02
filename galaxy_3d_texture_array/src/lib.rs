/*!
# Galaxy 3D Texture Array

GPU-backed texture arrays for the Galaxy 3D engine: a single texture object
holding N equally sized layers, each with its own mip chain.

## Architecture

- **TextureArray**: the resource (sizing, layer uploads, readback, lifecycle)
- **GpuContext**: immediate-mode GPU API implemented by the backend
- **GraphicsDevice**: owns the context and forwards device loss / reset to GPU objects
- **ResourceCache**: resolves layer images, tracks dependencies, reloads resources
- **Format negotiation / MipChain**: pick the GPU format, skip and derive mip levels

Loading is two-phase: `begin_load` parses a JSON layer-list descriptor and
resolves the layer images (safe on a worker thread), `end_load` uploads them
on the thread owning the GPU context.
*/

// Internal modules
mod error;
pub mod log;
pub mod config;
pub mod gpu;
pub mod image;
pub mod resource;
pub mod texture;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Texture array resource
    pub use crate::texture::{TextureArray, TextureUsage};

    // Configuration
    pub use crate::config::{TextureArrayConfig, TextureQuality};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // GPU sub-module (context contract, device, formats, sampler state)
    pub mod gpu {
        pub use crate::gpu::*;
    }

    // Image sub-module
    pub mod image {
        pub use crate::image::*;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }

    // Texture sub-module
    pub mod texture {
        pub use crate::texture::*;
    }
}

// Re-export math library at crate root
pub use glam;
