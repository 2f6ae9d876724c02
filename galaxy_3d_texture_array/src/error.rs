//! Error types for the Galaxy3D texture array
//!
//! This module defines the error types returned by every public texture array
//! entry point, plus the `engine_err!` / `engine_bail!` macros that log an
//! error through the engine log channel before handing it back.

use std::fmt;

/// Result type for Galaxy3D texture operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D texture errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error (GPU context, lock poisoning, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (texture, image, descriptor, etc.)
    InvalidResource(String),

    /// Initialization failed (device, subsystems)
    InitializationFailed(String),

    /// Zero or negative texture array size
    InvalidSize { width: i32, height: i32 },

    /// Depth-stencil usage requested for a texture array
    UnsupportedUsage,

    /// Layer count was never set before uploading data
    LayerCountNotSet,

    /// Layer index outside `0..layers`
    LayerOutOfRange { layer: u32, layers: u32 },

    /// Mip level outside `0..levels`
    LevelOutOfRange { level: u32, levels: u32 },

    /// A layer other than 0 was uploaded before layer 0 defined the size
    LayerZeroNotLoaded,

    /// Layer size or format differs from layer 0
    LayerMismatch { layer: u32 },

    /// The GPU object does not exist
    NotCreated,

    /// Empty source or destination buffer
    NullData,

    /// Destination rectangle lies outside the mip level
    InvalidRegion { x: i32, y: i32, width: i32, height: i32 },

    /// Readback requested for a layer other than 0
    UnsupportedReadback { layer: u32 },

    /// The device is lost and the operation cannot be deferred
    DeviceLost,

    /// Malformed layer-list descriptor
    InvalidDescriptor(String),

    /// A referenced image could not be resolved or decoded
    ImageLoadFailed(String),
}

impl Error {
    /// Log this error at ERROR severity under `source`, then return it
    ///
    /// Used by the texture code for typed errors, the same way `engine_bail!`
    /// is used for free-form ones.
    pub fn report(self, source: &str) -> Self {
        crate::engine_error!(source, "{}", self);
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::InvalidSize { width, height } => {
                write!(f, "Zero or negative texture array size ({}x{})", width, height)
            }
            Error::UnsupportedUsage => {
                write!(f, "Depth-stencil usage not supported for texture arrays")
            }
            Error::LayerCountNotSet => {
                write!(f, "Number of layers in the array must be set first")
            }
            Error::LayerOutOfRange { layer, layers } => {
                write!(f, "Illegal layer {} (array has {} layers)", layer, layers)
            }
            Error::LevelOutOfRange { level, levels } => {
                write!(f, "Illegal mip level {} (texture has {} levels)", level, levels)
            }
            Error::LayerZeroNotLoaded => write!(f, "Texture array layer 0 must be loaded first"),
            Error::LayerMismatch { layer } => {
                write!(f, "Texture array layer {} does not match size or format of layer 0", layer)
            }
            Error::NotCreated => write!(f, "Texture array not created"),
            Error::NullData => write!(f, "Null or empty pixel buffer"),
            Error::InvalidRegion { x, y, width, height } => {
                write!(f, "Illegal dimensions for setting data ({}, {}, {}x{})", x, y, width, height)
            }
            Error::UnsupportedReadback { layer } => {
                write!(f, "Only the full download of the array is supported, set layer=0 (got {})", layer)
            }
            Error::DeviceLost => write!(f, "Graphics device is lost"),
            Error::InvalidDescriptor(msg) => write!(f, "Invalid texture array descriptor: {}", msg),
            Error::ImageLoadFailed(msg) => write!(f, "Image load failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an ERROR message and build an `Error::BackendError` from it
///
/// # Example
///
/// ```no_run
/// # use galaxy_3d_texture_array::engine_err;
/// let err = engine_err!("galaxy3d::Device", "Context lock poisoned");
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::galaxy3d::Error::BackendError(message)
    }};
}

/// Log an ERROR message and return early with an `Error::BackendError`
///
/// # Example
///
/// ```no_run
/// # use galaxy_3d_texture_array::{engine_bail, galaxy3d::Result};
/// fn check(count: u32) -> Result<()> {
///     if count == 0 {
///         engine_bail!("galaxy3d::Device", "Object count must be positive");
///     }
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
