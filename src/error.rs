//! Crate-level error types.

use std::fmt;

use crate::gpu::render_context::RenderContextError;

/// Errors produced by the mbox crate.
#[derive(Debug)]
pub enum MboxError {
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// Render target or pipeline setup failed at startup.
    InitializationFailure(String),
    /// A model matrix could not be inverted during decomposition.
    SingularTransform {
        /// Determinant of the rejected matrix.
        determinant: f32,
    },
    /// The object store reached its configured maximum.
    CapacityExceeded {
        /// Configured maximum number of slots.
        capacity: usize,
    },
    /// The picking render target could not be constructed.
    FramebufferIncomplete(String),
    /// The single-pixel picking readback failed.
    Readback(String),
    /// WGSL composition or validation failure.
    ShaderCompose(String),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Viewer event-loop failure.
    Viewer(String),
}

impl fmt::Display for MboxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::InitializationFailure(msg) => {
                write!(f, "initialization failed: {msg}")
            }
            Self::SingularTransform { determinant } => {
                write!(f, "singular transform (determinant {determinant})")
            }
            Self::CapacityExceeded { capacity } => {
                write!(f, "object store is full ({capacity} slots)")
            }
            Self::FramebufferIncomplete(msg) => {
                write!(f, "picking framebuffer incomplete: {msg}")
            }
            Self::Readback(msg) => write!(f, "picking readback failed: {msg}"),
            Self::ShaderCompose(msg) => {
                write!(f, "shader composition failed: {msg}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for MboxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for MboxError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<std::io::Error> for MboxError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
