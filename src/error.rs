//! Crate-level error types.

use std::fmt;

use crate::controller::ControllerError;
use crate::gpu::render_context::RenderContextError;

/// Errors produced by the nozzle crate.
#[derive(Debug)]
pub enum NozzleError {
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// The spray controller rejected an event.
    Controller(ControllerError),
    /// WGSL composition failure.
    Shader(String),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Viewer event-loop failure.
    Viewer(String),
}

impl fmt::Display for NozzleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::Controller(e) => write!(f, "controller error: {e}"),
            Self::Shader(msg) => write!(f, "shader error: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for NozzleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Controller(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Shader(_) | Self::OptionsParse(_) | Self::Viewer(_) => None,
        }
    }
}

impl From<RenderContextError> for NozzleError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<ControllerError> for NozzleError {
    fn from(e: ControllerError) -> Self {
        Self::Controller(e)
    }
}

impl From<std::io::Error> for NozzleError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
