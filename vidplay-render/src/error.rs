//! Error types for the render stage.

use thiserror::Error;

/// Errors surfaced by the shader and material layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A shader stage failed to compile; the material stays dirty and the
    /// caller must render a blank frame instead of crashing.
    #[error("shader compile failed: {0}")]
    ShaderCompileFailed(String),

    /// Program link failed after both stages compiled.
    #[error("shader link failed: {0}")]
    ShaderLinkFailed(String),

    /// The material has no frame or no usable format.
    #[error("invalid material: {0}")]
    InvalidMaterial(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;
