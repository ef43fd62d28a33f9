//! Error types
//!
//! Only platform and persistence failures are represented here. Numerical
//! faults inside the particle step are contained per particle and never
//! surface as errors.

/// Failures acquiring or driving the rendering surface. These are terminal
/// for the simulation loop.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Window, GL config, context or surface could not be created
    #[error("failed to acquire rendering context: {0}")]
    Context(String),

    /// A shader stage failed to compile
    #[error("shader compile error: {0}")]
    ShaderCompile(String),

    /// The shader program failed to link
    #[error("program link error: {0}")]
    ProgramLink(String),

    /// A GL buffer, vertex array or texture could not be allocated
    #[error("GL resource allocation failed: {0}")]
    Resource(String),

    /// femtovg canvas creation failed
    #[error("canvas error: {0}")]
    Canvas(String),
}

/// Failures reading or writing the settings file
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for rendering setup
pub type RenderResult<T> = std::result::Result<T, RenderError>;
