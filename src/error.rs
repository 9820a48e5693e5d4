use thiserror::Error;

/// Errors that can occur while loading a scene, rendering, or writing images.
///
/// Geometric misses and degenerate vectors are not errors; they are ordinary
/// outcomes of the intersection and vector code.
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scene parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid scene: {0}")]
    InvalidScene(String),

    #[error("Render error: {0}")]
    Render(String),
}

/// Result type for fallible ray tracer operations.
pub type TraceResult<T> = Result<T, TraceError>;
