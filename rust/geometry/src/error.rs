use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating a solid
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Invalid loop set: {0}")]
    InvalidLoopSet(String),

    #[error("Triangulation failed: {0}")]
    TriangulationFailure(String),

    #[error("Invalid edge treatment: {0}")]
    InvalidEdgeTreatment(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Interchange error: {0}")]
    Core(#[from] polyforge_core::Error),
}
