//! Error types for the roadmap store and the reporting core.

use thiserror::Error;

/// Failures raised by the storage collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying file I/O failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The database file could not be encoded or decoded.
    #[error("Invalid database file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Epic {0} not found")]
    EpicNotFound(u64),

    #[error("Task {0} not found")]
    TaskNotFound(u64),

    /// A record failed validation (empty name, dangling epic reference).
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

/// Errors surfaced by the reporting core.
#[derive(Debug, Error)]
pub enum RoadmapError {
    /// The storage collaborator failed. Propagated unmodified, never retried.
    #[error("Storage failure: {0}")]
    Collaborator(#[from] StoreError),

    /// A status or priority value outside its enumeration.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A rendering collaborator could not produce its artifact.
    #[error("Render failure: {0}")]
    Render(String),
}

/// Result type for core operations.
pub type RoadmapResult<T> = Result<T, RoadmapError>;
