use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClaimError {
    #[error("a walk attempt is already active")]
    AttemptAlreadyActive,

    #[error("no walk attempt is active")]
    NoActiveAttempt,

    #[error("node not found: {0:?}")]
    NodeNotFound(crate::core::types::NodeId),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("geolocation error: {0}")]
    Geolocation(#[from] GeolocationError),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("sync error: {0}")]
    Sync(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ClaimError>;

/// Geolocation failure modes, kept distinct so callers can present
/// different guidance per case.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location request timed out")]
    Timeout,

    #[error("position unavailable")]
    Unavailable,
}
