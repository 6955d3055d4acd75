use thiserror::Error;

#[derive(Debug, Error)]
pub enum InspectError {
    /// The process table could not be enumerated at all. Per-entry failures
    /// never produce this; they degrade to placeholder records instead.
    #[error("failed to enumerate processes: {0}")]
    SnapshotUnavailable(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
