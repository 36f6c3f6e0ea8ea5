use thiserror::Error;

/// Failures crossing the store's file boundary.
///
/// In-memory engine operations never error; only reading and writing the
/// persisted record can.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
