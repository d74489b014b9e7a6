use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A document produced no fragments that met the size floor. Recovered
    /// per-document during batch builds; never fatal to the batch.
    #[error("Document '{0}' yielded no usable fragments")]
    IngestionGap(String),

    /// A query was issued before an index was published. Callers must be able
    /// to tell this apart from a legitimate empty result.
    #[error("Index not built; publish an index before querying")]
    IndexNotBuilt,

    /// Publication is atomic and write-once; rebuilding means a new engine.
    #[error("Index already published")]
    AlreadyPublished,

    #[error("{channel} channel unavailable: {reason}")]
    ChannelUnavailable { channel: &'static str, reason: String },

    #[error("Snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
