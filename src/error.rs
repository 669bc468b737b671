use thiserror::Error;

pub type WaveResult<T> = Result<T, WaveError>;

#[derive(Debug, Error)]
pub enum WaveError {
    /// Two series cannot be merged because their channel key, sampling rate
    /// or dtype disagree. Never coerced, always reported.
    #[error("incompatible series: {reason}")]
    IncompatibleSeries { reason: String },

    /// Relational ordering between series is undefined.
    #[error("sample series have no relational ordering")]
    UnsupportedOrdering,

    /// Neither the cache nor the fetch service produced any samples for the
    /// requested window.
    #[error("no data available for {channel} in the requested window")]
    NoData { channel: String },

    /// A cached segment could not be decoded. The assembler treats this as a
    /// cache miss for that segment.
    #[error("corrupt cache segment {handle}: {detail}")]
    StorageCorruption { handle: String, detail: String },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("segment encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}
