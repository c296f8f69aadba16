// src/error.rs
//! Public error type for the entire crate

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid message id: {0}")]
    InvalidId(String),

    /// Also returned for records whose `expires_at` has passed
    #[error("message not found")]
    NotFound,

    #[error("a key is required for this message")]
    MissingKey,

    #[error("incorrect key")]
    IncorrectKey,

    #[error("unsupported cipher type: {0}")]
    UnsupportedCipher(String),

    #[error("invalid key format: {0}")]
    InvalidKeyFormat(String),

    #[error("decryption failed")]
    DecryptionFailed,

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("no payload provided")]
    EmptyPayload,

    #[error("payload of {len} bytes exceeds the {max} byte limit")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("invalid request: {0}")]
    InvalidRequest(&'static str),

    #[error("stored record is corrupt: {0}")]
    CorruptRecord(String),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] rusqlite::Error),

    #[error("storage lock poisoned")]
    StoragePoisoned,

    #[error("service is shutting down")]
    ServiceClosed,

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl CoreError {
    /// Transport-level status for the boundary adapter
    pub fn status_code(&self) -> u16 {
        match self {
            CoreError::InvalidId(_)
            | CoreError::MissingKey
            | CoreError::UnsupportedCipher(_)
            | CoreError::InvalidKeyFormat(_)
            | CoreError::EmptyPayload
            | CoreError::InvalidRequest(_) => 400,
            CoreError::IncorrectKey => 403,
            CoreError::NotFound => 404,
            CoreError::PayloadTooLarge { .. } => 413,
            CoreError::DecryptionFailed => 422,
            CoreError::StorageUnavailable(_)
            | CoreError::StoragePoisoned
            | CoreError::ServiceClosed => 503,
            CoreError::EncryptionFailed(_) | CoreError::CorruptRecord(_) | CoreError::Task(_) => {
                500
            }
        }
    }

    /// Only storage-side faults are safe to retry; key and cipher failures never are
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CoreError::StorageUnavailable(_) | CoreError::StoragePoisoned | CoreError::ServiceClosed
        )
    }
}

/// Errors raised while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
