// src/config/defaults.rs
use std::path::PathBuf;

use crate::config::app::{Expiry, Features, Limits, Storage};
use crate::consts::{
    DEFAULT_MAX_CONCURRENT_DERIVATIONS, DEFAULT_MAX_PAYLOAD_BYTES, DEFAULT_SWEEP_INTERVAL_SECS,
    DEFAULT_TTL_SECS,
};

pub const DEFAULT_CONFIG_FILE: &str = "cipherwall.toml";
pub const DEFAULT_DB_KEY: &str = "dev-cipherwall-db-password-2025";
pub const DEFAULT_DB_FILE: &str = "messages.db";

/// `<data_dir>/cipherwall/messages.db`, or the working directory when no data dir exists
pub fn default_db_path() -> String {
    dirs::data_dir()
        .map(|dir| dir.join("cipherwall"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DB_FILE)
        .to_string_lossy()
        .into_owned()
}

pub fn default_storage() -> Storage {
    Storage {
        db_path: default_db_path(),
        db_key: DEFAULT_DB_KEY.into(),
    }
}

pub fn default_expiry() -> Expiry {
    Expiry {
        ttl_secs: DEFAULT_TTL_SECS,
        sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
    }
}

pub fn default_limits() -> Limits {
    Limits {
        max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        max_concurrent_derivations: DEFAULT_MAX_CONCURRENT_DERIVATIONS,
    }
}

pub fn default_features() -> Features {
    Features {
        skip_kdf_slowdown: false,
    }
}
