// src/config/app.rs
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use serde::Deserialize;

use super::defaults::*;
use crate::consts::{
    AES_PAYLOAD_KDF_ITERATIONS, FAST_AES_PAYLOAD_KDF_ITERATIONS, FAST_VERIFIER_KDF_ITERATIONS,
    MAX_TTL_SECS, VERIFIER_KDF_ITERATIONS,
};
use crate::error::ConfigError;
use crate::store::StoreOptions;

pub const ENV_CONFIG: &str = "CIPHERWALL_CONFIG";
pub const ENV_DB_PATH: &str = "CIPHERWALL_DB";
pub const ENV_DB_KEY: &str = "CIPHERWALL_DB_KEY";
pub const ENV_TTL_SECS: &str = "CIPHERWALL_TTL_SECS";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_storage")]
    pub storage: Storage,
    #[serde(default = "default_expiry")]
    pub expiry: Expiry,
    #[serde(default = "default_limits")]
    pub limits: Limits,
    #[serde(default = "default_features")]
    pub features: Features,
    #[serde(default)]
    pub auth: Auth,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
    pub db_path: String,
    pub db_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Expiry {
    /// `0` disables expiry entirely
    pub ttl_secs: u64,
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Limits {
    pub max_payload_bytes: usize,
    pub max_concurrent_derivations: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Features {
    pub skip_kdf_slowdown: bool,
}

/// Bearer tokens accepted by the static provider; empty disables the gate
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Auth {
    #[serde(default)]
    pub tokens: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage: default_storage(),
            expiry: default_expiry(),
            limits: default_limits(),
            features: default_features(),
            auth: Auth::default(),
        }
    }
}

impl Config {
    /// Apply `CIPHERWALL_*` overrides using the given variable lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DB_PATH) {
            self.storage.db_path = path;
        }
        if let Some(key) = lookup(ENV_DB_KEY) {
            self.storage.db_key = key;
        }
        if let Some(raw) = lookup(ENV_TTL_SECS) {
            self.expiry.ttl_secs = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                field: "expiry.ttl_secs",
                reason: format!("{raw:?} is not a whole number of seconds"),
            })?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.db_key.is_empty() {
            return Err(ConfigError::Invalid {
                field: "storage.db_key",
                reason: "must not be empty".into(),
            });
        }
        if self.limits.max_payload_bytes == 0 {
            return Err(ConfigError::Invalid {
                field: "limits.max_payload_bytes",
                reason: "must be greater than zero".into(),
            });
        }
        if self.limits.max_concurrent_derivations == 0 {
            return Err(ConfigError::Invalid {
                field: "limits.max_concurrent_derivations",
                reason: "must be greater than zero".into(),
            });
        }
        if self.expiry.ttl_secs > MAX_TTL_SECS {
            return Err(ConfigError::Invalid {
                field: "expiry.ttl_secs",
                reason: format!("must be at most {MAX_TTL_SECS} seconds"),
            });
        }
        if self.expiry.sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "expiry.sweep_interval_secs",
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    pub fn ttl(&self) -> Option<Duration> {
        (self.expiry.ttl_secs > 0).then(|| Duration::from_secs(self.expiry.ttl_secs))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.expiry.sweep_interval_secs)
    }

    pub fn store_options(&self) -> StoreOptions {
        let (verifier_iterations, aes_iterations) = if self.features.skip_kdf_slowdown {
            (FAST_VERIFIER_KDF_ITERATIONS, FAST_AES_PAYLOAD_KDF_ITERATIONS)
        } else {
            (VERIFIER_KDF_ITERATIONS, AES_PAYLOAD_KDF_ITERATIONS)
        };
        StoreOptions {
            ttl: self.ttl(),
            max_payload_bytes: self.limits.max_payload_bytes,
            verifier_iterations,
            aes_iterations,
        }
    }
}

/// Parse and validate a TOML config file
pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let conf: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    conf.validate()?;
    Ok(conf)
}

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Load config once per process; falls back to defaults if the file is missing
pub fn load() -> Result<&'static Config, ConfigError> {
    if let Some(conf) = CONFIG.get() {
        return Ok(conf);
    }

    let config_path =
        std::env::var(ENV_CONFIG).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

    let conf = if Path::new(&config_path).exists() {
        load_from(&config_path)?
    } else {
        tracing::warn!(path = %config_path, "config file not found, using built-in defaults");
        Config::default()
    };

    let conf = conf.with_overrides(|name| std::env::var(name).ok())?;
    conf.validate()?;

    // A racing loader may have won; either value came from the same sources
    Ok(CONFIG.get_or_init(|| conf))
}
