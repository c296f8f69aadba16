//! tests/config_tests.rs

use std::collections::HashMap;
use std::fs;
use std::time::Duration;

use cipherwall::config::{load_from, Config};
use cipherwall::consts::{
    FAST_AES_PAYLOAD_KDF_ITERATIONS, FAST_VERIFIER_KDF_ITERATIONS, MAX_TTL_SECS,
    VERIFIER_KDF_ITERATIONS,
};
use cipherwall::error::ConfigError;

fn write_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cipherwall.toml");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn partial_file_falls_back_to_defaults() {
    let (_dir, path) = write_config(
        r#"
        [expiry]
        ttl_secs = 120
        sweep_interval_secs = 5
        "#,
    );
    let config = load_from(&path).unwrap();
    assert_eq!(config.ttl(), Some(Duration::from_secs(120)));
    assert_eq!(config.sweep_interval(), Duration::from_secs(5));
    assert_eq!(config.limits.max_payload_bytes, 5 * 1024 * 1024);
    assert!(!config.features.skip_kdf_slowdown);
    assert!(config.auth.tokens.is_empty());
    assert!(config.storage.db_path.ends_with("messages.db"));
}

#[test]
fn full_file_is_honoured() {
    let (_dir, path) = write_config(
        r#"
        [storage]
        db_path = "/var/lib/cipherwall/msgs.db"
        db_key = "from-file"

        [limits]
        max_payload_bytes = 1024
        max_concurrent_derivations = 8

        [features]
        skip_kdf_slowdown = true

        [auth]
        tokens = ["alpha", "beta"]
        "#,
    );
    let config = load_from(&path).unwrap();
    assert_eq!(config.storage.db_path, "/var/lib/cipherwall/msgs.db");
    assert_eq!(config.storage.db_key, "from-file");
    assert_eq!(config.limits.max_concurrent_derivations, 8);
    assert_eq!(config.auth.tokens, vec!["alpha", "beta"]);

    let opts = config.store_options();
    assert_eq!(opts.max_payload_bytes, 1024);
    assert_eq!(opts.verifier_iterations, FAST_VERIFIER_KDF_ITERATIONS);
    assert_eq!(opts.aes_iterations, FAST_AES_PAYLOAD_KDF_ITERATIONS);
}

#[test]
fn default_config_uses_full_strength_kdf() {
    let config = Config::default();
    config.validate().unwrap();
    assert_eq!(config.store_options().verifier_iterations, VERIFIER_KDF_ITERATIONS);
    assert_eq!(config.ttl(), Some(Duration::from_secs(3_600)));
}

#[test]
fn zero_ttl_disables_expiry() {
    let (_dir, path) = write_config(
        r#"
        [expiry]
        ttl_secs = 0
        sweep_interval_secs = 60
        "#,
    );
    let config = load_from(&path).unwrap();
    assert_eq!(config.ttl(), None);
    assert_eq!(config.store_options().ttl, None);
}

#[test]
fn environment_overrides_win() {
    let env: HashMap<&str, &str> = HashMap::from([
        ("CIPHERWALL_DB", "/tmp/override.db"),
        ("CIPHERWALL_DB_KEY", "env-key"),
        ("CIPHERWALL_TTL_SECS", " 90 "),
    ]);
    let config = Config::default()
        .with_overrides(|name| env.get(name).map(|v| v.to_string()))
        .unwrap();
    assert_eq!(config.storage.db_path, "/tmp/override.db");
    assert_eq!(config.storage.db_key, "env-key");
    assert_eq!(config.ttl(), Some(Duration::from_secs(90)));
}

#[test]
fn non_numeric_ttl_override_is_invalid() {
    let err = Config::default()
        .with_overrides(|name| (name == "CIPHERWALL_TTL_SECS").then(|| "an hour".to_string()))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { field: "expiry.ttl_secs", .. }));
}

#[test]
fn validation_rejects_unusable_values() {
    let (_dir, path) = write_config(
        r#"
        [storage]
        db_path = "x.db"
        db_key = ""
        "#,
    );
    let err = load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { field: "storage.db_key", .. }));

    let mut config = Config::default();
    config.limits.max_concurrent_derivations = 0;
    assert!(matches!(
        config.validate().unwrap_err(),
        ConfigError::Invalid { field: "limits.max_concurrent_derivations", .. }
    ));

    let mut config = Config::default();
    config.expiry.sweep_interval_secs = 0;
    assert!(config.validate().is_err());
}

#[test]
fn unreadable_and_malformed_files_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_from(dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));

    let (_dir, path) = write_config("[storage\ndb_path = ");
    let err = load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("cipherwall.toml"));
}

#[test]
fn unrepresentable_ttl_is_rejected() {
    let mut config = Config::default();
    config.expiry.ttl_secs = u64::MAX;
    assert!(matches!(
        config.validate().unwrap_err(),
        ConfigError::Invalid { field: "expiry.ttl_secs", .. }
    ));

    let err = Config::default()
        .with_overrides(|name| (name == "CIPHERWALL_TTL_SECS").then(|| u64::MAX.to_string()))
        .unwrap()
        .validate()
        .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { field: "expiry.ttl_secs", .. }));

    config.expiry.ttl_secs = MAX_TTL_SECS;
    config.validate().unwrap();
}
