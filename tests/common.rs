//! tests/common.rs
//! Shared test utilities: temp stores with a fast KDF and a manual clock
#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use cipherwall::core::ManualClock;
use cipherwall::{MessageStore, Orchestrator, StoreOptions, VaultService};
use tempfile::TempDir;

pub const TEST_DB_KEY: &str = "test-cipherwall-secret-2025";

/// Initialize test-friendly logging; only active with the `logging` feature
#[cfg(feature = "logging")]
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};
    tracing_subscriber::registry()
        .with(fmt::layer().with_test_writer())
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();
}

#[cfg(not(feature = "logging"))]
pub fn init_tracing() {}

/// Fixed starting instant for every manual clock
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
}

/// On-disk SQLCipher store in its own temp directory
pub struct TestStore {
    pub store: MessageStore,
    pub clock: ManualClock,
    dir: TempDir,
}

impl TestStore {
    pub fn new() -> Self {
        Self::with_options(StoreOptions::fast())
    }

    pub fn with_options(opts: StoreOptions) -> Self {
        init_tracing();
        let dir = tempfile::tempdir().expect("create temp dir");
        let clock = ManualClock::new(t0());
        let store = MessageStore::open(dir.path().join("messages.db"), TEST_DB_KEY, opts)
            .expect("open message db")
            .with_clock(clock.clone());
        Self { store, clock, dir }
    }

    pub fn db_path(&self) -> std::path::PathBuf {
        self.dir.path().join("messages.db")
    }

    pub fn orchestrator(&self) -> Orchestrator {
        Orchestrator::with_default_ciphers(self.store.clone())
    }

    pub fn service(&self, max_concurrent_derivations: usize) -> VaultService {
        VaultService::new(self.orchestrator(), max_concurrent_derivations)
    }
}

/// In-memory store for tests that don't care about SQLCipher
pub fn memory_store() -> (MessageStore, ManualClock) {
    init_tracing();
    let clock = ManualClock::new(t0());
    let store = MessageStore::open_in_memory(StoreOptions::fast())
        .expect("open in-memory db")
        .with_clock(clock.clone());
    (store, clock)
}
