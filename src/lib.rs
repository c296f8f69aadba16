// src/lib.rs
//! cipherwall: an ephemeral, key-gated encrypted-message store
//!
//! Features:
//! - `aes` (AES Crypt v3) and `caesar` ciphers behind one registry
//! - PBKDF2 key verifiers: keys are checked, never stored
//! - Explicit `expires_at` per message, enforced on read and by a sweeper
//! - SQLCipher-encrypted storage

pub mod aliases;
pub mod api;
pub mod auth;
pub mod config;
pub mod consts;
pub mod core;
pub mod db;
pub mod enums;
pub mod error;
pub mod logging;
pub mod reveal;
pub mod service;
pub mod store;

// Re-export everything users need at the crate root
pub use aliases::{MessageKey, PlainText};
pub use config::load as load_config;
pub use crate::core::{CipherRegistry, MessageId, MessageRecord, NewMessage};
pub use enums::{CipherType, ContentKind};
pub use error::CoreError;
pub use reveal::{Orchestrator, Revealed, SealRequest};
pub use service::{SweeperHandle, VaultService};
pub use store::{MessageStore, StoreOptions};

pub type CoreResult<T> = std::result::Result<T, CoreError>;
