// src/reveal.rs
//! Decrypt Orchestrator: the only path that ever returns decrypted content
//!
//! `reveal` runs, short-circuiting on the first failure:
//! 1. fetch the live record (`InvalidId` / `NotFound`)
//! 2. if the record carries a key verifier, require a non-empty key
//!    (`MissingKey`) that passes the Key Guard (`IncorrectKey`)
//! 3. unencrypted payloads are returned unchanged
//! 4. otherwise decrypt through the Cipher Registry with the caller's key
//!
//! Failures never touch the record and are never retried here.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::aliases::{MessageKey, PlainText};
use crate::core::cipher::CipherRegistry;
use crate::core::key_guard;
use crate::core::message::{MessageId, MessageRecord, NewMessage};
use crate::enums::{CipherType, ContentKind};
use crate::error::CoreError;
use crate::logging::RedactedBytes;
use crate::store::MessageStore;
use crate::CoreResult as Result;

/// Plaintext released by a successful reveal
pub struct Revealed {
    pub id: MessageId,
    pub kind: ContentKind,
    pub content_type: Option<String>,
    pub plaintext: PlainText,
}

impl Revealed {
    pub fn bytes(&self) -> &[u8] {
        self.plaintext.expose_secret()
    }

    /// `None` for image content
    pub fn as_text(&self) -> Option<&str> {
        match self.kind {
            ContentKind::Text => std::str::from_utf8(self.bytes()).ok(),
            ContentKind::Image => None,
        }
    }
}

impl fmt::Debug for Revealed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Revealed")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("content_type", &self.content_type)
            .field("plaintext", &RedactedBytes(self.bytes()))
            .finish()
    }
}

/// Plaintext to be encrypted server-side and stored
pub struct SealRequest {
    pub plaintext: PlainText,
    pub cipher: CipherType,
    pub kind: ContentKind,
    pub content_type: Option<String>,
    pub key: Option<MessageKey>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl SealRequest {
    pub fn text(plaintext: impl Into<String>, cipher: CipherType, key: impl Into<String>) -> Self {
        Self {
            plaintext: PlainText::new(plaintext.into().into_bytes()),
            cipher,
            kind: ContentKind::Text,
            content_type: None,
            key: Some(MessageKey::new(key.into())),
            expires_at: None,
        }
    }

    pub fn image(bytes: Vec<u8>, content_type: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            plaintext: PlainText::new(bytes),
            cipher: CipherType::Aes,
            kind: ContentKind::Image,
            content_type: Some(content_type.into()),
            key: Some(MessageKey::new(key.into())),
            expires_at: None,
        }
    }
}

#[derive(Clone)]
pub struct Orchestrator {
    store: MessageStore,
    ciphers: Arc<CipherRegistry>,
}

impl Orchestrator {
    pub fn new(store: MessageStore, ciphers: Arc<CipherRegistry>) -> Self {
        Self { store, ciphers }
    }

    /// Store plus the default registry, sealing `aes` at the store's rounds
    pub fn with_default_ciphers(store: MessageStore) -> Self {
        let ciphers = CipherRegistry::with_defaults(store.options().aes_iterations);
        Self::new(store, Arc::new(ciphers))
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn ciphers(&self) -> &CipherRegistry {
        &self.ciphers
    }

    /// Verify `key` against the record and return its plaintext
    pub fn reveal(&self, id: &str, key: Option<&str>) -> Result<Revealed> {
        let record = self.store.fetch(id)?;
        self.reveal_record(record, key)
    }

    /// Steps 2 to 4 of `reveal` on a record already fetched live
    pub fn reveal_record(&self, record: MessageRecord, key: Option<&str>) -> Result<Revealed> {
        let key = key.filter(|key| !key.is_empty());

        if let Some(verifier) = &record.key_verifier {
            let candidate = key.ok_or(CoreError::MissingKey)?;
            let matches = key_guard::check(candidate, verifier)
                .map_err(|err| CoreError::CorruptRecord(err.to_string()))?;
            if !matches {
                warn!(id = %record.id, "incorrect key presented");
                return Err(CoreError::IncorrectKey);
            }
        }

        if !record.encrypted {
            debug!(id = %record.id, "revealed unencrypted message");
            return Ok(Revealed {
                id: record.id,
                kind: record.kind,
                content_type: record.content_type,
                plaintext: PlainText::new(record.payload),
            });
        }

        // Unprotected but encrypted: the cipher still needs a key
        let candidate = key.ok_or(CoreError::MissingKey)?;
        let plaintext = self
            .ciphers
            .decrypt(record.cipher, record.kind, &record.payload, candidate)?;
        debug!(id = %record.id, cipher = %record.cipher, "revealed message");

        Ok(Revealed {
            id: record.id,
            kind: record.kind,
            content_type: record.content_type,
            plaintext,
        })
    }

    /// Encrypt `req.plaintext` with its cipher and store the result
    pub fn seal(&self, req: SealRequest) -> Result<MessageId> {
        if req.plaintext.expose_secret().is_empty() {
            return Err(CoreError::EmptyPayload);
        }
        let key = req
            .key
            .as_ref()
            .map(|key| key.expose_secret().as_str())
            .filter(|key| !key.is_empty());

        let new = if req.cipher.requires_decryption() {
            let key = key.ok_or(CoreError::MissingKey)?;
            let payload = self
                .ciphers
                .encrypt(req.cipher, req.kind, req.plaintext.expose_secret(), key)?;
            NewMessage {
                payload,
                cipher: req.cipher,
                encrypted: true,
                kind: req.kind,
                content_type: req.content_type.clone(),
                key: Some(MessageKey::new(key.to_owned())),
                expires_at: req.expires_at,
            }
        } else {
            NewMessage {
                payload: req.plaintext.expose_secret().clone(),
                cipher: CipherType::None,
                encrypted: false,
                kind: req.kind,
                content_type: req.content_type.clone(),
                key: key.map(|key| MessageKey::new(key.to_owned())),
                expires_at: req.expires_at,
            }
        };

        self.store.create(new)
    }
}
