//! Stored message records and their identifiers
//!
//! A record is written once by the store and never updated. Its id is an
//! opaque 24-character hex string: 4 bytes of big-endian creation seconds
//! followed by 8 random bytes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aliases::MessageKey;
use crate::consts::{MESSAGE_ID_LEN_BYTES, MESSAGE_ID_LEN_HEX};
use crate::core::cipher::aes::aescrypt_version;
use crate::core::key_guard::KeyVerifier;
use crate::enums::{CipherType, ContentKind};
use crate::error::CoreError;
use crate::CoreResult as Result;

/// Unique, immutable message identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId([u8; MESSAGE_ID_LEN_BYTES]);

impl MessageId {
    /// Fresh id anchored at `now`
    pub fn generate(now: DateTime<Utc>) -> Self {
        let mut raw = [0u8; MESSAGE_ID_LEN_BYTES];
        // Seconds wrap in 2106, same as the 32-bit ObjectId layout
        let secs = now.timestamp() as u32;
        raw[..4].copy_from_slice(&secs.to_be_bytes());
        let tail: [u8; MESSAGE_ID_LEN_BYTES - 4] = rand::random();
        raw[4..].copy_from_slice(&tail);
        Self(raw)
    }

    /// Accepts exactly 24 hex characters (either case)
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.len() != MESSAGE_ID_LEN_HEX || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidId(raw.to_owned()));
        }
        let mut bytes = [0u8; MESSAGE_ID_LEN_BYTES];
        hex::decode_to_slice(raw, &mut bytes).map_err(|_| CoreError::InvalidId(raw.to_owned()))?;
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for MessageId {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self> {
        Self::parse(raw)
    }
}

impl Serialize for MessageId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for MessageId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Everything the store persists for one message
#[derive(Debug, Clone)]
pub struct MessageRecord {
    pub id: MessageId,
    /// Cipher-text when `encrypted`, plaintext otherwise
    pub payload: Vec<u8>,
    pub cipher: CipherType,
    pub encrypted: bool,
    pub kind: ContentKind,
    /// MIME type for image payloads
    pub content_type: Option<String>,
    pub key_verifier: Option<KeyVerifier>,
    pub created_at: DateTime<Utc>,
    /// `None` means the record never expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl MessageRecord {
    pub fn has_key(&self) -> bool {
        self.key_verifier.is_some()
    }

    /// Expired iff `now >= expires_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}

/// Caller-supplied input to `MessageStore::create`
pub struct NewMessage {
    pub payload: Vec<u8>,
    pub cipher: CipherType,
    pub encrypted: bool,
    pub kind: ContentKind,
    pub content_type: Option<String>,
    /// Empty keys are treated as absent
    pub key: Option<MessageKey>,
    /// Overrides the store's default `created_at + ttl`
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewMessage {
    /// Text payload with no key, cipher `none`
    pub fn text(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into().into_bytes(),
            cipher: CipherType::None,
            encrypted: false,
            kind: ContentKind::Text,
            content_type: None,
            key: None,
            expires_at: None,
        }
    }

    /// Already-encrypted payload produced by `cipher`
    pub fn encrypted(payload: Vec<u8>, cipher: CipherType) -> Self {
        Self {
            payload,
            cipher,
            encrypted: true,
            kind: ContentKind::Text,
            content_type: None,
            key: None,
            expires_at: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(MessageKey::new(key.into()));
        self
    }

    pub fn with_image(mut self, content_type: impl Into<String>) -> Self {
        self.kind = ContentKind::Image;
        self.content_type = Some(content_type.into());
        self
    }

    pub fn expiring_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Checks the cipher/flag/kind combinations a record may hold
    pub fn validate(&self, max_payload_bytes: usize) -> Result<()> {
        if self.payload.is_empty() {
            return Err(CoreError::EmptyPayload);
        }
        if self.payload.len() > max_payload_bytes {
            return Err(CoreError::PayloadTooLarge {
                len: self.payload.len(),
                max: max_payload_bytes,
            });
        }
        if self.cipher.requires_decryption() && !self.encrypted {
            return Err(CoreError::InvalidRequest(
                "aes and caesar payloads must be flagged encrypted",
            ));
        }
        if !self.cipher.requires_decryption() && self.encrypted {
            return Err(CoreError::InvalidRequest(
                "encrypted payloads must name their cipher",
            ));
        }
        if self.cipher == CipherType::Aes && aescrypt_version(&self.payload) != Some(3) {
            return Err(CoreError::InvalidRequest(
                "aes payload is not an AES Crypt v3 container",
            ));
        }
        if self.cipher == CipherType::Caesar && self.kind != ContentKind::Text {
            return Err(CoreError::InvalidRequest("caesar only applies to text"));
        }
        let stored_as_text = !self.encrypted || self.cipher == CipherType::Caesar;
        if self.kind == ContentKind::Text
            && stored_as_text
            && std::str::from_utf8(&self.payload).is_err()
        {
            return Err(CoreError::InvalidRequest("text payload is not valid UTF-8"));
        }
        Ok(())
    }
}
