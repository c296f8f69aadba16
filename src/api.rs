// src/api.rs
//! Transport-agnostic request/response shapes and their handlers
//!
//! Field names are camelCase on the wire. Binary payloads (AES Crypt
//! containers, images) travel as standard base64; text travels as-is.
//! `handle_*` functions are what a boundary adapter calls; every failure is
//! a typed `CoreError` that `ErrorBody::from` turns into a status + message.

use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aliases::MessageKey;
use crate::core::message::{MessageId, MessageRecord, NewMessage};
use crate::enums::{CipherType, ContentKind};
use crate::error::CoreError;
use crate::reveal::Revealed;
use crate::service::VaultService;
use crate::CoreResult as Result;

/// How a payload string is encoded on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PayloadEncoding {
    #[default]
    Utf8,
    Base64,
}

impl PayloadEncoding {
    pub fn decode(self, payload: &str) -> Result<Vec<u8>> {
        match self {
            PayloadEncoding::Utf8 => Ok(payload.as_bytes().to_vec()),
            PayloadEncoding::Base64 => STANDARD
                .decode(payload.trim())
                .map_err(|_| CoreError::InvalidRequest("payload is not valid base64")),
        }
    }

    /// Text goes out as-is when it is valid UTF-8; everything else as base64
    pub fn encode(as_text: bool, bytes: &[u8]) -> (String, PayloadEncoding) {
        match std::str::from_utf8(bytes) {
            Ok(text) if as_text => (text.to_owned(), PayloadEncoding::Utf8),
            _ => (STANDARD.encode(bytes), PayloadEncoding::Base64),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    pub payload: String,
    #[serde(default)]
    pub encoding: PayloadEncoding,
    /// Raw tag so an unknown cipher surfaces as `UnsupportedCipher`
    #[serde(default, alias = "type")]
    pub cipher_type: String,
    #[serde(default)]
    pub encrypted: bool,
    #[serde(default)]
    pub kind: ContentKind,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
}

impl CreateRequest {
    pub fn into_new_message(self) -> Result<NewMessage> {
        if self.payload.is_empty() {
            return Err(CoreError::EmptyPayload);
        }
        Ok(NewMessage {
            payload: self.encoding.decode(&self.payload)?,
            cipher: CipherType::from_str(&self.cipher_type)?,
            encrypted: self.encrypted,
            kind: self.kind,
            content_type: self.content_type,
            key: self.key.map(MessageKey::new),
            expires_at: None,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateResult {
    pub id: MessageId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchRequest {
    pub id: String,
}

/// Metadata plus the payload as stored, never decrypted
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResult {
    pub id: MessageId,
    pub encrypted: bool,
    pub cipher_type: CipherType,
    pub kind: ContentKind,
    pub content_type: Option<String>,
    /// Withheld for key-protected messages stored without encryption
    pub payload: Option<String>,
    pub encoding: PayloadEncoding,
    pub has_key: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<MessageRecord> for FetchResult {
    fn from(record: MessageRecord) -> Self {
        let has_key = record.has_key();
        let withhold = has_key && !record.encrypted;
        let (payload, encoding) = if withhold {
            (None, PayloadEncoding::default())
        } else {
            // AES Crypt containers are binary; caesar ciphertext stays readable
            let as_text = record.kind == ContentKind::Text && record.cipher != CipherType::Aes;
            let (payload, encoding) = PayloadEncoding::encode(as_text, &record.payload);
            (Some(payload), encoding)
        };
        FetchResult {
            id: record.id,
            encrypted: record.encrypted,
            cipher_type: record.cipher,
            kind: record.kind,
            content_type: record.content_type,
            payload,
            encoding,
            has_key,
            created_at: record.created_at,
            expires_at: record.expires_at,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct RevealRequest {
    pub id: String,
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealResult {
    pub id: MessageId,
    pub plaintext: String,
    pub encoding: PayloadEncoding,
    pub kind: ContentKind,
    pub content_type: Option<String>,
}

impl From<Revealed> for RevealResult {
    fn from(revealed: Revealed) -> Self {
        let as_text = revealed.kind == ContentKind::Text;
        let (plaintext, encoding) = PayloadEncoding::encode(as_text, revealed.bytes());
        RevealResult {
            id: revealed.id,
            plaintext,
            encoding,
            kind: revealed.kind,
            content_type: revealed.content_type.clone(),
        }
    }
}

/// Error payload for the transport layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: u16,
    pub error: String,
}

impl From<&CoreError> for ErrorBody {
    fn from(err: &CoreError) -> Self {
        let status = err.status_code();
        // Internal details stay in the logs
        let error = if status >= 500 {
            tracing::error!(error = %err, "request failed");
            match status {
                503 => "Service temporarily unavailable.".to_owned(),
                _ => "Internal error.".to_owned(),
            }
        } else {
            err.to_string()
        };
        ErrorBody { status, error }
    }
}

pub async fn handle_create(service: &VaultService, req: CreateRequest) -> Result<CreateResult> {
    let id = service.create(req.into_new_message()?).await?;
    Ok(CreateResult { id })
}

pub async fn handle_fetch(service: &VaultService, req: FetchRequest) -> Result<FetchResult> {
    Ok(service.fetch(req.id).await?.into())
}

pub async fn handle_reveal(service: &VaultService, req: RevealRequest) -> Result<RevealResult> {
    Ok(service.reveal(req.id, req.key).await?.into())
}
