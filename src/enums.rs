// src/enums.rs
//! Public enum types used throughout the crate
//!
//! Central location for the tags persisted alongside every message:
//! which cipher produced the payload and what kind of content it holds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Cipher applied to a stored payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum CipherType {
    /// AES Crypt v3 container keyed directly by the caller's passphrase
    Aes,
    /// Letter rotation keyed by an integer shift
    Caesar,
    /// Stored as-is
    #[default]
    None,
}

impl CipherType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CipherType::Aes => "aes",
            CipherType::Caesar => "caesar",
            CipherType::None => "none",
        }
    }

    /// Whether payloads tagged with this cipher must be decrypted before use
    pub fn requires_decryption(&self) -> bool {
        !matches!(self, CipherType::None)
    }
}

impl fmt::Display for CipherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CipherType {
    type Err = CoreError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "aes" => Ok(CipherType::Aes),
            "caesar" => Ok(CipherType::Caesar),
            "none" | "" => Ok(CipherType::None),
            other => Err(CoreError::UnsupportedCipher(other.to_owned())),
        }
    }
}

/// What the payload represents once revealed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// UTF-8 text
    #[default]
    Text,
    /// Raw image bytes (see `content_type` on the record)
    Image,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Image => "image",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = CoreError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "text" => Ok(ContentKind::Text),
            "image" => Ok(ContentKind::Image),
            _ => Err(CoreError::InvalidRequest("unknown content kind")),
        }
    }
}
