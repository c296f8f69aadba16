//! Cipher Registry: maps a `CipherType` tag to its encrypt/decrypt strategy
//!
//! Pure and stateless: no I/O, no key verification. Adding a cipher means
//! adding a `CipherType` variant and registering one strategy; callers never
//! branch on the tag themselves.

pub mod aes;
pub mod caesar;

use std::collections::HashMap;

use crate::aliases::PlainText;
use crate::consts::AES_PAYLOAD_KDF_ITERATIONS;
use crate::enums::{CipherType, ContentKind};
use crate::error::CoreError;
use crate::CoreResult as Result;

pub use aes::AesCipher;
pub use caesar::CaesarCipher;

/// One reversible transform keyed by the caller's secret
pub trait CipherStrategy: Send + Sync {
    fn encrypt(&self, plaintext: &[u8], key: &str) -> Result<Vec<u8>>;

    /// Must fail with `DecryptionFailed` rather than return garbage when the
    /// transform can tell the key is wrong
    fn decrypt(&self, payload: &[u8], key: &str) -> Result<Vec<u8>>;
}

/// Immutable once built; share behind an `Arc`
pub struct CipherRegistry {
    strategies: HashMap<CipherType, Box<dyn CipherStrategy>>,
}

impl CipherRegistry {
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// `aes` and `caesar`, with AES Crypt sealing at `aes_iterations` rounds
    pub fn with_defaults(aes_iterations: u32) -> Self {
        let mut registry = Self::empty();
        registry.register(CipherType::Aes, Box::new(AesCipher::new(aes_iterations)));
        registry.register(CipherType::Caesar, Box::new(CaesarCipher));
        registry
    }

    pub fn register(&mut self, cipher: CipherType, strategy: Box<dyn CipherStrategy>) {
        self.strategies.insert(cipher, strategy);
    }

    pub fn supports(&self, cipher: CipherType) -> bool {
        self.strategies.contains_key(&cipher)
    }

    fn strategy(&self, cipher: CipherType) -> Result<&dyn CipherStrategy> {
        self.strategies
            .get(&cipher)
            .map(Box::as_ref)
            .ok_or_else(|| CoreError::UnsupportedCipher(cipher.to_string()))
    }

    pub fn encrypt(
        &self,
        cipher: CipherType,
        kind: ContentKind,
        plaintext: &[u8],
        key: &str,
    ) -> Result<Vec<u8>> {
        if kind == ContentKind::Text && std::str::from_utf8(plaintext).is_err() {
            return Err(CoreError::InvalidRequest("text payload is not valid UTF-8"));
        }
        self.strategy(cipher)?.encrypt(plaintext, key)
    }

    /// Recover plaintext; text content must come back as valid UTF-8
    pub fn decrypt(
        &self,
        cipher: CipherType,
        kind: ContentKind,
        payload: &[u8],
        key: &str,
    ) -> Result<PlainText> {
        let plaintext = self.strategy(cipher)?.decrypt(payload, key)?;
        if kind == ContentKind::Text && std::str::from_utf8(&plaintext).is_err() {
            return Err(CoreError::DecryptionFailed);
        }
        Ok(PlainText::new(plaintext))
    }
}

impl Default for CipherRegistry {
    fn default() -> Self {
        Self::with_defaults(AES_PAYLOAD_KDF_ITERATIONS)
    }
}
