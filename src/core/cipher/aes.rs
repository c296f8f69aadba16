//! `aes` strategy: AES Crypt v3 containers keyed by the caller's passphrase
//!
//! The container carries an HMAC, so a wrong key is reported as an error by
//! aescrypt-rs instead of yielding garbage. An empty plaintext is therefore
//! a legitimate result, not a failure signal.

use std::io::Cursor;

use aescrypt_rs::aliases::Password;
use aescrypt_rs::{decrypt, encrypt};

use super::CipherStrategy;
use crate::consts::AESCRYPT_V3_HEADER;
use crate::error::CoreError;
use crate::CoreResult as Result;

#[derive(Debug, Clone, Copy)]
pub struct AesCipher {
    iterations: u32,
}

impl AesCipher {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }
}

impl CipherStrategy for AesCipher {
    fn encrypt(&self, plaintext: &[u8], key: &str) -> Result<Vec<u8>> {
        let password = Password::new(key.to_owned());
        let mut out = Vec::new();
        encrypt(Cursor::new(plaintext), &mut out, &password, self.iterations)
            .map_err(|err| CoreError::EncryptionFailed(err.to_string()))?;
        Ok(out)
    }

    fn decrypt(&self, payload: &[u8], key: &str) -> Result<Vec<u8>> {
        let password = Password::new(key.to_owned());
        let mut out = Vec::new();
        decrypt(Cursor::new(payload), &mut out, &password).map_err(|err| {
            tracing::debug!(error = %err, "aes decrypt rejected payload");
            CoreError::DecryptionFailed
        })?;
        Ok(out)
    }
}

/// Check if data is an AES Crypt container (any version)
pub fn is_aescrypt_payload(data: &[u8]) -> bool {
    data.starts_with(b"AES")
}

/// Get AES Crypt version from header, if valid
pub fn aescrypt_version(data: &[u8]) -> Option<u8> {
    if data.starts_with(AESCRYPT_V3_HEADER) {
        return Some(3);
    }
    if is_aescrypt_payload(data) {
        data.get(3).copied()
    } else {
        None
    }
}
