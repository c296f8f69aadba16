//! Key Guard: one-way verifiers for message keys
//!
//! A verifier is derived once when a keyed message is created and checked on
//! every reveal. It is independent of the cipher: the same verifier gates an
//! `aes`, `caesar` or plain message.
//!
//! Stored form: `pbkdf2-sha256$<iterations>$<salt b64>$<hash b64>`
//! (standard base64, no padding), with a fresh random 16-byte salt.

use std::fmt;

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

use crate::consts::{VERIFIER_HASH_LEN, VERIFIER_SALT_LEN, VERIFIER_SCHEME};

/// Encoded key verifier as persisted next to the message
#[derive(Clone, PartialEq, Eq)]
pub struct KeyVerifier(String);

impl KeyVerifier {
    /// Wraps a verifier read back from storage; validated lazily by `check`
    pub fn from_stored(encoded: String) -> Self {
        Self(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// PBKDF2 rounds recorded in this verifier, if it is well-formed
    pub fn iterations(&self) -> Option<u32> {
        self.parts().map(|parts| parts.iterations)
    }

    fn parts(&self) -> Option<VerifierParts> {
        let mut fields = self.0.split('$');
        let scheme = fields.next()?;
        let iterations = fields.next()?.parse().ok()?;
        let salt = STANDARD_NO_PAD.decode(fields.next()?).ok()?;
        let hash = STANDARD_NO_PAD.decode(fields.next()?).ok()?;
        if scheme != VERIFIER_SCHEME || fields.next().is_some() || iterations == 0 {
            return None;
        }
        if salt.len() != VERIFIER_SALT_LEN || hash.len() != VERIFIER_HASH_LEN {
            return None;
        }
        Some(VerifierParts {
            iterations,
            salt,
            hash,
        })
    }
}

impl fmt::Debug for KeyVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyVerifier([REDACTED])")
    }
}

struct VerifierParts {
    iterations: u32,
    salt: Vec<u8>,
    hash: Vec<u8>,
}

/// Stored verifier could not be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("stored key verifier is malformed")]
pub struct MalformedVerifier;

fn stretch(secret: &[u8], salt: &[u8], iterations: u32) -> [u8; VERIFIER_HASH_LEN] {
    let mut out = [0u8; VERIFIER_HASH_LEN];
    pbkdf2_hmac::<Sha256>(secret, salt, iterations, &mut out);
    out
}

/// Derive a salted verifier for `secret`. Deliberately slow: run it off any
/// latency-sensitive thread.
pub fn derive(secret: &str, iterations: u32) -> KeyVerifier {
    let iterations = iterations.max(1);
    let salt: [u8; VERIFIER_SALT_LEN] = rand::random();
    let hash = stretch(secret.as_bytes(), &salt, iterations);
    KeyVerifier(format!(
        "{VERIFIER_SCHEME}${iterations}${}${}",
        STANDARD_NO_PAD.encode(salt),
        STANDARD_NO_PAD.encode(hash)
    ))
}

/// Check `secret` against a stored verifier using the verifier's own rounds
pub fn check(secret: &str, verifier: &KeyVerifier) -> Result<bool, MalformedVerifier> {
    let parts = verifier.parts().ok_or(MalformedVerifier)?;
    let candidate = stretch(secret.as_bytes(), &parts.salt, parts.iterations);
    Ok(constant_time_eq(&candidate, &parts.hash))
}

/// Constant-time comparison of byte slices.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
