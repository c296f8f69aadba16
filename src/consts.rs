// src/consts.rs
//! Shared constants: security parameters and defaults

/// Recommended KDF iterations for the SQLCipher message database
// ~0.1-0.2s on modern hardware
pub const DB_KDF_ITERATIONS: u32 = 256_000;

/// PBKDF2-HMAC-SHA256 rounds for key verifiers
// ~0.5-1s per derivation on a typical CPU
pub const VERIFIER_KDF_ITERATIONS: u32 = 600_000;

/// Verifier rounds used when `skip_kdf_slowdown` is enabled (dev / tests only)
pub const FAST_VERIFIER_KDF_ITERATIONS: u32 = 1_000;

/// AES Crypt v3 KDF rounds for payloads sealed server-side
pub const AES_PAYLOAD_KDF_ITERATIONS: u32 = 300_000;

/// AES Crypt rounds used when `skip_kdf_slowdown` is enabled
pub const FAST_AES_PAYLOAD_KDF_ITERATIONS: u32 = 1_000;

/// Scheme tag written at the front of every stored key verifier
pub const VERIFIER_SCHEME: &str = "pbkdf2-sha256";

/// Random salt length for key verifiers
pub const VERIFIER_SALT_LEN: usize = 16;

/// Derived hash length for key verifiers
pub const VERIFIER_HASH_LEN: usize = 32;

/// Raw message id length: 4-byte timestamp + 8 random bytes
pub const MESSAGE_ID_LEN_BYTES: usize = 12;

/// Rendered message id length (lowercase hex)
pub const MESSAGE_ID_LEN_HEX: usize = MESSAGE_ID_LEN_BYTES * 2;

/// Default time-to-live for a stored message
pub const DEFAULT_TTL_SECS: u64 = 3_600;

/// Longest accepted time-to-live (100 years)
pub const MAX_TTL_SECS: u64 = 100 * 365 * 24 * 3_600;

/// Default interval between background expiry sweeps
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Default payload ceiling (text or image bytes)
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Default number of key derivations allowed to run at once
pub const DEFAULT_MAX_CONCURRENT_DERIVATIONS: usize = 4;

/// Header magic for AES Crypt v3 payloads
pub const AESCRYPT_V3_HEADER: &[u8; 5] = b"AES\x03\x00";

/// Letters in the Caesar alphabet
pub const CAESAR_ALPHABET_LEN: i64 = 26;
