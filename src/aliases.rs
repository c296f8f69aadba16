// src/aliases.rs
//! Re-exports secure-gate's ergonomic secret types
//!
//! These are the canonical secret wrappers used throughout cipherwall.
//! Every value that is a key or recovered plaintext lives in one of these
//! so it is zeroized on drop.

pub use secure_gate::dynamic_alias;

// Dynamic secrets
dynamic_alias!(MessageKey, String); // Caller-supplied secret key (passphrase or Caesar shift)
dynamic_alias!(PlainText, Vec<u8>); // Revealed or to-be-sealed content
