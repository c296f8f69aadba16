//! `caesar` strategy: rotate ASCII letters by an integer shift
//!
//! The key is parsed as a signed integer and reduced into `[0, 26)`, so
//! `-1`, `25` and `51` are the same shift. Case is preserved; digits,
//! punctuation, whitespace and non-ASCII characters pass through unchanged.

use super::CipherStrategy;
use crate::consts::CAESAR_ALPHABET_LEN;
use crate::error::CoreError;
use crate::CoreResult as Result;

#[derive(Debug, Clone, Copy, Default)]
pub struct CaesarCipher;

/// Parse a Caesar key into a normalized shift in `[0, 26)`
pub fn parse_shift(key: &str) -> Result<u8> {
    let raw: i64 = key
        .trim()
        .parse()
        .map_err(|_| CoreError::InvalidKeyFormat("caesar key must be an integer shift".into()))?;
    Ok(raw.rem_euclid(CAESAR_ALPHABET_LEN) as u8)
}

/// Rotate every ASCII letter forward by `shift` (already normalized)
pub fn rotate(text: &str, shift: u8) -> String {
    let shift = shift % CAESAR_ALPHABET_LEN as u8;
    text.chars()
        .map(|c| match c {
            'A'..='Z' => rotate_letter(c, b'A', shift),
            'a'..='z' => rotate_letter(c, b'a', shift),
            _ => c,
        })
        .collect()
}

fn rotate_letter(c: char, base: u8, shift: u8) -> char {
    let offset = (c as u8 - base + shift) % CAESAR_ALPHABET_LEN as u8;
    (base + offset) as char
}

pub fn caesar_encrypt(text: &str, key: &str) -> Result<String> {
    Ok(rotate(text, parse_shift(key)?))
}

pub fn caesar_decrypt(text: &str, key: &str) -> Result<String> {
    let shift = parse_shift(key)?;
    Ok(rotate(text, (CAESAR_ALPHABET_LEN as u8 - shift) % CAESAR_ALPHABET_LEN as u8))
}

impl CipherStrategy for CaesarCipher {
    fn encrypt(&self, plaintext: &[u8], key: &str) -> Result<Vec<u8>> {
        let text = std::str::from_utf8(plaintext)
            .map_err(|_| CoreError::InvalidRequest("caesar only applies to text"))?;
        Ok(caesar_encrypt(text, key)?.into_bytes())
    }

    fn decrypt(&self, payload: &[u8], key: &str) -> Result<Vec<u8>> {
        let text = std::str::from_utf8(payload).map_err(|_| CoreError::DecryptionFailed)?;
        Ok(caesar_decrypt(text, key)?.into_bytes())
    }
}
