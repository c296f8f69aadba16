//! tests/cipher_tests.rs

mod common;

use cipherwall::consts::FAST_AES_PAYLOAD_KDF_ITERATIONS;
use cipherwall::core::cipher::aes::aescrypt_version;
use cipherwall::core::cipher::caesar::{caesar_decrypt, caesar_encrypt, parse_shift};
use cipherwall::core::cipher::{CipherRegistry, CipherStrategy};
use cipherwall::{CipherType, ContentKind, CoreError, CoreResult};

fn registry() -> CipherRegistry {
    common::init_tracing();
    CipherRegistry::with_defaults(FAST_AES_PAYLOAD_KDF_ITERATIONS)
}

#[test]
fn caesar_shift_three_turns_hello_into_khoor() {
    assert_eq!(caesar_encrypt("HELLO", "3").unwrap(), "KHOOR");
    assert_eq!(caesar_decrypt("KHOOR", "3").unwrap(), "HELLO");
}

#[test]
fn caesar_keeps_case_and_passes_non_letters_through() {
    let sealed = caesar_encrypt("Hello, World! 123 ünï", "3").unwrap();
    assert_eq!(sealed, "Khoor, Zruog! 123 ünï");
    assert_eq!(caesar_decrypt(&sealed, "3").unwrap(), "Hello, World! 123 ünï");
}

#[test]
fn caesar_wraps_at_the_end_of_the_alphabet() {
    assert_eq!(caesar_encrypt("xyz XYZ", "3").unwrap(), "abc ABC");
}

#[test]
fn caesar_shift_is_normalized_modulo_26() {
    assert_eq!(parse_shift("3").unwrap(), 3);
    assert_eq!(parse_shift("29").unwrap(), 3);
    assert_eq!(parse_shift("-23").unwrap(), 3);
    assert_eq!(parse_shift("-1").unwrap(), 25);
    assert_eq!(parse_shift("52").unwrap(), 0);
    assert_eq!(parse_shift(" 7 ").unwrap(), 7);

    // Equivalent shifts produce identical ciphertext
    assert_eq!(
        caesar_encrypt("Attack at dawn", "-1").unwrap(),
        caesar_encrypt("Attack at dawn", "25").unwrap()
    );
}

#[test]
fn caesar_rejects_non_integer_keys() {
    for key in ["", "three", "3.5", "3abc", "0x10"] {
        let err = parse_shift(key).unwrap_err();
        assert!(
            matches!(err, CoreError::InvalidKeyFormat(_)),
            "key {key:?} gave {err:?}"
        );
    }
}

#[test]
fn registry_round_trips_caesar_text() {
    let registry = registry();
    let sealed = registry
        .encrypt(CipherType::Caesar, ContentKind::Text, b"HELLO", "3")
        .unwrap();
    assert_eq!(sealed, b"KHOOR");

    let opened = registry
        .decrypt(CipherType::Caesar, ContentKind::Text, &sealed, "3")
        .unwrap();
    assert_eq!(opened.expose_secret().as_slice(), b"HELLO");
}

#[test]
fn registry_round_trips_aes_as_aescrypt_v3() {
    let registry = registry();
    let sealed = registry
        .encrypt(CipherType::Aes, ContentKind::Text, b"meet me at noon", "correct horse")
        .unwrap();
    assert_eq!(aescrypt_version(&sealed), Some(3));
    assert_ne!(sealed.as_slice(), b"meet me at noon");

    let opened = registry
        .decrypt(CipherType::Aes, ContentKind::Text, &sealed, "correct horse")
        .unwrap();
    assert_eq!(opened.expose_secret().as_slice(), b"meet me at noon");
}

#[test]
fn aes_with_wrong_key_is_decryption_failed() {
    let registry = registry();
    let sealed = registry
        .encrypt(CipherType::Aes, ContentKind::Text, b"top secret", "right")
        .unwrap();

    let err = registry
        .decrypt(CipherType::Aes, ContentKind::Text, &sealed, "wrong")
        .unwrap_err();
    assert!(matches!(err, CoreError::DecryptionFailed), "got {err:?}");
}

#[test]
fn aes_empty_plaintext_is_a_valid_result() {
    let registry = registry();
    let sealed = registry
        .encrypt(CipherType::Aes, ContentKind::Image, b"", "k")
        .unwrap();
    let opened = registry
        .decrypt(CipherType::Aes, ContentKind::Image, &sealed, "k")
        .unwrap();
    assert!(opened.expose_secret().is_empty());
}

#[test]
fn aes_rejects_garbage_payload() {
    let registry = registry();
    let err = registry
        .decrypt(CipherType::Aes, ContentKind::Image, b"not a container", "k")
        .unwrap_err();
    assert!(matches!(err, CoreError::DecryptionFailed));
}

#[test]
fn text_decrypting_to_invalid_utf8_fails() {
    let registry = registry();
    let sealed = registry
        .encrypt(CipherType::Aes, ContentKind::Image, &[0xff, 0xfe, 0x00], "k")
        .unwrap();
    let err = registry
        .decrypt(CipherType::Aes, ContentKind::Text, &sealed, "k")
        .unwrap_err();
    assert!(matches!(err, CoreError::DecryptionFailed));
}

#[test]
fn text_encrypt_requires_utf8() {
    let err = registry()
        .encrypt(CipherType::Aes, ContentKind::Text, &[0xc3, 0x28], "k")
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidRequest(_)));
}

#[test]
fn unregistered_cipher_is_unsupported() {
    let empty = CipherRegistry::empty();
    assert!(!empty.supports(CipherType::Caesar));
    let err = empty
        .decrypt(CipherType::Caesar, ContentKind::Text, b"KHOOR", "3")
        .unwrap_err();
    assert!(matches!(err, CoreError::UnsupportedCipher(ref tag) if tag == "caesar"));

    // `none` never has a strategy: there is nothing to undo
    let err = registry()
        .decrypt(CipherType::None, ContentKind::Text, b"plain", "k")
        .unwrap_err();
    assert!(matches!(err, CoreError::UnsupportedCipher(_)));
}

#[test]
fn unknown_cipher_tag_is_unsupported() {
    let err = "rot13".parse::<CipherType>().unwrap_err();
    assert!(matches!(err, CoreError::UnsupportedCipher(ref tag) if tag == "rot13"));
    assert_eq!("AES".parse::<CipherType>().unwrap(), CipherType::Aes);
    assert_eq!("".parse::<CipherType>().unwrap(), CipherType::None);
}

struct Reverse;

impl CipherStrategy for Reverse {
    fn encrypt(&self, plaintext: &[u8], _key: &str) -> CoreResult<Vec<u8>> {
        Ok(plaintext.iter().rev().copied().collect())
    }

    fn decrypt(&self, payload: &[u8], _key: &str) -> CoreResult<Vec<u8>> {
        Ok(payload.iter().rev().copied().collect())
    }
}

#[test]
fn registered_strategy_replaces_the_default() {
    let mut registry = CipherRegistry::empty();
    registry.register(CipherType::Caesar, Box::new(Reverse));
    assert!(registry.supports(CipherType::Caesar));

    let sealed = registry
        .encrypt(CipherType::Caesar, ContentKind::Text, b"abc", "ignored")
        .unwrap();
    assert_eq!(sealed, b"cba");
}
