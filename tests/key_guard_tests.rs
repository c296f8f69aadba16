//! tests/key_guard_tests.rs

use cipherwall::consts::{FAST_VERIFIER_KDF_ITERATIONS, VERIFIER_SCHEME};
use cipherwall::core::key_guard::{check, constant_time_eq, derive, MalformedVerifier};
use cipherwall::core::KeyVerifier;

#[test]
fn verifier_accepts_the_original_key_only() {
    let verifier = derive("hunter2", FAST_VERIFIER_KDF_ITERATIONS);
    assert_eq!(check("hunter2", &verifier), Ok(true));
    assert_eq!(check("hunter3", &verifier), Ok(false));
    assert_eq!(check("", &verifier), Ok(false));
}

#[test]
fn verifier_is_salted_and_never_contains_the_key() {
    let a = derive("same key", FAST_VERIFIER_KDF_ITERATIONS);
    let b = derive("same key", FAST_VERIFIER_KDF_ITERATIONS);
    assert_ne!(a, b, "fresh salt per derivation");
    assert_eq!(check("same key", &a), Ok(true));
    assert_eq!(check("same key", &b), Ok(true));
    assert!(!a.as_str().contains("same key"));
}

#[test]
fn verifier_records_scheme_and_rounds() {
    let verifier = derive("k", 1_234);
    assert!(verifier
        .as_str()
        .starts_with(&format!("{VERIFIER_SCHEME}$1234$")));
    assert_eq!(verifier.iterations(), Some(1_234));
    assert_eq!(verifier.as_str().split('$').count(), 4);
}

#[test]
fn stored_verifier_round_trips_through_its_string_form() {
    let verifier = derive("k", FAST_VERIFIER_KDF_ITERATIONS);
    let reloaded = KeyVerifier::from_stored(verifier.as_str().to_owned());
    assert_eq!(check("k", &reloaded), Ok(true));
}

#[test]
fn malformed_verifiers_are_reported() {
    for stored in [
        "",
        "plaintext-key",
        "bcrypt$10$abc$def",
        "pbkdf2-sha256$notanumber$AAAA$AAAA",
        "pbkdf2-sha256$0$AAAAAAAAAAAAAAAAAAAAAA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
        "pbkdf2-sha256$1000$c2hvcnQ$c2hvcnQ",
    ] {
        let verifier = KeyVerifier::from_stored(stored.to_owned());
        assert_eq!(check("k", &verifier), Err(MalformedVerifier), "{stored:?}");
        assert_eq!(verifier.iterations(), None);
    }
}

#[test]
fn debug_output_is_redacted() {
    let verifier = derive("k", FAST_VERIFIER_KDF_ITERATIONS);
    let shown = format!("{verifier:?}");
    assert_eq!(shown, "KeyVerifier([REDACTED])");
}

#[test]
fn constant_time_eq_compares_contents_and_length() {
    assert!(constant_time_eq(b"abc", b"abc"));
    assert!(!constant_time_eq(b"abc", b"abd"));
    assert!(!constant_time_eq(b"abc", b"abcd"));
    assert!(constant_time_eq(b"", b""));
}
