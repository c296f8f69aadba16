//! tests/api_tests.rs

mod common;
use common::TestStore;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use cipherwall::api::{
    handle_create, handle_fetch, handle_reveal, CreateRequest, ErrorBody, FetchRequest,
    FetchResult, PayloadEncoding, RevealRequest,
};
use cipherwall::{CipherType, ContentKind, CoreError, NewMessage, SealRequest};
use serde_json::{json, Value};

fn create_request(body: Value) -> CreateRequest {
    serde_json::from_value(body).unwrap()
}

#[tokio::test]
async fn create_fetch_reveal_over_json_shapes() {
    let db = TestStore::new();
    let service = db.service(2);

    let created = handle_create(
        &service,
        create_request(json!({
            "payload": "KHOOR",
            "type": "caesar",
            "encrypted": true,
            "key": "3"
        })),
    )
    .await
    .unwrap();

    let fetched = handle_fetch(&service, FetchRequest { id: created.id.to_hex() })
        .await
        .unwrap();
    let body = serde_json::to_value(&fetched).unwrap();
    assert_eq!(body["id"], created.id.to_hex());
    assert_eq!(body["cipherType"], "caesar");
    assert_eq!(body["encrypted"], true);
    assert_eq!(body["hasKey"], true);
    assert_eq!(body["payload"], "KHOOR");
    assert_eq!(body["encoding"], "utf8");
    assert!(body.get("keyVerifier").is_none());

    let revealed = handle_reveal(
        &service,
        RevealRequest {
            id: created.id.to_hex(),
            key: Some("3".into()),
        },
    )
    .await
    .unwrap();
    assert_eq!(revealed.plaintext, "HELLO");
    assert_eq!(revealed.encoding, PayloadEncoding::Utf8);
}

#[tokio::test]
async fn unknown_cipher_tag_is_a_400() {
    let db = TestStore::new();
    let service = db.service(1);

    let err = handle_create(
        &service,
        create_request(json!({ "payload": "x", "cipherType": "rot13", "encrypted": true })),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CoreError::UnsupportedCipher(_)));

    let body = ErrorBody::from(&err);
    assert_eq!(body.status, 400);
    assert_eq!(body.error, "unsupported cipher type: rot13");
}

#[tokio::test]
async fn empty_payload_is_rejected_before_storage() {
    let db = TestStore::new();
    let service = db.service(1);
    let err = handle_create(&service, create_request(json!({ "payload": "" })))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::EmptyPayload));
    assert_eq!(db.store.ping().unwrap(), 0);
}

#[tokio::test]
async fn base64_image_payload_round_trips() {
    let db = TestStore::new();
    let service = db.service(1);
    let gif = b"GIF89a\x01\x00\x01\x00\x00\xff\x00";

    let created = handle_create(
        &service,
        create_request(json!({
            "payload": STANDARD.encode(gif),
            "encoding": "base64",
            "kind": "image",
            "contentType": "image/gif"
        })),
    )
    .await
    .unwrap();

    let revealed = handle_reveal(
        &service,
        RevealRequest {
            id: created.id.to_hex(),
            key: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(revealed.encoding, PayloadEncoding::Base64);
    assert_eq!(revealed.kind, ContentKind::Image);
    assert_eq!(revealed.content_type.as_deref(), Some("image/gif"));
    assert_eq!(STANDARD.decode(&revealed.plaintext).unwrap(), gif);
}

#[test]
fn invalid_base64_is_an_invalid_request() {
    let err = PayloadEncoding::Base64.decode("***").unwrap_err();
    assert!(matches!(err, CoreError::InvalidRequest(_)));
}

#[test]
fn fetch_withholds_plaintext_of_key_protected_messages() {
    let db = TestStore::new();
    let id = db
        .store
        .create(NewMessage::text("for your eyes only").with_key("pw"))
        .unwrap();

    let result = FetchResult::from(db.store.fetch_id(&id).unwrap());
    assert!(result.has_key);
    assert!(!result.encrypted);
    assert_eq!(result.payload, None);
}

#[test]
fn fetch_sends_aes_containers_as_base64() {
    let db = TestStore::new();
    let orch = db.orchestrator();
    let id = orch
        .seal(SealRequest::text("binary inside", CipherType::Aes, "k"))
        .unwrap();

    let record = db.store.fetch_id(&id).unwrap();
    let stored = record.payload.clone();
    let result = FetchResult::from(record);
    assert_eq!(result.encoding, PayloadEncoding::Base64);
    let payload = result.payload.expect("ciphertext is never withheld");
    assert_eq!(STANDARD.decode(payload).unwrap(), stored);
}

#[test]
fn server_errors_hide_internal_detail() {
    let body = ErrorBody::from(&CoreError::CorruptRecord("bad verifier in row 7".into()));
    assert_eq!(body.status, 500);
    assert!(!body.error.contains("row 7"));

    let body = ErrorBody::from(&CoreError::StoragePoisoned);
    assert_eq!(body.status, 503);

    let body = ErrorBody::from(&CoreError::NotFound);
    assert_eq!(
        body,
        ErrorBody {
            status: 404,
            error: "message not found".into()
        }
    );
}

#[test]
fn status_codes_follow_the_error_kind() {
    let cases = [
        (CoreError::InvalidId("x".into()), 400),
        (CoreError::MissingKey, 400),
        (CoreError::InvalidKeyFormat("x".into()), 400),
        (CoreError::IncorrectKey, 403),
        (CoreError::NotFound, 404),
        (CoreError::PayloadTooLarge { len: 2, max: 1 }, 413),
        (CoreError::DecryptionFailed, 422),
        (CoreError::ServiceClosed, 503),
        (CoreError::EncryptionFailed("x".into()), 500),
    ];
    for (err, status) in cases {
        assert_eq!(err.status_code(), status, "{err}");
        assert_eq!(err.is_retryable(), status == 503, "{err}");
    }
}
