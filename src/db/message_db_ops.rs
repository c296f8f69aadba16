//! Single-record message statements
//!
//! Every write touches exactly one row, except the expiry sweep which is a
//! single `DELETE`. Timestamps are stored as Unix milliseconds so the sweep
//! and the lazy read-side check compare the same integers.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::core::key_guard::KeyVerifier;
use crate::core::message::{MessageId, MessageRecord};
use crate::enums::{CipherType, ContentKind};
use crate::error::CoreError;
use crate::CoreResult as Result;

type RawRow = (
    Vec<u8>,
    String,
    bool,
    String,
    Option<String>,
    Option<String>,
    i64,
    Option<i64>,
);

/// Insert a new record; a duplicate id surfaces as a constraint violation
pub fn insert_message(conn: &Connection, record: &MessageRecord) -> rusqlite::Result<()> {
    conn.execute(
        r#"
        INSERT INTO messages (
            id, payload, cipher_type, encrypted, content_kind,
            content_type, key_verifier, created_at, expires_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
        params![
            record.id.to_hex(),
            &record.payload,
            record.cipher.as_str(),
            record.encrypted,
            record.kind.as_str(),
            &record.content_type,
            record.key_verifier.as_ref().map(KeyVerifier::as_str),
            record.created_at.timestamp_millis(),
            record.expires_at.map(|at| at.timestamp_millis()),
        ],
    )?;
    Ok(())
}

/// Load a record by id regardless of expiry
pub fn fetch_message(conn: &Connection, id: &MessageId) -> Result<Option<MessageRecord>> {
    let raw: Option<RawRow> = conn
        .query_row(
            r#"
            SELECT payload, cipher_type, encrypted, content_kind,
                   content_type, key_verifier, created_at, expires_at
            FROM messages WHERE id = ?1
            "#,
            [id.to_hex()],
            |row| {
                Ok((
                    row.get(0)?, // payload
                    row.get(1)?, // cipher_type
                    row.get(2)?, // encrypted
                    row.get(3)?, // content_kind
                    row.get(4)?, // content_type
                    row.get(5)?, // key_verifier
                    row.get(6)?, // created_at
                    row.get(7)?, // expires_at
                ))
            },
        )
        .optional()?;

    raw.map(|raw| into_record(*id, raw)).transpose()
}

fn into_record(id: MessageId, raw: RawRow) -> Result<MessageRecord> {
    let (payload, cipher, encrypted, kind, content_type, key_verifier, created_at, expires_at) =
        raw;
    Ok(MessageRecord {
        id,
        payload,
        cipher: CipherType::from_str(&cipher)?,
        encrypted,
        kind: ContentKind::from_str(&kind)
            .map_err(|_| CoreError::CorruptRecord(format!("unknown content kind {kind:?}")))?,
        content_type,
        key_verifier: key_verifier.map(KeyVerifier::from_stored),
        created_at: from_millis(created_at)?,
        expires_at: expires_at.map(from_millis).transpose()?,
    })
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| CoreError::CorruptRecord(format!("timestamp {ms} out of range")))
}

/// Returns true when a row was removed
pub fn delete_message(conn: &Connection, id: &MessageId) -> rusqlite::Result<bool> {
    let removed = conn.execute("DELETE FROM messages WHERE id = ?1", [id.to_hex()])?;
    Ok(removed > 0)
}

/// Delete every record with `expires_at <= now`; returns the number removed
pub fn delete_expired(conn: &Connection, now: DateTime<Utc>) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM messages WHERE expires_at IS NOT NULL AND expires_at <= ?1",
        [now.timestamp_millis()],
    )
}

pub fn count_messages(conn: &Connection) -> rusqlite::Result<u64> {
    conn.query_row("SELECT COUNT(*) FROM messages", [], |row| {
        row.get::<_, i64>(0)
    })
    .map(|count| count.max(0) as u64)
}

/// True for a primary-key collision on insert
pub fn is_duplicate_id(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
