// src/db/message_db_conn.rs
use std::{fs, path::Path};

use rusqlite::{Connection, Result};

use crate::consts::DB_KDF_ITERATIONS;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS messages (
        id            TEXT PRIMARY KEY,
        payload       BLOB NOT NULL,
        cipher_type   TEXT NOT NULL,
        encrypted     INTEGER NOT NULL,
        content_kind  TEXT NOT NULL DEFAULT 'text',
        content_type  TEXT,
        key_verifier  TEXT,
        created_at    INTEGER NOT NULL,
        expires_at    INTEGER
    );

    CREATE INDEX IF NOT EXISTS idx_messages_expires_at ON messages(expires_at);
"#;

/// Open (or create) the encrypted message database at `db_path`
pub fn open_message_db<P: AsRef<Path>>(db_path: P, db_key: &str) -> Result<Connection> {
    let db_path = db_path.as_ref();
    if let Some(parent) = db_path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let conn = Connection::open(db_path)?;

    let escaped = db_key.replace('\'', "''");
    conn.execute_batch(&format!("PRAGMA key = '{escaped}';"))?;
    conn.execute_batch(&format!(
        r#"
        PRAGMA cipher_page_size = 4096;
        PRAGMA kdf_iter = {DB_KDF_ITERATIONS};
        PRAGMA cipher_hmac_algorithm = HMAC_SHA512;
        PRAGMA cipher_kdf_algorithm = PBKDF2_HMAC_SHA512;
        PRAGMA cipher_plaintext_header_size = 0;
        "#
    ))?;
    // Fails here, not on first use, when the key is wrong
    conn.execute_batch(SCHEMA)?;

    tracing::debug!(path = %db_path.display(), "opened message database");
    Ok(conn)
}

/// Unkeyed in-memory database with the same schema (tests, dry runs)
pub fn open_in_memory_db() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch(SCHEMA)?;
    Ok(conn)
}
