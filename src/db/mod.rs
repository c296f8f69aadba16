// src/db/mod.rs
//! SQLCipher persistence for message records
//!
//! `message_db_conn` opens and migrates the database; `message_db_ops` holds
//! the single-record statements the store is built from. Nothing here knows
//! about keys, ciphers or expiry policy beyond the `expires_at` column.

pub mod message_db_conn;
pub mod message_db_ops;

pub use message_db_conn::{open_in_memory_db, open_message_db};
