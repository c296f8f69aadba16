// src/store.rs
//! Message Store: create, fetch and expire stored messages
//!
//! The store owns the database handle and the expiry policy. Expiry is
//! enforced twice with the same test (`now >= expires_at`): lazily on every
//! fetch, which deletes the lapsed row it finds, and in bulk by
//! `sweep_expired`. Both run under the connection lock, so a read racing a
//! sweep sees either the whole record or `NotFound`.

use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::consts::{
    AES_PAYLOAD_KDF_ITERATIONS, DEFAULT_MAX_PAYLOAD_BYTES, DEFAULT_TTL_SECS,
    FAST_AES_PAYLOAD_KDF_ITERATIONS, FAST_VERIFIER_KDF_ITERATIONS, VERIFIER_KDF_ITERATIONS,
};
use crate::core::clock::{Clock, SystemClock};
use crate::core::key_guard;
use crate::core::message::{MessageId, MessageRecord, NewMessage};
use crate::db::message_db_ops::{
    count_messages, delete_expired, delete_message, fetch_message, insert_message,
    is_duplicate_id,
};
use crate::db::{open_in_memory_db, open_message_db};
use crate::error::CoreError;
use crate::CoreResult as Result;

/// Attempts at finding an unused id before giving up
const MAX_ID_ATTEMPTS: usize = 3;

/// Policy knobs for a `MessageStore`
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Default lifetime; `None` stores records without expiry
    pub ttl: Option<Duration>,
    pub max_payload_bytes: usize,
    pub verifier_iterations: u32,
    /// Used by callers that seal payloads with the `aes` cipher
    pub aes_iterations: u32,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            ttl: Some(Duration::from_secs(DEFAULT_TTL_SECS)),
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            verifier_iterations: VERIFIER_KDF_ITERATIONS,
            aes_iterations: AES_PAYLOAD_KDF_ITERATIONS,
        }
    }
}

impl StoreOptions {
    /// Low KDF cost, dev and tests only
    pub fn fast() -> Self {
        Self {
            verifier_iterations: FAST_VERIFIER_KDF_ITERATIONS,
            aes_iterations: FAST_AES_PAYLOAD_KDF_ITERATIONS,
            ..Self::default()
        }
    }

    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Cheap to clone; clones share the same connection and clock
#[derive(Clone)]
pub struct MessageStore {
    conn: Arc<Mutex<Connection>>,
    clock: Arc<dyn Clock>,
    opts: Arc<StoreOptions>,
}

impl fmt::Debug for MessageStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageStore")
            .field("opts", &self.opts)
            .finish_non_exhaustive()
    }
}

impl MessageStore {
    pub fn new(conn: Connection, opts: StoreOptions) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            clock: Arc::new(SystemClock),
            opts: Arc::new(opts),
        }
    }

    /// Open the SQLCipher database at `path`
    pub fn open<P: AsRef<Path>>(path: P, db_key: &str, opts: StoreOptions) -> Result<Self> {
        Ok(Self::new(open_message_db(path, db_key)?, opts))
    }

    pub fn open_in_memory(opts: StoreOptions) -> Result<Self> {
        Ok(Self::new(open_in_memory_db()?, opts))
    }

    pub fn with_clock<C: Clock>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn options(&self) -> &StoreOptions {
        &self.opts
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| CoreError::StoragePoisoned)
    }

    /// `created_at + ttl`; a ttl past the representable range never expires
    fn default_expiry(&self, created_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let ttl = self.opts.ttl?;
        let expires_at = TimeDelta::from_std(ttl)
            .ok()
            .and_then(|ttl| created_at.checked_add_signed(ttl));
        if expires_at.is_none() {
            warn!(ttl_secs = ttl.as_secs(), "ttl out of range, storing without expiry");
        }
        expires_at
    }

    /// Persist a new message and return its id
    ///
    /// Derives the key verifier first (slow, outside the connection lock),
    /// then inserts. Not idempotent: a retried call stores a second record.
    pub fn create(&self, new: NewMessage) -> Result<MessageId> {
        new.validate(self.opts.max_payload_bytes)?;

        let created_at = self.now();
        let expires_at = match new.expires_at {
            Some(at) => Some(at),
            None => self.default_expiry(created_at),
        };
        let key_verifier = new
            .key
            .as_ref()
            .map(|key| key.expose_secret())
            .filter(|key| !key.is_empty())
            .map(|key| key_guard::derive(key, self.opts.verifier_iterations));

        let mut record = MessageRecord {
            id: MessageId::generate(created_at),
            payload: new.payload,
            cipher: new.cipher,
            encrypted: new.encrypted,
            kind: new.kind,
            content_type: new.content_type,
            key_verifier,
            created_at,
            expires_at,
        };

        let conn = self.conn()?;
        let mut attempt = 1;
        loop {
            match insert_message(&conn, &record) {
                Ok(()) => {
                    debug!(
                        id = %record.id,
                        cipher = %record.cipher,
                        kind = %record.kind,
                        has_key = record.has_key(),
                        expires_at = ?record.expires_at,
                        "stored message"
                    );
                    return Ok(record.id);
                }
                Err(err) if is_duplicate_id(&err) && attempt < MAX_ID_ATTEMPTS => {
                    debug!(id = %record.id, attempt, "message id collision, regenerating");
                    attempt += 1;
                    record.id = MessageId::generate(created_at);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Fetch a live record; malformed ids are `InvalidId`, absent or
    /// expired ones `NotFound`
    pub fn fetch(&self, id: &str) -> Result<MessageRecord> {
        self.fetch_id(&MessageId::parse(id)?)
    }

    pub fn fetch_id(&self, id: &MessageId) -> Result<MessageRecord> {
        let now = self.now();
        let conn = self.conn()?;
        let record = fetch_message(&conn, id)?.ok_or(CoreError::NotFound)?;
        if record.is_expired_at(now) {
            delete_message(&conn, id)?;
            debug!(id = %id, "reclaimed expired message on read");
            return Err(CoreError::NotFound);
        }
        Ok(record)
    }

    /// Remove a record; returns false when nothing matched
    pub fn delete(&self, id: &str) -> Result<bool> {
        let id = MessageId::parse(id)?;
        Ok(delete_message(&*self.conn()?, &id)?)
    }

    /// Delete every record whose `expires_at` has passed
    pub fn sweep_expired(&self) -> Result<usize> {
        let now = self.now();
        let removed = delete_expired(&*self.conn()?, now)?;
        if removed > 0 {
            info!(removed, "swept expired messages");
        }
        Ok(removed)
    }

    /// Health check: number of stored rows, live or not yet reclaimed
    pub fn ping(&self) -> Result<u64> {
        Ok(count_messages(&*self.conn()?)?)
    }
}
