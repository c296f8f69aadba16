// src/service.rs
//! Async facade over the store and orchestrator
//!
//! Store and cipher work is blocking (SQLite I/O, PBKDF2, AES Crypt KDF), so
//! every call runs on tokio's blocking pool. Calls that derive or check a
//! key verifier, or run the AES KDF, first take a permit from a semaphore
//! sized by `limits.max_concurrent_derivations`; plain fetches, and reveals
//! of unprotected plaintext, do not.
//! The permit moves into the blocking task, so a caller that stops waiting
//! does not free a slot early, and a committed `create` stays committed.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, OwnedSemaphorePermit, Semaphore};
use tokio::task::{spawn_blocking, JoinHandle};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::core::cipher::CipherRegistry;
use crate::core::message::{MessageId, MessageRecord, NewMessage};
use crate::error::CoreError;
use crate::reveal::{Orchestrator, Revealed, SealRequest};
use crate::store::MessageStore;
use crate::CoreResult as Result;

/// `interval` rejects a zero period
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Clone)]
pub struct VaultService {
    orchestrator: Orchestrator,
    derivations: Arc<Semaphore>,
}

impl VaultService {
    pub fn new(orchestrator: Orchestrator, max_concurrent_derivations: usize) -> Self {
        Self {
            orchestrator,
            derivations: Arc::new(Semaphore::new(max_concurrent_derivations.max(1))),
        }
    }

    /// Open the configured database; a failure here is fatal for the caller
    pub fn from_config(config: &Config) -> Result<Self> {
        let opts = config.store_options();
        let ciphers = Arc::new(CipherRegistry::with_defaults(opts.aes_iterations));
        let store = MessageStore::open(&config.storage.db_path, &config.storage.db_key, opts)?;
        Ok(Self::new(
            Orchestrator::new(store, ciphers),
            config.limits.max_concurrent_derivations,
        ))
    }

    pub fn store(&self) -> &MessageStore {
        self.orchestrator.store()
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    async fn permit(&self) -> Result<OwnedSemaphorePermit> {
        self.derivations
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| CoreError::ServiceClosed)
    }

    /// Not idempotent: do not retry blindly after a timeout
    pub async fn create(&self, new: NewMessage) -> Result<MessageId> {
        let permit = match &new.key {
            Some(_) => Some(self.permit().await?),
            None => None,
        };
        let store = self.store().clone();
        spawn_blocking(move || {
            let _permit = permit;
            store.create(new)
        })
        .await?
    }

    pub async fn seal(&self, req: SealRequest) -> Result<MessageId> {
        let permit = self.permit().await?;
        let orchestrator = self.orchestrator.clone();
        spawn_blocking(move || {
            let _permit = permit;
            orchestrator.seal(req)
        })
        .await?
    }

    pub async fn fetch(&self, id: String) -> Result<MessageRecord> {
        let store = self.store().clone();
        spawn_blocking(move || store.fetch(&id)).await?
    }

    /// Plain unprotected records skip the derivation queue
    pub async fn reveal(&self, id: String, key: Option<String>) -> Result<Revealed> {
        let record = self.fetch(id).await?;
        let permit = if record.has_key() || record.encrypted {
            Some(self.permit().await?)
        } else {
            None
        };
        let orchestrator = self.orchestrator.clone();
        spawn_blocking(move || {
            let _permit = permit;
            orchestrator.reveal_record(record, key.as_deref())
        })
        .await?
    }

    pub async fn sweep_expired(&self) -> Result<usize> {
        let store = self.store().clone();
        spawn_blocking(move || store.sweep_expired()).await?
    }

    /// Stop handing out derivation permits; in-flight work completes
    pub fn close(&self) {
        self.derivations.close();
    }

    /// Periodically delete expired records until the handle is shut down
    pub fn spawn_sweeper(&self, every: Duration) -> SweeperHandle {
        let every = every.max(MIN_SWEEP_INTERVAL);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let service = self.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(every_secs = every.as_secs_f64(), "expiry sweeper started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match service.sweep_expired().await {
                            Ok(removed) => debug!(removed, "sweep pass complete"),
                            Err(err) => warn!(error = %err, "sweep pass failed"),
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("expiry sweeper stopped");
        });

        SweeperHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

/// Owns the background sweep task
pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signal the sweeper and wait for its current pass to finish
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.shutdown.send(true);
        self.task.await?;
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
