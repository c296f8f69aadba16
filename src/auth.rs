// src/auth.rs
//! Identity gate in front of the store
//!
//! The identity provider itself is external; all the core needs is a yes/no
//! on a bearer credential plus the caller's subject for audit logs. The
//! provider handle is a process-wide slot initialised at most once, even
//! when the first requests race, and torn down explicitly at shutdown.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tracing::{debug, warn};

use crate::logging::Redacted;

/// Verified caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub email: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("No token provided")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("identity provider is not initialized")]
    NotInitialized,

    #[error("identity provider setup failed: {0}")]
    Setup(String),
}

impl AuthError {
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::MissingToken | AuthError::InvalidToken => 401,
            AuthError::NotInitialized | AuthError::Setup(_) => 503,
        }
    }
}

/// Verifies a bearer credential
pub trait IdentityProvider: Send + Sync {
    fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

/// Fixed token table for development and tests
#[derive(Default)]
pub struct StaticTokenProvider {
    tokens: HashMap<String, Identity>,
}

impl StaticTokenProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, subject: impl Into<String>) -> Self {
        self.tokens.insert(
            token.into(),
            Identity {
                subject: subject.into(),
                email: None,
            },
        );
        self
    }
}

impl IdentityProvider for StaticTokenProvider {
    fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        self.tokens.get(token).cloned().ok_or(AuthError::InvalidToken)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    header?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Lazily-initialised, idempotent provider handle
pub struct ProviderSlot {
    inner: Mutex<Option<Arc<dyn IdentityProvider>>>,
}

impl ProviderSlot {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<dyn IdentityProvider>>> {
        // The slot holds no invariant a panicking initialiser could break
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `init` only if the slot is empty; concurrent callers block on the
    /// same lock and all receive the single provider it produced
    pub fn init_with<F>(&self, init: F) -> Result<Arc<dyn IdentityProvider>, AuthError>
    where
        F: FnOnce() -> Result<Arc<dyn IdentityProvider>, AuthError>,
    {
        let mut slot = self.lock();
        if let Some(provider) = slot.as_ref() {
            return Ok(Arc::clone(provider));
        }
        let provider = init()?;
        *slot = Some(Arc::clone(&provider));
        debug!("identity provider initialized");
        Ok(provider)
    }

    pub fn get(&self) -> Result<Arc<dyn IdentityProvider>, AuthError> {
        self.lock().as_ref().map(Arc::clone).ok_or(AuthError::NotInitialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().is_some()
    }

    /// Drop the provider; returns false if nothing was installed
    pub fn teardown(&self) -> bool {
        let removed = self.lock().take().is_some();
        if removed {
            debug!("identity provider torn down");
        }
        removed
    }
}

impl Default for ProviderSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide provider used by the boundary adapter
pub static PROVIDER: ProviderSlot = ProviderSlot::new();

/// Gate one request on its `Authorization` header
pub fn authenticate(slot: &ProviderSlot, header: Option<&str>) -> Result<Identity, AuthError> {
    let token = bearer_token(header).ok_or(AuthError::MissingToken)?;
    let provider = slot.get()?;
    provider.verify(token).inspect_err(|err| {
        warn!(token = %Redacted(token), error = %err, "authentication failed");
    })
}
