// src/core/mod.rs
pub mod cipher;
pub mod clock;
pub mod key_guard;
pub mod message;

pub use cipher::{CipherRegistry, CipherStrategy};
pub use clock::{Clock, ManualClock, SystemClock};
pub use key_guard::KeyVerifier;
pub use message::{MessageId, MessageRecord, NewMessage};

pub type Result<T> = std::result::Result<T, crate::error::CoreError>;
