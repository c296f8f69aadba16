// src/config/mod.rs
//! Configuration system for cipherwall
//!
//! Central, lazy-loaded global config with TOML + env overrides.

pub use app::{load, load_from, Auth, Config, Expiry, Features, Limits, Storage};

mod app;
mod defaults;
