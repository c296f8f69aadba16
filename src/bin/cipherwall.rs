// src/bin/cipherwall.rs
//! cipherwall CLI: save, seal, fetch, reveal and sweep messages locally

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use cipherwall::api::{
    handle_create, handle_fetch, handle_reveal, CreateRequest, ErrorBody, FetchRequest,
    PayloadEncoding, RevealRequest,
};
use cipherwall::auth::{authenticate, IdentityProvider, StaticTokenProvider, PROVIDER};
use cipherwall::config::{self, Config};
use cipherwall::{CipherType, ContentKind, CoreError, PlainText, SealRequest, VaultService};
use rpassword::prompt_password;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "cipherwall", version, about = "Ephemeral key-gated message store")]
struct Cli {
    /// TOML config file (defaults to $CIPHERWALL_CONFIG or ./cipherwall.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Bearer token, required when `[auth] tokens` is configured
    #[arg(long, global = true, env = "CIPHERWALL_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Store a payload exactly as given (already encrypted or plain)
    Save {
        #[command(flatten)]
        input: PayloadInput,
        /// Cipher that produced the payload: aes, caesar or none
        #[arg(long, default_value = "none")]
        cipher: String,
        #[arg(long)]
        encrypted: bool,
        #[command(flatten)]
        key: KeyInput,
    },
    /// Encrypt a payload server-side, then store it
    Seal {
        #[command(flatten)]
        input: PayloadInput,
        #[arg(long, default_value = "aes")]
        cipher: String,
        #[command(flatten)]
        key: KeyInput,
    },
    /// Show metadata and the stored (still encrypted) payload
    Fetch { id: String },
    /// Verify the key and print the plaintext
    Reveal {
        id: String,
        #[command(flatten)]
        key: KeyInput,
        /// Write revealed bytes here instead of printing JSON
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Delete expired messages; with --watch keep sweeping until Ctrl-C
    Sweep {
        #[arg(long)]
        watch: bool,
    },
    /// Check the database is reachable
    Ping,
}

#[derive(Debug, Args)]
struct PayloadInput {
    /// Text payload
    #[arg(long, conflicts_with = "file")]
    text: Option<String>,
    /// Read the payload from a file
    #[arg(long)]
    file: Option<PathBuf>,
    /// Treat the payload as an image with this MIME type
    #[arg(long)]
    image: Option<String>,
}

#[derive(Debug, Args)]
struct KeyInput {
    #[arg(long, conflicts_with = "prompt_key")]
    key: Option<String>,
    /// Read the key from the terminal without echo
    #[arg(long)]
    prompt_key: bool,
}

impl KeyInput {
    fn resolve(self) -> Result<Option<String>> {
        if self.prompt_key {
            let key = prompt_password("Key: ").context("failed to read key")?;
            return Ok(Some(key.trim_end().to_owned()));
        }
        Ok(self.key)
    }
}

impl PayloadInput {
    fn read(&self) -> Result<Vec<u8>> {
        match (&self.text, &self.file) {
            (Some(text), _) => Ok(text.clone().into_bytes()),
            (None, Some(path)) => {
                std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
            }
            (None, None) => anyhow::bail!("provide --text or --file"),
        }
    }

    fn kind(&self) -> ContentKind {
        if self.image.is_some() {
            ContentKind::Image
        } else {
            ContentKind::Text
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => config::load_from(path)?.with_overrides(|name| std::env::var(name).ok())?,
        None => config::load()?.clone(),
    };
    config.validate()?;
    Ok(config)
}

fn gate(config: &Config, token: Option<&str>) -> Result<()> {
    if config.auth.tokens.is_empty() {
        return Ok(());
    }
    let tokens = config.auth.tokens.clone();
    PROVIDER.init_with(|| {
        let provider = tokens
            .iter()
            .fold(StaticTokenProvider::new(), |provider, token| provider.with_token(token, "cli"));
        Ok(Arc::new(provider) as Arc<dyn IdentityProvider>)
    })?;
    let header = token.map(|token| format!("Bearer {token}"));
    let identity = authenticate(&PROVIDER, header.as_deref())?;
    info!(subject = %identity.subject, "authenticated");
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_ref())?;
    gate(&config, cli.token.as_deref())?;

    // Storage failures at startup are fatal
    let service = VaultService::from_config(&config).with_context(|| {
        format!("failed to open message database {}", config.storage.db_path)
    })?;

    match cli.command {
        Command::Save {
            input,
            cipher,
            encrypted,
            key,
        } => {
            let payload = input.read()?;
            let (payload, encoding) = PayloadEncoding::encode(input.image.is_none(), &payload);
            let req = CreateRequest {
                payload,
                encoding,
                cipher_type: cipher,
                encrypted,
                kind: input.kind(),
                content_type: input.image.clone(),
                key: key.resolve()?,
            };
            print_json(&handle_create(&service, req).await?)?;
        }
        Command::Seal { input, cipher, key } => {
            let req = SealRequest {
                plaintext: PlainText::new(input.read()?),
                cipher: cipher.parse::<CipherType>()?,
                kind: input.kind(),
                content_type: input.image.clone(),
                key: key.resolve()?.map(cipherwall::MessageKey::new),
                expires_at: None,
            };
            let id = service.seal(req).await?;
            print_json(&serde_json::json!({ "id": id }))?;
        }
        Command::Fetch { id } => {
            print_json(&handle_fetch(&service, FetchRequest { id }).await?)?;
        }
        Command::Reveal { id, key, out } => {
            let key = key.resolve()?;
            match out {
                Some(path) => {
                    let revealed = service.reveal(id, key).await?;
                    std::fs::write(&path, revealed.bytes())
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!(path = %path.display(), "wrote revealed payload");
                }
                None => print_json(&handle_reveal(&service, RevealRequest { id, key }).await?)?,
            }
        }
        Command::Sweep { watch: false } => {
            let removed = service.sweep_expired().await?;
            print_json(&serde_json::json!({ "removed": removed }))?;
        }
        Command::Sweep { watch: true } => {
            let sweeper = service.spawn_sweeper(config.sweep_interval());
            tokio::signal::ctrl_c().await?;
            service.close();
            sweeper.shutdown().await?;
        }
        Command::Ping => {
            let stored = service.store().ping()?;
            print_json(&serde_json::json!({ "ok": true, "stored": stored }))?;
        }
    }

    PROVIDER.teardown();
    Ok(())
}

#[tokio::main]
async fn main() {
    cipherwall::logging::init();

    if let Err(err) = run(Cli::parse()).await {
        if let Some(core) = err.downcast_ref::<CoreError>() {
            let body = ErrorBody::from(core);
            eprintln!(
                "{}",
                serde_json::to_string(&body).unwrap_or_else(|_| body.error.clone())
            );
        } else {
            eprintln!("error: {err:#}");
        }
        std::process::exit(1);
    }
}
