//! # PassView Daemon Library
//!
//! This crate provides a small web service for browsing and reading a
//! `pass`-style password store: a directory tree of GPG-encrypted files.
//!
//! ## Overview
//!
//! The daemon exposes the store over HTTP:
//!
//! - **Tree**: the store's directories and `.gpg` entries as nested JSON
//! - **Search**: the same tree pruned to names matching a query
//! - **Decrypt**: the plaintext of one entry, unlocked with a passphrase
//!
//! Decryption is delegated to the external `gpg` executable. Every path a
//! client sends is checked against the store root before anything touches
//! the filesystem or spawns a process.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                      ApiServer                        │
//! │   GET /   GET /api/tree   POST /api/search   POST ... │
//! ├───────────────────────────────────────────────────────┤
//! │                                                       │
//! │  ┌──────────────┐  ┌──────────────┐  ┌─────────────┐  │
//! │  │ TreeBuilder  │  │ search filter│  │GpgDecryptor │  │
//! │  └──────┬───────┘  └──────────────┘  └──────┬──────┘  │
//! │         │                                   │         │
//! │  ┌──────┴───────────────────────────────────┴──────┐  │
//! │  │          StoreRoot + path sanitizer             │  │
//! │  └─────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use daemon::{AppState, ApiServer, Config};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load_default()?;
//!     let state = AppState::from_config(&config)?;
//!
//!     let server = ApiServer::bind(config.bind_addr()?, state).await?;
//!     server.run(CancellationToken::new()).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and defaults
//! - [`store`]: Store root, path sanitizing, tree building and search
//! - [`gpg`]: Entry decryption through the external tool
//! - [`server`]: HTTP routes and error mapping
//! - [`ui`]: Embedded browser client and shutdown signals

pub mod config;
pub mod gpg;
pub mod server;
pub mod store;
pub mod ui;

pub use config::{Config, ConfigError, GpgConfig};
pub use gpg::{DecryptError, GpgDecryptor};
pub use server::{ApiError, ApiServer, AppState};
pub use store::{filter, StoreError, StoreRoot, TreeBuilder};
