//! HTTP API server.
//!
//! This module wires the store and decryption components into an axum
//! application:
//!
//! - `GET /` serves the embedded browser client
//! - `GET /api/tree` returns the full entry tree
//! - `POST /api/search` returns the tree filtered by a query
//! - `POST /api/decrypt` decrypts a single entry
//!
//! The server holds no per-request state; the tree is rebuilt from disk on
//! every tree and search request.

pub mod error;
pub mod router;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use protocol::DirectoryNode;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;
use crate::gpg::GpgDecryptor;
use crate::store::{StoreError, StoreRoot, TreeBuilder};

pub use error::ApiError;
pub use router::build_router;

/// Shared state handed to every request handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Builds the entry tree from the store on disk.
    pub builder: TreeBuilder,
    /// Decrypts single entries.
    pub decryptor: GpgDecryptor,
}

impl AppState {
    /// Create state for an opened store root.
    pub fn new(root: StoreRoot, config: &Config) -> Self {
        let builder = TreeBuilder::new(root.clone()).with_max_depth(config.store.max_depth);
        let decryptor = GpgDecryptor::new(root, config.gpg.clone());

        Self { builder, decryptor }
    }

    /// Open the configured store root and create state for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the root does not exist or is not a directory.
    pub fn from_config(config: &Config) -> std::result::Result<Self, StoreError> {
        let root = StoreRoot::open(&config.store.root)?;
        Ok(Self::new(root, config))
    }

    /// Build the full tree on the blocking thread pool.
    pub async fn load_tree(&self) -> Result<DirectoryNode> {
        let builder = self.builder.clone();

        tokio::task::spawn_blocking(move || builder.build())
            .await
            .context("tree builder task panicked")?
            .context("failed to read password store")
    }
}

/// A bound HTTP server, ready to serve requests.
pub struct ApiServer {
    listener: TcpListener,
    router: Router,
    local_addr: SocketAddr,
}

impl ApiServer {
    /// Bind the listening socket.
    ///
    /// Binding to port 0 picks a free port; use [`ApiServer::local_addr`] to
    /// find out which.
    pub async fn bind(addr: SocketAddr, state: AppState) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let router = build_router(Arc::new(state));

        Ok(Self {
            listener,
            router,
            local_addr,
        })
    }

    /// The address the server is listening on.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve requests until `shutdown` is cancelled.
    ///
    /// In-flight requests are allowed to finish before this returns.
    pub async fn run(self, shutdown: CancellationToken) -> io::Result<()> {
        info!("API server listening on http://{}", self.local_addr);

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        info!("API server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn store_config(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.store.root = dir.path().to_path_buf();
        config
    }

    #[tokio::test]
    async fn test_load_tree() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("email")).unwrap();
        fs::write(dir.path().join("email/work.gpg"), b"x").unwrap();

        let state = AppState::from_config(&store_config(&dir)).unwrap();
        let tree = state.load_tree().await.unwrap();

        let email = tree.get("email").and_then(|n| n.as_directory()).unwrap();
        assert_eq!(
            email.get("work").and_then(|n| n.as_entry()),
            Some("email/work")
        );
    }

    #[test]
    fn test_from_config_missing_root() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.store.root = dir.path().join("missing");

        assert!(matches!(
            AppState::from_config(&config),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_max_depth_from_config() {
        let dir = TempDir::new().unwrap();
        let mut config = store_config(&dir);
        config.store.max_depth = 3;

        let state = AppState::from_config(&config).unwrap();
        assert_eq!(state.builder.max_depth(), 3);
    }

    #[tokio::test]
    async fn test_bind_ephemeral_and_shutdown() {
        let dir = TempDir::new().unwrap();
        let state = AppState::from_config(&store_config(&dir)).unwrap();

        let server = ApiServer::bind("127.0.0.1:0".parse().unwrap(), state)
            .await
            .unwrap();
        assert_ne!(server.local_addr().port(), 0);

        let token = CancellationToken::new();
        let handle = tokio::spawn(server.run(token.clone()));
        token.cancel();

        handle.await.unwrap().unwrap();
    }
}
