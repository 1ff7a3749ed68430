//! Entry decryption through the external `gpg` executable.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use super::error::{classify_failure, DecryptError};
use crate::config::GpgConfig;
use crate::store::{sanitize, StoreRoot, ENTRY_SUFFIX};

/// Decrypts store entries by running the configured gpg program.
///
/// The passphrase is only ever written to the child's stdin; it never
/// appears in the argument list or in logs.
#[derive(Debug, Clone)]
pub struct GpgDecryptor {
    root: StoreRoot,
    config: GpgConfig,
}

impl GpgDecryptor {
    /// Create a decryptor for entries under `root`.
    pub fn new(root: StoreRoot, config: GpgConfig) -> Self {
        Self { root, config }
    }

    /// The tool configuration in use.
    pub fn config(&self) -> &GpgConfig {
        &self.config
    }

    /// Map a relative entry path to the encrypted file on disk.
    ///
    /// The input is sanitized, suffixed and joined to the root; the result
    /// must lie strictly inside the root both lexically and after resolving
    /// symlinks, and must be an existing regular file.
    pub fn resolve_entry(&self, relative: &str) -> Result<PathBuf, DecryptError> {
        let clean = sanitize(relative);
        let candidate = self.root.resolve(&format!("{}{}", clean, ENTRY_SUFFIX));

        if !self.root.contains(&candidate) {
            warn!(path = %candidate.display(), "Rejected entry path outside store");
            return Err(DecryptError::InvalidPath(relative.to_string()));
        }

        let canonical = match fs::canonicalize(&candidate) {
            Ok(path) => path,
            Err(_) => {
                warn!(path = %candidate.display(), "Entry not found");
                return Err(DecryptError::InvalidPath(relative.to_string()));
            }
        };

        if !self.root.contains(&canonical) || !canonical.is_file() {
            warn!(
                path = %candidate.display(),
                resolved = %canonical.display(),
                "Rejected entry resolving outside store or not a file"
            );
            return Err(DecryptError::InvalidPath(relative.to_string()));
        }

        Ok(canonical)
    }

    /// Decrypt the entry at `relative` with `passphrase`.
    ///
    /// Returns the plaintext with trailing whitespace removed. The path is
    /// validated before any process is started.
    pub async fn decrypt(&self, relative: &str, passphrase: &[u8]) -> Result<String, DecryptError> {
        let path = self.resolve_entry(relative)?;

        if self.config.reset_agent {
            self.reset_agent().await?;
        }

        let output = self.run_decrypt(&path, passphrase).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(
                path = %path.display(),
                status = ?output.status.code(),
                "GPG decryption error: {}",
                stderr.trim()
            );
            return Err(classify_failure(&stderr));
        }

        let content = String::from_utf8(output.stdout).map_err(|_| DecryptError::InvalidOutput)?;
        info!(path = %path.display(), "Decrypted entry");
        Ok(content.trim_end().to_string())
    }

    /// Kill the credential agent so a cached passphrase cannot stand in for
    /// the one supplied with the request.
    async fn reset_agent(&self) -> Result<(), DecryptError> {
        let mut cmd = Command::new(&self.config.agent_program);
        if let Some(homedir) = &self.config.homedir {
            cmd.arg("--homedir").arg(homedir);
        }
        cmd.args(["--kill", "gpg-agent"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .map_err(|e| DecryptError::AgentReset(format!("{}: {}", self.config.agent_program, e)))?;

        let output = match timeout(self.config.timeout(), child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| DecryptError::AgentReset(e.to_string()))?,
            Err(_) => {
                return Err(DecryptError::AgentReset(format!(
                    "{} did not exit within {:?}",
                    self.config.agent_program,
                    self.config.timeout()
                )))
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DecryptError::AgentReset(stderr.trim().to_string()));
        }

        debug!("Credential agent reset");
        Ok(())
    }

    async fn run_decrypt(&self, path: &Path, passphrase: &[u8]) -> Result<Output, DecryptError> {
        let program = &self.config.program;

        let mut cmd = Command::new(program);
        if let Some(homedir) = &self.config.homedir {
            cmd.arg("--homedir").arg(homedir);
        }
        cmd.args([
            "--batch",
            "--yes",
            "--no-tty",
            "--pinentry-mode",
            "loopback",
            "--passphrase-fd",
            "0",
            "--decrypt",
        ])
        .arg(path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| DecryptError::Spawn {
            program: program.clone(),
            source,
        })?;

        let stdin = child.stdin.take();
        let run = async move {
            if let Some(mut stdin) = stdin {
                // A tool that exits before reading stdin reports through its exit status.
                if let Err(e) = stdin.write_all(passphrase).await {
                    debug!("Failed to write passphrase to {}: {}", program, e);
                }
            }
            child.wait_with_output().await
        };

        match timeout(self.config.timeout(), run).await {
            Ok(result) => result.map_err(|source| DecryptError::Spawn {
                program: program.clone(),
                source,
            }),
            Err(_) => {
                warn!(
                    path = %path.display(),
                    timeout = ?self.config.timeout(),
                    "Decryption timed out, killing {}",
                    program
                );
                Err(DecryptError::Timeout(self.config.timeout()))
            }
        }
    }
}
