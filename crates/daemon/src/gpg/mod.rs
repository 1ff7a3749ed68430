//! Decryption of store entries.
//!
//! No cryptography happens in-process: entries are decrypted by the external
//! `gpg` executable, with the passphrase supplied on stdin. Every request is
//! path-checked against the store root before a process is spawned.

pub mod decryptor;
pub mod error;

pub use decryptor::GpgDecryptor;
pub use error::{classify_failure, DecryptError};
