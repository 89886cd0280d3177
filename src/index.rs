//! The safe's metadata index: which clear paths are tracked, where their
//! ciphertext lives, and whether each one is currently secured.
//!
//! The index is the single source of truth for that state. It is
//! serialized as a JSON document, encrypted by the [`Lock`] into an
//! IV-prefixed blob, and rewritten wholesale on every mutation
//! (read-decrypt, mutate in memory, encrypt-write). The file system is
//! expected to agree with it but is not continuously reconciled; a
//! mismatch surfaces lazily when the affected entry is next touched.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::crypto::lock::{Lock, LockError};

/// Defines errors that can occur while reading or writing the index.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// An I/O error occurred while accessing the index file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The cipher engine failed. A [`LockError::Decrypt`] here is the
    /// wrong-password signal for the whole safe.
    #[error("Cipher error: {0}")]
    Lock(#[from] LockError),

    /// The decrypted bytes were not a valid index document. With an
    /// unauthenticated cipher this usually means a wrong key that
    /// happened to unpad cleanly, so callers treat it like a decrypt
    /// failure.
    #[error("Failed to decode index document: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Metadata for one tracked clear file.
///
/// Created on the first `close` of its path, mutated on every subsequent
/// `close`/`open`, and removed only when the owning safe is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// The artifact's digest name (relocate mode) or its full extended
    /// path (in-place mode).
    pub secure_file: String,
    /// RFC 3339 timestamp of the last `close`, if any.
    pub last_closed: Option<String>,
    /// RFC 3339 timestamp of the last `open`, if any.
    pub last_opened: Option<String>,
    /// Whether the file is currently stored encrypted (`true`) or
    /// restored to its clear location (`false`).
    pub safe: bool,
}

/// The mapping from resolved clear paths to their [`FileEntry`] records.
#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Index {
    pub entries: BTreeMap<String, FileEntry>,
}

impl Index {
    /// Reads and decrypts the index blob at `path`.
    pub fn load(path: &Path, lock: &Lock) -> Result<Index, IndexError> {
        let blob = fs::read(path)?;
        let clear = lock.decrypt_bytes(&blob)?;
        Ok(serde_json::from_slice(&clear)?)
    }

    /// Encrypts and writes the whole index document to `path`.
    pub fn save(&self, path: &Path, lock: &Lock) -> Result<(), IndexError> {
        let clear = serde_json::to_vec(self)?;
        let blob = lock.encrypt_bytes(&clear)?;
        fs::write(path, blob)?;
        Ok(())
    }
}
