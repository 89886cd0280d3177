use std::path::{Path, PathBuf};

use crate::crypto::lock::LockError;
use crate::index::IndexError;
use crate::safe::Safe;
use crate::utils::path::is_descendant;
use crate::utils::time::now_as_rfc3339_string;

/// Defines errors that can occur while restoring a file.
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    /// The path is not tracked by this safe.
    #[error("No file tracked at {0}")]
    NotTracked(PathBuf),

    /// The entry exists but its file is already restored to the clear
    /// location.
    #[error("File {0} is already open")]
    AlreadyOpen(PathBuf),

    /// A portable safe was asked to restore a file that does not live
    /// under its storage directory.
    #[error("File {path} is outside the scope of portable safe directory {scope}")]
    FileOutsideScope { path: PathBuf, scope: PathBuf },

    /// The secure artifact did not decrypt cleanly. Since the index did,
    /// this points at a corrupt or tampered artifact rather than a wrong
    /// password, but the two cannot be told apart.
    #[error("Secure artifact for {0} could not be decrypted")]
    Undecryptable(PathBuf),

    /// An I/O error occurred; a manually deleted artifact surfaces here
    /// as a not-found error when its entry is next opened.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The cryptographic library failed outright.
    #[error("Cipher error: {0}")]
    Cipher(#[from] openssl::error::ErrorStack),

    /// The updated index could not be persisted.
    #[error("Failed to persist index: {0}")]
    Index(#[from] IndexError),
}

pub(crate) fn open_file(safe: &mut Safe, path: &Path) -> Result<(), OpenError> {
    let clear = safe.resolve_clear_path(path)?;

    if safe.config.portable && !is_descendant(&clear, &safe.storage_dir) {
        return Err(OpenError::FileOutsideScope {
            path: clear,
            scope: safe.storage_dir.clone(),
        });
    }

    let key = clear.to_string_lossy().into_owned();
    let secure = match safe.index.entries.get(&key) {
        None => return Err(OpenError::NotTracked(clear)),
        Some(entry) if !entry.safe => return Err(OpenError::AlreadyOpen(clear)),
        Some(entry) => safe.secure_location(entry),
    };

    safe.lock
        .decrypt_file(&secure, &clear)
        .map_err(|e| match e {
            LockError::Decrypt => OpenError::Undecryptable(clear.clone()),
            LockError::Io(e) => OpenError::Io(e),
            LockError::Cipher(e) => OpenError::Cipher(e),
        })?;

    if let Some(entry) = safe.index.entries.get_mut(&key) {
        entry.last_opened = Some(now_as_rfc3339_string());
        entry.safe = false;
    }

    safe.index.save(&safe.index_path(), &safe.lock)?;
    Ok(())
}

pub(crate) fn empty(safe: &mut Safe) -> Result<(), OpenError> {
    let targets: Vec<String> = safe
        .index
        .entries
        .iter()
        .filter(|(_, entry)| entry.safe)
        .map(|(path, _)| path.clone())
        .collect();

    for path in targets {
        open_file(safe, Path::new(&path))?;
    }
    Ok(())
}
