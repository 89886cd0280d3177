use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ConfigError;
use crate::crypto::lock::LockError;
use crate::index::{FileEntry, IndexError};
use crate::safe::Safe;
use crate::utils::path::is_descendant;
use crate::utils::time::now_as_rfc3339_string;

/// Defines errors that can occur while securing a file.
#[derive(Debug, thiserror::Error)]
pub enum CloseError {
    /// A portable safe was asked to secure a file that does not live
    /// under its storage directory.
    #[error("File {path} is outside the scope of portable safe directory {scope}")]
    FileOutsideScope { path: PathBuf, scope: PathBuf },

    /// An I/O error occurred. Closing a path that is already secured
    /// (or was never written) ends here with a not-found error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The cipher engine failed while encrypting the file.
    #[error("Cipher error: {0}")]
    Lock(#[from] LockError),

    /// The updated index could not be persisted.
    #[error("Failed to persist index: {0}")]
    Index(#[from] IndexError),

    /// The options record could not be persisted on first use.
    #[error("Failed to persist safe options: {0}")]
    Config(#[from] ConfigError),
}

pub(crate) fn close_file(safe: &mut Safe, path: &Path) -> Result<(), CloseError> {
    let clear = safe.resolve_clear_path(path)?;

    if safe.config.portable && !is_descendant(&clear, &safe.storage_dir) {
        return Err(CloseError::FileOutsideScope {
            path: clear,
            scope: safe.storage_dir.clone(),
        });
    }

    // First use: materialize the storage directory, the salt and the
    // options record before anything references them.
    ensure_persisted(safe)?;

    let secure = safe.secure_path_for(&clear);
    safe.lock.encrypt_file(&clear, &secure)?;

    let secure_file = if safe.config.in_place {
        secure.to_string_lossy().into_owned()
    } else {
        // Relocate mode stores only the digest name; the directory is
        // implied by the safe.
        secure
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    };

    let entry = safe
        .index
        .entries
        .entry(clear.to_string_lossy().into_owned())
        .or_insert(FileEntry {
            secure_file: String::new(),
            last_closed: None,
            last_opened: None,
            safe: false,
        });
    entry.secure_file = secure_file;
    entry.last_closed = Some(now_as_rfc3339_string());
    entry.safe = true;

    safe.index.save(&safe.index_path(), &safe.lock)?;
    Ok(())
}

pub(crate) fn fill(safe: &mut Safe) -> Result<(), CloseError> {
    let targets: Vec<String> = safe
        .index
        .entries
        .iter()
        .filter(|(_, entry)| !entry.safe)
        .map(|(path, _)| path.clone())
        .collect();

    for path in targets {
        close_file(safe, Path::new(&path))?;
    }
    Ok(())
}

fn ensure_persisted(safe: &mut Safe) -> Result<(), CloseError> {
    if safe.persisted {
        return Ok(());
    }
    fs::create_dir_all(&safe.storage_dir)?;
    fs::write(safe.salt_path(), safe.salt)?;
    safe.config.persist(&safe.storage_dir)?;
    safe.persisted = true;
    Ok(())
}
