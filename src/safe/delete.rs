use std::fs;

use crate::common::constants::CONFIG_FILE_NAME;
use crate::safe::Safe;

/// Defines errors that can occur while destroying a safe.
#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    /// An I/O error occurred while removing artifacts or metadata.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub(crate) fn delete_safe(safe: Safe) -> Result<(), DeleteError> {
    // Secured entries exist only as ciphertext; destroying the safe
    // destroys them. Entries restored to their clear locations live
    // outside the safe and are left untouched.
    for entry in safe.index.entries.values().filter(|entry| entry.safe) {
        let artifact = safe.secure_location(entry);
        // A manually deleted artifact is not worth failing over here.
        if artifact.is_file() {
            fs::remove_file(artifact)?;
        }
    }

    if !safe.persisted {
        return Ok(());
    }

    for metadata in [
        safe.index_path(),
        safe.salt_path(),
        safe.storage_dir.join(CONFIG_FILE_NAME),
    ] {
        if metadata.is_file() {
            fs::remove_file(metadata)?;
        }
    }

    // The directory goes only when nothing extraneous remains in it.
    if safe.storage_dir.is_dir() && fs::read_dir(&safe.storage_dir)?.next().is_none() {
        fs::remove_dir(&safe.storage_dir)?;
    }
    Ok(())
}
