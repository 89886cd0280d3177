//! The safe: the component that ties key derivation, the cipher engine,
//! the naming strategy and the index together into a close/open
//! lifecycle.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::common::constants::SALT_LEN;
use crate::config::SafeConfig;
use crate::crypto::lock::Lock;
use crate::index::{FileEntry, Index};
use crate::{naming, utils};

mod close;
mod create;
mod delete;
mod open;

pub use close::CloseError;
pub use create::CreateError;
pub use delete::DeleteError;
pub use open::OpenError;

/// A named, password-protected container tracking a set of files, each
/// independently encryptable (`close`) and decryptable (`open`).
///
/// # Concurrency
///
/// All mutating operations perform an unguarded read-modify-write cycle
/// against the shared index and the file system. There is no locking or
/// versioning: two `Safe` instances pointed at the same storage
/// directory race each other and the last writer wins. Callers are
/// responsible for serializing access to a given named safe.
pub struct Safe {
    name: String,
    storage_dir: PathBuf,
    config: SafeConfig,
    salt: [u8; SALT_LEN],
    lock: Lock,
    index: Index,
    // Whether the storage directory, salt and options record are already
    // on disk. A brand-new safe persists nothing until its first close.
    persisted: bool,
}

impl Safe {
    /// Constructs a safe named `name`, protected by `password`, with the
    /// given options.
    ///
    /// For an existing safe this verifies the password by decrypting the
    /// index and rejects options that conflict with the ones the safe
    /// was created with. For a brand-new safe nothing touches the disk
    /// until the first [`close`](Safe::close).
    pub fn new(name: &str, password: &str, config: SafeConfig) -> Result<Safe, CreateError> {
        create::create_safe(name, password, config)
    }

    /// Encrypts the file at `path` into its secure location and records
    /// it in the index. The clear file no longer exists afterwards.
    pub fn close(&mut self, path: impl AsRef<Path>) -> Result<(), CloseError> {
        close::close_file(self, path.as_ref())
    }

    /// Decrypts the secure artifact for `path` back to its clear
    /// location. The artifact no longer exists afterwards. In in-place
    /// mode `path` may be either the clear or the extended form.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<(), OpenError> {
        open::open_file(self, path.as_ref())
    }

    /// Closes every tracked file currently restored to its clear
    /// location. A no-op when none is.
    pub fn fill(&mut self) -> Result<(), CloseError> {
        close::fill(self)
    }

    /// Opens every tracked file currently secured. A no-op when none is.
    pub fn empty(&mut self) -> Result<(), OpenError> {
        open::empty(self)
    }

    /// Destroys the safe: removes every secured artifact, the index, the
    /// salt and the options record, and the storage directory itself if
    /// nothing else remains in it. Files restored to their clear
    /// locations are left untouched.
    pub fn delete(self) -> Result<(), DeleteError> {
        delete::delete_safe(self)
    }

    /// The safe's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The safe's storage directory (`root_dir/<name>`).
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// The validated options this safe was constructed with.
    pub fn config(&self) -> &SafeConfig {
        &self.config
    }

    /// A read-only view of every tracked entry, keyed by resolved clear
    /// path.
    pub fn entries(&self) -> &BTreeMap<String, FileEntry> {
        &self.index.entries
    }

    /// Whether `path` resolves to a tracked entry.
    pub fn is_tracked(&self, path: impl AsRef<Path>) -> io::Result<bool> {
        Ok(self.lookup(path.as_ref())?.is_some())
    }

    /// Whether the entry for `path` is currently secured. `None` when the
    /// path is not tracked.
    pub fn is_closed(&self, path: impl AsRef<Path>) -> io::Result<Option<bool>> {
        Ok(self.lookup(path.as_ref())?.map(|entry| entry.safe))
    }

    fn lookup(&self, path: &Path) -> io::Result<Option<&FileEntry>> {
        let clear = self.resolve_clear_path(path)?;
        Ok(self.index.entries.get(&*clear.to_string_lossy()))
    }

    // --- Internals shared by the operation modules ---

    /// Resolves caller input to the logical clear path: absolute,
    /// lexically normalized, and with the in-place extension stripped.
    pub(crate) fn resolve_clear_path(&self, input: &Path) -> io::Result<PathBuf> {
        let absolute = utils::path::absolute(input)?;
        Ok(naming::clear_path(
            &absolute,
            self.config.in_place,
            &self.config.extension,
        ))
    }

    /// Where the secure artifact for `clear_path` belongs.
    pub(crate) fn secure_path_for(&self, clear_path: &Path) -> PathBuf {
        naming::secure_path(
            &self.storage_dir,
            clear_path,
            self.config.in_place,
            &self.config.extension,
        )
    }

    /// Where an existing entry's artifact lives, per the index.
    pub(crate) fn secure_location(&self, entry: &FileEntry) -> PathBuf {
        if self.config.in_place {
            PathBuf::from(&entry.secure_file)
        } else {
            self.storage_dir.join(&entry.secure_file)
        }
    }

    pub(crate) fn index_path(&self) -> PathBuf {
        self.storage_dir.join(&self.config.index_name)
    }

    pub(crate) fn salt_path(&self) -> PathBuf {
        self.storage_dir.join(&self.config.salt_name)
    }
}
