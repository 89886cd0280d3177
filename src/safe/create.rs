use std::fs;

use crate::common::constants::SALT_LEN;
use crate::config::{ConfigError, SafeConfig};
use crate::crypto::kdf;
use crate::crypto::lock::{Lock, LockError};
use crate::index::{Index, IndexError};
use crate::safe::Safe;
use crate::utils;

/// Defines errors that can occur while constructing a safe.
#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    /// No name was supplied.
    #[error("A safe needs a name")]
    MissingName,

    /// No password was supplied.
    #[error("A safe needs a password")]
    MissingPassword,

    /// The supplied options failed validation, or they conflict with the
    /// options the safe was created with.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The existing index could not be decrypted into a readable
    /// document. The password does not match the one the safe was
    /// created with (or the index blob is corrupt; the two are
    /// indistinguishable without an authentication tag).
    #[error("Wrong password for safe `{0}`")]
    WrongPassword(String),

    /// The persisted salt file does not hold exactly [`SALT_LEN`] bytes.
    #[error("Corrupt salt file: expected {SALT_LEN} bytes, found {found}")]
    CorruptSalt { found: usize },

    /// An I/O error occurred while reading the salt or the index.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The cryptographic library failed outright (not a wrong-password
    /// signal).
    #[error("Cipher error: {0}")]
    Cipher(#[from] openssl::error::ErrorStack),
}

pub(crate) fn create_safe(
    name: &str,
    password: &str,
    config: SafeConfig,
) -> Result<Safe, CreateError> {
    if name.trim().is_empty() {
        return Err(CreateError::MissingName);
    }
    if password.is_empty() {
        return Err(CreateError::MissingPassword);
    }

    let config = config.validated()?;
    let storage_dir = utils::path::absolute(&config.root_dir.join(name))?;

    // An already-used safe carries its options on disk; they are
    // immutable from then on.
    if let Some(persisted) = SafeConfig::load_persisted(&storage_dir)? {
        config.check_against_persisted(&persisted)?;
    }

    // Load the salt if the safe has been used before, otherwise generate
    // one that stays in memory until the first close persists it.
    let salt_path = storage_dir.join(&config.salt_name);
    let (salt, persisted) = if salt_path.is_file() {
        let bytes = fs::read(&salt_path)?;
        let salt: [u8; SALT_LEN] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CreateError::CorruptSalt { found: bytes.len() })?;
        (salt, true)
    } else {
        (kdf::generate_salt()?, false)
    };

    let key = kdf::derive_key(password, &salt, config.digest_iterations)?;
    let lock = Lock::new(key, config.buffer_bytes);

    // Reading the existing index doubles as password verification: a
    // wrong key fails to decrypt it (or decrypts it into garbage).
    let index_path = storage_dir.join(&config.index_name);
    let index = if index_path.is_file() {
        Index::load(&index_path, &lock).map_err(|e| match e {
            IndexError::Lock(LockError::Decrypt) | IndexError::Decode(_) => {
                CreateError::WrongPassword(name.to_string())
            }
            IndexError::Lock(LockError::Io(e)) | IndexError::Io(e) => CreateError::Io(e),
            IndexError::Lock(LockError::Cipher(e)) => CreateError::Cipher(e),
        })?
    } else {
        Index::default()
    };

    Ok(Safe {
        name: name.to_string(),
        storage_dir,
        config,
        salt,
        lock,
        index,
        persisted,
    })
}
