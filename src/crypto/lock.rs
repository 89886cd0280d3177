use std::fs;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Write};
use std::path::Path;

use openssl::rand::rand_bytes;
use openssl::symm::{Cipher, Crypter, Mode};
use tempfile::NamedTempFile;

use crate::common::constants::{IV_LEN, KEY_LEN};

/// Defines errors that can occur during cipher engine operations.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    /// An I/O error occurred while reading or writing a stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error occurred inside the OpenSSL cryptographic library while
    /// encrypting.
    #[error("Cipher error: {0}")]
    Cipher(#[from] openssl::error::ErrorStack),

    /// A ciphertext did not decrypt cleanly: the padding or structure was
    /// invalid. This is the mechanism by which a wrong password is
    /// detected; there is no authentication tag.
    #[error("Ciphertext could not be decrypted: wrong password or corrupt data")]
    Decrypt,
}

/// The cipher engine: streams plaintext to ciphertext and back using
/// AES-256-CBC under a key obtained from [`kdf::derive_key`].
///
/// Every encryption generates a fresh random IV and writes it as the
/// first [`IV_LEN`] bytes of the output stream; decryption reads it back
/// from the same position. Content is processed through a fixed-size
/// buffer, so arbitrarily large files never reside wholly in memory.
///
/// # Limitation
///
/// CBC with PKCS#7 padding carries no integrity guarantee. A structural
/// decrypt failure almost always means a wrong key, but a wrong key can,
/// with low probability, unpad cleanly and yield garbage plaintext.
///
/// [`kdf::derive_key`]: crate::crypto::kdf::derive_key
pub struct Lock {
    key: [u8; KEY_LEN],
    buffer_bytes: usize,
}

impl Lock {
    pub fn new(key: [u8; KEY_LEN], buffer_bytes: usize) -> Self {
        Self { key, buffer_bytes }
    }

    /// Encrypts everything `source` yields into `destination`, prefixed
    /// with a fresh random IV. Consumes the entire source stream.
    pub fn encrypt_stream(
        &self,
        mut source: impl Read,
        mut destination: impl Write,
    ) -> Result<(), LockError> {
        let cipher = Cipher::aes_256_cbc();

        let mut iv = [0u8; IV_LEN];
        rand_bytes(&mut iv)?;
        destination.write_all(&iv)?;

        let mut crypter = Crypter::new(cipher, Mode::Encrypt, &self.key, Some(&iv))?;

        let mut buffer = vec![0u8; self.buffer_bytes];
        let mut ciphertext = vec![0u8; self.buffer_bytes + cipher.block_size()];
        loop {
            let bytes_read = source.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            let count = crypter.update(&buffer[..bytes_read], &mut ciphertext)?;
            destination.write_all(&ciphertext[..count])?;
        }

        let count = crypter.finalize(&mut ciphertext)?;
        destination.write_all(&ciphertext[..count])?;
        Ok(())
    }

    /// Decrypts an IV-prefixed ciphertext stream into `destination`.
    ///
    /// A truncated header, invalid block structure or bad final padding
    /// surfaces as [`LockError::Decrypt`].
    pub fn decrypt_stream(
        &self,
        mut source: impl Read,
        mut destination: impl Write,
    ) -> Result<(), LockError> {
        let cipher = Cipher::aes_256_cbc();

        let mut iv = [0u8; IV_LEN];
        source.read_exact(&mut iv).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                LockError::Decrypt
            } else {
                LockError::Io(e)
            }
        })?;

        let mut crypter = Crypter::new(cipher, Mode::Decrypt, &self.key, Some(&iv))?;

        let mut buffer = vec![0u8; self.buffer_bytes];
        let mut cleartext = vec![0u8; self.buffer_bytes + cipher.block_size()];
        loop {
            let bytes_read = source.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            let count = crypter
                .update(&buffer[..bytes_read], &mut cleartext)
                .map_err(|_| LockError::Decrypt)?;
            destination.write_all(&cleartext[..count])?;
        }

        let count = crypter
            .finalize(&mut cleartext)
            .map_err(|_| LockError::Decrypt)?;
        destination.write_all(&cleartext[..count])?;
        Ok(())
    }

    /// Encrypts an in-memory byte string.
    pub fn encrypt_bytes(&self, cleartext: &[u8]) -> Result<Vec<u8>, LockError> {
        let mut ciphertext = Vec::new();
        self.encrypt_stream(Cursor::new(cleartext), &mut ciphertext)?;
        Ok(ciphertext)
    }

    /// Decrypts an in-memory IV-prefixed byte string.
    pub fn decrypt_bytes(&self, ciphertext: &[u8]) -> Result<Vec<u8>, LockError> {
        let mut cleartext = Vec::new();
        self.decrypt_stream(Cursor::new(ciphertext), &mut cleartext)?;
        Ok(cleartext)
    }

    /// Encrypts `source` into `destination` and removes `source` once the
    /// destination is fully written and closed. A destructive move, not a
    /// copy.
    pub fn encrypt_file(&self, source: &Path, destination: &Path) -> Result<(), LockError> {
        self.translate_file(source, destination, Mode::Encrypt)
    }

    /// Decrypts `source` into `destination` and removes `source` once the
    /// destination is fully written and closed.
    pub fn decrypt_file(&self, source: &Path, destination: &Path) -> Result<(), LockError> {
        self.translate_file(source, destination, Mode::Decrypt)
    }

    fn translate_file(
        &self,
        source: &Path,
        destination: &Path,
        mode: Mode,
    ) -> Result<(), LockError> {
        // Output is staged in a temporary sibling and renamed into place
        // only on success, so a failure touches neither the source nor
        // whatever currently sits at the destination path. The staging
        // file is removed when it drops on the error paths.
        let parent = destination.parent().unwrap_or(Path::new("."));
        let mut staged = NamedTempFile::new_in(parent)?;

        let reader = BufReader::new(File::open(source)?);
        match mode {
            Mode::Encrypt => self.encrypt_stream(reader, &mut staged)?,
            Mode::Decrypt => self.decrypt_stream(reader, &mut staged)?,
        }
        staged.flush()?;

        staged
            .persist(destination)
            .map_err(|e| LockError::Io(e.error))?;
        fs::remove_file(source)?;
        Ok(())
    }
}

impl Drop for Lock {
    fn drop(&mut self) {
        // Best-effort wipe of the key material.
        for byte in self.key.iter_mut() {
            *byte = 0;
        }
    }
}
