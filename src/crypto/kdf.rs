use openssl::error::ErrorStack;
use openssl::hash::MessageDigest;
use openssl::pkcs5::pbkdf2_hmac;
use openssl::rand::rand_bytes;

use crate::common::constants::{KEY_LEN, SALT_LEN};

/// Derives a symmetric key from a password and a per-safe salt using
/// PBKDF2-HMAC-SHA256.
///
/// The result is a pure function of `(password, salt, iterations)`: the
/// same three inputs always reproduce the same key. `iterations` linearly
/// scales the computation cost and is chosen by the caller's
/// configuration.
pub fn derive_key(
    password: &str,
    salt: &[u8; SALT_LEN],
    iterations: u32,
) -> Result<[u8; KEY_LEN], ErrorStack> {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac(
        password.as_bytes(),
        salt,
        iterations as usize,
        MessageDigest::sha256(),
        &mut key,
    )?;
    Ok(key)
}

/// Generates a fresh random salt for a new safe.
pub fn generate_salt() -> Result<[u8; SALT_LEN], ErrorStack> {
    let mut salt = [0u8; SALT_LEN];
    rand_bytes(&mut salt)?;
    Ok(salt)
}
