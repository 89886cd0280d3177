//! # sia
//!
//! Named, password-protected file safes. Each safe encrypts individual
//! files into secure artifacts and tracks them in an encrypted metadata
//! index: which clear paths belong to the safe, where their ciphertext
//! lives, and whether each one is currently closed (secured) or open
//! (restored).
//!
//! ## Usage
//!
//! ```no_run
//! use sia::{Safe, SafeConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut safe = Safe::new("vault", "secret", SafeConfig::default())?;
//! safe.close("/home/user/diary.txt")?; // encrypt; the clear file is gone
//! safe.open("/home/user/diary.txt")?;  // decrypt; the artifact is gone
//! # Ok(())
//! # }
//! ```
//!
//! Keys are derived from the password with PBKDF2-HMAC-SHA256 and a
//! per-safe random salt; content is streamed through AES-256-CBC with a
//! random IV prefixed to every ciphertext, so files of any size pass
//! through a fixed-size buffer.
//!
//! ## Storage strategies
//!
//! By default a closed file is relocated into the safe's storage
//! directory under a digest-derived name ([`naming`]). With
//! `in_place = true` it is instead renamed beside itself with a
//! configured extension, and with `portable = true` the safe only
//! accepts files under its own storage directory, so the whole directory
//! can be carried around as a unit.
//!
//! ## Limitations
//!
//! - No authenticated encryption: a structural decrypt failure is how a
//!   wrong password is detected, and in rare cases a wrong key can
//!   produce garbage instead of an error.
//! - No concurrency control: access to a given safe must be serialized
//!   by the caller (see [`Safe`]).

pub mod common;
pub mod config;
pub mod crypto;
pub mod index;
pub mod naming;
pub mod safe;
pub mod utils;

pub use config::{ConfigError, SafeConfig};
pub use crypto::lock::{Lock, LockError};
pub use index::{FileEntry, Index, IndexError};
pub use safe::{CloseError, CreateError, DeleteError, OpenError, Safe};

#[cfg(test)]
mod tests;
