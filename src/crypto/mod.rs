pub mod kdf;
pub mod lock;
