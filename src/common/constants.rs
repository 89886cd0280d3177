/// Length of a safe's salt in bytes. One SHA-256 digest's worth, so a salt
/// carries as much entropy as the derived key it feeds.
pub const SALT_LEN: usize = 32;

/// Length of the derived symmetric key in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// Length of the CBC initialization vector in bytes (one AES block).
pub const IV_LEN: usize = 16;

/// Length of a relocate-mode secure file name: 32 digest bytes encoded as
/// unpadded Base64.
pub const SECURE_NAME_LEN: usize = 43;

/// File name of the plaintext options record persisted inside a safe's
/// storage directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

// --- Configuration defaults ---

/// Default directory segment appended to the user's home directory.
pub const DEFAULT_ROOT_DIR_NAME: &str = ".sia";

/// Default file name of the encrypted index inside the storage directory.
pub const DEFAULT_INDEX_NAME: &str = "index";

/// Default file name of the raw salt inside the storage directory.
pub const DEFAULT_SALT_NAME: &str = "salt";

/// Default PBKDF2 iteration count. The sole defense against offline
/// password guessing; tests drop this to 1 for speed.
pub const DEFAULT_DIGEST_ITERATIONS: u32 = 20_000;

/// Default streaming buffer size in bytes.
pub const DEFAULT_BUFFER_BYTES: usize = 8192;

/// Default extension appended to in-place secure artifacts.
pub const DEFAULT_EXTENSION: &str = ".sia_closed";
