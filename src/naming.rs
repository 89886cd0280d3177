//! Maps logical (clear) file paths to stored (secure) artifact paths.
//!
//! Two strategies exist. In relocate mode the artifact lives inside the
//! safe's storage directory under a digest-derived name that obscures the
//! original path while staying stable, collision-resistant and
//! filesystem-safe. In in-place mode the artifact is the original file
//! renamed beside itself with a configured extension, so the clear path
//! is directly recoverable from the artifact's name.
//!
//! Every function here is pure: the mapping depends only on its inputs
//! and the configured mode/extension.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine as _;
use sha2::{Digest, Sha256};

use crate::common::constants::SECURE_NAME_LEN;

/// Computes the relocate-mode artifact name for a clear path: the SHA-256
/// digest of the path string, encoded as 43 characters of unpadded
/// Base64 with `/` and `+` replaced by filesystem- and URL-safe
/// characters.
pub fn secure_name(clear_path: &Path) -> String {
    let digest: [u8; 32] = Sha256::digest(clear_path.to_string_lossy().as_bytes()).into();
    let name = STANDARD_NO_PAD
        .encode(digest)
        .replace('/', "_")
        .replace('+', "-");
    debug_assert_eq!(name.len(), SECURE_NAME_LEN);
    name
}

/// Computes where the secure artifact for `clear_path` lives.
///
/// Relocate mode places it inside `storage_dir` under [`secure_name`];
/// in-place mode appends `extension` to the clear path itself.
pub fn secure_path(
    storage_dir: &Path,
    clear_path: &Path,
    in_place: bool,
    extension: &str,
) -> PathBuf {
    if in_place {
        extended_path(clear_path, extension)
    } else {
        storage_dir.join(secure_name(clear_path))
    }
}

/// Appends the in-place extension to a clear path.
pub fn extended_path(clear_path: &Path, extension: &str) -> PathBuf {
    let mut raw = clear_path.as_os_str().to_os_string();
    raw.push(extension);
    PathBuf::from(raw)
}

/// Recovers the logical clear path from caller input.
///
/// In in-place mode the caller may name either the pre-close clear path
/// or the post-close extended path; both resolve to the same logical
/// entry by stripping the extension when present. In relocate mode the
/// input is already the clear path (the artifact name is not invertible;
/// the clear path lives in the index).
pub fn clear_path(input: &Path, in_place: bool, extension: &str) -> PathBuf {
    if in_place {
        if let Some(stripped) = input.to_string_lossy().strip_suffix(extension) {
            return PathBuf::from(stripped);
        }
    }
    input.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_name_is_deterministic_and_distinct() {
        let a = secure_name(Path::new("/tmp/a.txt"));
        let b = secure_name(Path::new("/tmp/a.txt"));
        let c = secure_name(Path::new("/tmp/b.txt"));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_secure_name_is_filesystem_safe() {
        let name = secure_name(Path::new("/some/deeply/nested/path.bin"));
        assert_eq!(name.len(), SECURE_NAME_LEN);
        assert!(!name.contains('/'));
        assert!(!name.contains('+'));
        assert!(!name.contains('='));
    }

    #[test]
    fn test_relocate_mode_places_artifact_in_storage_dir() {
        let storage = Path::new("/safes/vault");
        let clear = Path::new("/home/user/notes.txt");
        let secure = secure_path(storage, clear, false, ".sia_closed");
        assert_eq!(secure.parent().unwrap(), storage);
        assert_eq!(
            secure.file_name().unwrap().to_str().unwrap(),
            secure_name(clear)
        );
    }

    #[test]
    fn test_in_place_mode_roundtrip() {
        let clear = Path::new("/home/user/in_clear_file.txt");
        let secure = secure_path(Path::new("/unused"), clear, true, ".sia_closed");
        assert_eq!(
            secure,
            Path::new("/home/user/in_clear_file.txt.sia_closed")
        );
        // Both the clear and the extended form resolve to the same entry.
        assert_eq!(clear_path(&secure, true, ".sia_closed"), clear);
        assert_eq!(clear_path(clear, true, ".sia_closed"), clear);
    }

    #[test]
    fn test_clear_path_is_identity_in_relocate_mode() {
        let input = Path::new("/home/user/file.txt.sia_closed");
        assert_eq!(clear_path(input, false, ".sia_closed"), input);
    }
}
