mod create_test;

use std::path::Path;

use crate::SafeConfig;

/// Options every scenario test starts from: a throwaway root and fast,
/// single-iteration key derivation.
pub(crate) fn test_config(root: &Path) -> SafeConfig {
    SafeConfig {
        root_dir: root.to_path_buf(),
        digest_iterations: 1,
        buffer_bytes: 16,
        ..SafeConfig::default()
    }
}
