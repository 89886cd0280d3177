use std::fs;

use tempfile::tempdir;

use crate::config::ConfigError;
use crate::tests::test_config;
use crate::{CreateError, Safe, SafeConfig};

#[test]
fn test_new_safe_touches_nothing_on_disk() {
    let dir = tempdir().unwrap();
    let safe = Safe::new("vault", "secret", test_config(dir.path())).unwrap();

    assert_eq!(safe.name(), "vault");
    assert!(safe.entries().is_empty());
    assert!(
        !safe.storage_dir().exists(),
        "a never-used safe must not create its storage directory"
    );
}

#[test]
fn test_storage_dir_is_root_plus_name() {
    let dir = tempdir().unwrap();
    let safe = Safe::new("vault", "secret", test_config(dir.path())).unwrap();
    assert_eq!(safe.storage_dir(), dir.path().join("vault"));
}

#[test]
fn test_missing_name_and_password_are_rejected() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        Safe::new("", "secret", test_config(dir.path())),
        Err(CreateError::MissingName)
    ));
    assert!(matches!(
        Safe::new("  ", "secret", test_config(dir.path())),
        Err(CreateError::MissingName)
    ));
    assert!(matches!(
        Safe::new("vault", "", test_config(dir.path())),
        Err(CreateError::MissingPassword)
    ));
}

#[test]
fn test_invalid_options_are_rejected() {
    let dir = tempdir().unwrap();
    let config = SafeConfig {
        digest_iterations: 0,
        ..test_config(dir.path())
    };
    assert!(matches!(
        Safe::new("vault", "secret", config),
        Err(CreateError::Config(ConfigError::Invalid {
            field: "digest_iterations",
            ..
        }))
    ));
}

#[test]
fn test_wrong_password_on_a_used_safe() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("letter.txt");
    fs::write(&file, b"dear future self").unwrap();

    let mut safe = Safe::new("vault", "secret", test_config(dir.path())).unwrap();
    safe.close(&file).unwrap();

    // The same password reconstructs the safe and still sees the entry.
    let safe = Safe::new("vault", "secret", test_config(dir.path())).unwrap();
    assert_eq!(safe.entries().len(), 1);

    // A different password fails to read the index.
    assert!(matches!(
        Safe::new("vault", "not-the-secret", test_config(dir.path())),
        Err(CreateError::WrongPassword(name)) if name == "vault"
    ));
}

#[test]
fn test_unused_safe_accepts_any_password() {
    // Nothing is persisted yet, so there is nothing to verify against.
    let dir = tempdir().unwrap();
    Safe::new("vault", "first", test_config(dir.path())).unwrap();
    Safe::new("vault", "second", test_config(dir.path())).unwrap();
}

#[test]
fn test_options_are_immutable_once_persisted() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("letter.txt");
    fs::write(&file, b"content").unwrap();

    let mut safe = Safe::new("vault", "secret", test_config(dir.path())).unwrap();
    safe.close(&file).unwrap();

    let conflicting = SafeConfig {
        buffer_bytes: 4096,
        ..test_config(dir.path())
    };
    assert!(matches!(
        Safe::new("vault", "secret", conflicting),
        Err(CreateError::Config(ConfigError::Immutable {
            field: "buffer_bytes",
            ..
        }))
    ));

    // Unchanged options still work.
    Safe::new("vault", "secret", test_config(dir.path())).unwrap();
}

#[test]
fn test_corrupt_salt_is_reported() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("letter.txt");
    fs::write(&file, b"content").unwrap();

    let mut safe = Safe::new("vault", "secret", test_config(dir.path())).unwrap();
    safe.close(&file).unwrap();

    let salt_path = dir.path().join("vault").join("salt");
    fs::write(&salt_path, b"short").unwrap();

    assert!(matches!(
        Safe::new("vault", "secret", test_config(dir.path())),
        Err(CreateError::CorruptSalt { found: 5 })
    ));
}

#[test]
fn test_salt_survives_across_instances() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("letter.txt");
    fs::write(&file, b"content").unwrap();

    let mut safe = Safe::new("vault", "secret", test_config(dir.path())).unwrap();
    safe.close(&file).unwrap();

    let salt_path = dir.path().join("vault").join("salt");
    let first = fs::read(&salt_path).unwrap();
    assert_eq!(first.len(), 32);

    // Reconstructing must reuse, not regenerate, the salt.
    Safe::new("vault", "secret", test_config(dir.path())).unwrap();
    assert_eq!(fs::read(&salt_path).unwrap(), first);
}
