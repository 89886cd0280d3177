//! Per-safe configuration: a plain typed options record, validated once
//! at construction and immutable afterwards.
//!
//! The first `close` of a safe persists the record as a plaintext
//! `config.json` inside the storage directory; reconstructing the safe
//! later with conflicting options is rejected, so a safe can never be
//! silently reinterpreted under different parameters (a different
//! iteration count or index name would make its own data unreadable).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::common::constants::{
    CONFIG_FILE_NAME, DEFAULT_BUFFER_BYTES, DEFAULT_DIGEST_ITERATIONS, DEFAULT_EXTENSION,
    DEFAULT_INDEX_NAME, DEFAULT_ROOT_DIR_NAME, DEFAULT_SALT_NAME,
};

/// Defines errors that can occur while validating or persisting safe
/// options.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An option value failed validation.
    #[error("Invalid value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },

    /// An attempt was made to change a safe's configuration after
    /// creation.
    #[error(
        "Safe options are immutable after creation: `{field}` was `{persisted}`, got `{requested}`"
    )]
    Immutable {
        field: &'static str,
        persisted: String,
        requested: String,
    },

    /// An I/O error occurred while reading or writing the persisted
    /// options record.
    #[error("Failed to access persisted safe options: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted options record could not be parsed. Unknown keys are
    /// rejected, so this also covers options outside the recognized set.
    #[error("Failed to parse persisted safe options: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The recognized per-safe options. Read-only after [`Safe`]
/// construction.
///
/// [`Safe`]: crate::safe::Safe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SafeConfig {
    /// Directory under which every safe's storage directory lives.
    pub root_dir: PathBuf,
    /// File name of the encrypted index inside the storage directory.
    pub index_name: String,
    /// File name of the raw salt inside the storage directory.
    pub salt_name: String,
    /// PBKDF2 iteration count for key derivation.
    pub digest_iterations: u32,
    /// Streaming buffer size in bytes. Trades memory footprint against
    /// I/O call overhead; has no effect on correctness.
    pub buffer_bytes: usize,
    /// Encrypt files in place (rename with `extension`) instead of
    /// relocating them into the storage directory.
    pub in_place: bool,
    /// Extension appended to in-place secure artifacts.
    pub extension: String,
    /// Restrict the safe to files under its own storage directory.
    pub portable: bool,
}

impl Default for SafeConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            root_dir: home.join(DEFAULT_ROOT_DIR_NAME),
            index_name: DEFAULT_INDEX_NAME.to_string(),
            salt_name: DEFAULT_SALT_NAME.to_string(),
            digest_iterations: DEFAULT_DIGEST_ITERATIONS,
            buffer_bytes: DEFAULT_BUFFER_BYTES,
            in_place: false,
            extension: DEFAULT_EXTENSION.to_string(),
            portable: false,
        }
    }
}

impl SafeConfig {
    /// Validates the record and returns it in normalized form, or the
    /// first violation found. A pure function of the proposed options.
    pub fn validated(mut self) -> Result<SafeConfig, ConfigError> {
        if self.root_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "root_dir",
                reason: "must not be empty".to_string(),
            });
        }
        if self.index_name.is_empty() {
            return Err(ConfigError::Invalid {
                field: "index_name",
                reason: "must not be empty".to_string(),
            });
        }
        if self.salt_name.is_empty() {
            return Err(ConfigError::Invalid {
                field: "salt_name",
                reason: "must not be empty".to_string(),
            });
        }
        if self.index_name == self.salt_name {
            return Err(ConfigError::Invalid {
                field: "salt_name",
                reason: format!("must differ from index_name (`{}`)", self.index_name),
            });
        }
        if self.digest_iterations == 0 {
            return Err(ConfigError::Invalid {
                field: "digest_iterations",
                reason: "must be positive".to_string(),
            });
        }
        if self.buffer_bytes == 0 {
            return Err(ConfigError::Invalid {
                field: "buffer_bytes",
                reason: "must be positive".to_string(),
            });
        }
        let trimmed = self.extension.trim_start_matches('.');
        if trimmed.is_empty() {
            return Err(ConfigError::Invalid {
                field: "extension",
                reason: "must not be empty".to_string(),
            });
        }
        // Normalize to exactly one leading dot.
        self.extension = format!(".{trimmed}");
        Ok(self)
    }

    /// Writes the record as `config.json` inside `storage_dir`.
    pub(crate) fn persist(&self, storage_dir: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(storage_dir.join(CONFIG_FILE_NAME), json)?;
        Ok(())
    }

    /// Loads the record persisted in `storage_dir`, if any.
    pub(crate) fn load_persisted(storage_dir: &Path) -> Result<Option<SafeConfig>, ConfigError> {
        let path = storage_dir.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Rejects any difference between these options and the ones the safe
    /// was created with. `root_dir` is exempt: moving a safe's root does
    /// not reinterpret its contents.
    pub(crate) fn check_against_persisted(&self, persisted: &SafeConfig) -> Result<(), ConfigError> {
        fn conflict<T: PartialEq + std::fmt::Display>(
            field: &'static str,
            requested: &T,
            persisted: &T,
        ) -> Result<(), ConfigError> {
            if requested == persisted {
                Ok(())
            } else {
                Err(ConfigError::Immutable {
                    field,
                    persisted: persisted.to_string(),
                    requested: requested.to_string(),
                })
            }
        }

        conflict("index_name", &self.index_name, &persisted.index_name)?;
        conflict("salt_name", &self.salt_name, &persisted.salt_name)?;
        conflict(
            "digest_iterations",
            &self.digest_iterations,
            &persisted.digest_iterations,
        )?;
        conflict("buffer_bytes", &self.buffer_bytes, &persisted.buffer_bytes)?;
        conflict("in_place", &self.in_place, &persisted.in_place)?;
        conflict("extension", &self.extension, &persisted.extension)?;
        conflict("portable", &self.portable, &persisted.portable)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = SafeConfig::default().validated().unwrap();
        assert_eq!(config.index_name, "index");
        assert_eq!(config.salt_name, "salt");
        assert_eq!(config.extension, ".sia_closed");
        assert!(!config.in_place);
        assert!(!config.portable);
    }

    #[test]
    fn test_extension_is_normalized_to_one_leading_dot() {
        for raw in ["closed", ".closed", "...closed"] {
            let config = SafeConfig {
                extension: raw.to_string(),
                ..SafeConfig::default()
            };
            assert_eq!(config.validated().unwrap().extension, ".closed");
        }
    }

    #[test]
    fn test_rejects_empty_and_zero_fields() {
        let cases: Vec<(&str, SafeConfig)> = vec![
            (
                "root_dir",
                SafeConfig {
                    root_dir: PathBuf::new(),
                    ..SafeConfig::default()
                },
            ),
            (
                "index_name",
                SafeConfig {
                    index_name: String::new(),
                    ..SafeConfig::default()
                },
            ),
            (
                "digest_iterations",
                SafeConfig {
                    digest_iterations: 0,
                    ..SafeConfig::default()
                },
            ),
            (
                "buffer_bytes",
                SafeConfig {
                    buffer_bytes: 0,
                    ..SafeConfig::default()
                },
            ),
            (
                "extension",
                SafeConfig {
                    extension: "..".to_string(),
                    ..SafeConfig::default()
                },
            ),
        ];

        for (field, config) in cases {
            match config.validated() {
                Err(ConfigError::Invalid { field: f, .. }) => assert_eq!(f, field),
                other => panic!("expected Invalid({field}), got {other:?}"),
            }
        }
    }

    #[test]
    fn test_rejects_index_and_salt_sharing_a_name() {
        let config = SafeConfig {
            index_name: "shared".to_string(),
            salt_name: "shared".to_string(),
            ..SafeConfig::default()
        };
        assert!(matches!(
            config.validated(),
            Err(ConfigError::Invalid {
                field: "salt_name",
                ..
            })
        ));
    }

    #[test]
    fn test_persisted_record_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let config = SafeConfig {
            buffer_bytes: 16,
            ..SafeConfig::default()
        };
        config.persist(dir.path()).unwrap();

        let loaded = SafeConfig::load_persisted(dir.path()).unwrap().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_persisted_absent_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SafeConfig::load_persisted(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let json = r#"{
            "rootDir": "/safes",
            "indexName": "index",
            "saltName": "salt",
            "digestIterations": 1,
            "bufferBytes": 1024,
            "inPlace": false,
            "extension": ".closed",
            "portable": false,
            "notAnOption": true
        }"#;
        let result: Result<SafeConfig, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_conflicting_options_are_immutable() {
        let created = SafeConfig::default().validated().unwrap();
        let mut requested = created.clone();
        requested.digest_iterations += 1;

        match requested.check_against_persisted(&created) {
            Err(ConfigError::Immutable { field, .. }) => {
                assert_eq!(field, "digest_iterations")
            }
            other => panic!("expected Immutable, got {other:?}"),
        }

        // A moved root directory is not a conflict.
        let mut moved = created.clone();
        moved.root_dir = PathBuf::from("/elsewhere");
        assert!(moved.check_against_persisted(&created).is_ok());
    }
}
