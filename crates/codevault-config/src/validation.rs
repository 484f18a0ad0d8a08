// SPDX-FileCopyrightText: 2026 Codevault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks the constraints serde cannot express: the salt must decode, the
//! Argon2id costs must meet the OWASP floor, the derived length must match
//! the AES-256 key size, and the share template must name one index slot.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use codevault_core::{check_share_pattern, KEY_LEN, MIN_SALT_LEN};

use crate::diagnostic::ConfigError;
use crate::model::CodevaultConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or every collected error
/// (does not fail fast).
pub fn validate_config(config: &CodevaultConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.vault.directory.as_os_str().is_empty() {
        errors.push(ConfigError::Validation {
            message: "vault.directory must not be empty".to_string(),
        });
    }

    match config.vault.salt.as_deref().map(str::trim) {
        None | Some("") => errors.push(ConfigError::Validation {
            message: "vault.salt must be set (generate one with `codevault salt`)".to_string(),
        }),
        Some(encoded) => match STANDARD.decode(encoded) {
            Ok(salt) if salt.len() < MIN_SALT_LEN => errors.push(ConfigError::Validation {
                message: format!(
                    "vault.salt must decode to at least {MIN_SALT_LEN} bytes, got {}",
                    salt.len()
                ),
            }),
            Ok(_) => {}
            Err(e) => errors.push(ConfigError::Validation {
                message: format!("vault.salt is not valid base64: {e}"),
            }),
        },
    }

    if let Err(problem) = check_share_pattern(&config.vault.share_file_pattern) {
        errors.push(ConfigError::Validation {
            message: format!("vault.share_file_pattern {problem}"),
        });
    }

    if config.kdf.memory_cost < 32768 {
        errors.push(ConfigError::Validation {
            message: format!(
                "kdf.memory_cost must be at least 32768 (32 MiB), got {}",
                config.kdf.memory_cost
            ),
        });
    }

    if config.kdf.time_cost < 2 {
        errors.push(ConfigError::Validation {
            message: format!(
                "kdf.time_cost must be at least 2, got {}",
                config.kdf.time_cost
            ),
        });
    }

    if config.kdf.parallelism < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "kdf.parallelism must be at least 1, got {}",
                config.kdf.parallelism
            ),
        });
    }

    if config.kdf.length != KEY_LEN {
        errors.push(ConfigError::Validation {
            message: format!(
                "kdf.length must equal the AES-256 key size ({KEY_LEN}), got {}",
                config.kdf.length
            ),
        });
    }

    if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
