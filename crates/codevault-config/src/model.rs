// SPDX-FileCopyrightText: 2026 Codevault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for codevault.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level codevault configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. Every section defaults, but `vault.salt` has no usable default
/// and is rejected by validation when absent.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CodevaultConfig {
    /// Share file location and master-key salt.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Argon2id cost parameters.
    #[serde(default)]
    pub kdf: KdfConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the key shares live and how the password-derived keys are salted.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// Directory holding the share files (created on enrollment).
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// Share filename template; `{}` is replaced with the share index.
    #[serde(default = "default_share_file_pattern")]
    pub share_file_pattern: String,

    /// Standard base64 encoding of the fixed Argon2id salt.
    #[serde(default)]
    pub salt: Option<String>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            share_file_pattern: default_share_file_pattern(),
            salt: None,
        }
    }
}

fn default_directory() -> PathBuf {
    PathBuf::from("keyvault")
}

fn default_share_file_pattern() -> String {
    "master_key_{}.enc".to_string()
}

/// Argon2id parameters used for every password derivation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KdfConfig {
    /// Iteration count (default: 3).
    #[serde(default = "default_time_cost")]
    pub time_cost: u32,

    /// Memory cost in KiB (default: 65536 = 64 MiB).
    #[serde(default = "default_memory_cost")]
    pub memory_cost: u32,

    /// Parallelism lanes (default: 4).
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,

    /// Derived key length in bytes. Must equal the AES-256 key size.
    #[serde(default = "default_length")]
    pub length: usize,
}

impl Default for KdfConfig {
    fn default() -> Self {
        Self {
            time_cost: default_time_cost(),
            memory_cost: default_memory_cost(),
            parallelism: default_parallelism(),
            length: default_length(),
        }
    }
}

fn default_time_cost() -> u32 {
    3
}

fn default_memory_cost() -> u32 {
    65536 // 64 MiB per OWASP recommendation
}

fn default_parallelism() -> u32 {
    4
}

fn default_length() -> usize {
    32
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
