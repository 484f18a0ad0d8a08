// SPDX-FileCopyrightText: 2026 Codevault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./codevault.toml` > `~/.config/codevault/codevault.toml`
//! > `/etc/codevault/codevault.toml` with environment variable overrides via
//! the `CODEVAULT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::CodevaultConfig;

/// Name of the configuration file looked up in each hierarchy level.
pub const CONFIG_FILE_NAME: &str = "codevault.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/codevault/codevault.toml` (system-wide)
/// 3. `~/.config/codevault/codevault.toml` (user XDG config)
/// 4. `./codevault.toml` (local directory)
/// 5. `CODEVAULT_*` environment variables
pub fn load_config() -> Result<CodevaultConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and embedding.
pub fn load_config_from_str(toml_content: &str) -> Result<CodevaultConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CodevaultConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CodevaultConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CodevaultConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for hierarchy loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(CodevaultConfig::default()))
        .merge(Toml::file(Path::new("/etc/codevault").join(CONFIG_FILE_NAME)))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("codevault").join(CONFIG_FILE_NAME))
                .unwrap_or_default(),
        ))
        .merge(Toml::file(CONFIG_FILE_NAME))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `CODEVAULT_VAULT_SHARE_FILE_PATTERN` must map to
/// `vault.share_file_pattern`, not `vault.share.file.pattern`.
///
/// `CODEVAULT_PASSWORD*` variables are password sources, not configuration,
/// and are filtered out so they never reach the config model.
fn env_provider() -> Env {
    Env::prefixed("CODEVAULT_")
        .filter(|key| !key.starts_with("password"))
        .map(|key| {
            // Prefix already stripped: CODEVAULT_KDF_TIME_COST -> "kdf_time_cost"
            let key_str = key.as_str().to_ascii_lowercase();
            let mapped = key_str
                .replacen("vault_", "vault.", 1)
                .replacen("kdf_", "kdf.", 1)
                .replacen("logging_", "logging.", 1);
            mapped.into()
        })
}
