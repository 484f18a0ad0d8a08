// SPDX-FileCopyrightText: 2026 Codevault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolved runtime settings for a vault, built once from configuration.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use codevault_config::CodevaultConfig;
use codevault_core::VaultError;

use crate::kdf::KdfParams;
use crate::share::ShareLayout;

/// Everything a [`MasterKeyStore`](crate::MasterKeyStore) needs to know
/// about its vault: where the shares live and how passwords are derived.
#[derive(Debug, Clone)]
pub struct VaultSettings {
    pub layout: ShareLayout,
    pub kdf: KdfParams,
}

impl VaultSettings {
    pub fn new(layout: ShareLayout, kdf: KdfParams) -> Self {
        Self { layout, kdf }
    }

    /// Decode the salt and check every parameter.
    ///
    /// Fails with [`VaultError::Config`] on a missing or undecodable salt,
    /// invalid Argon2id costs, or a malformed share template.
    pub fn from_config(config: &CodevaultConfig) -> Result<Self, VaultError> {
        let encoded = config
            .vault
            .salt
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| VaultError::Config("vault.salt is not set".to_string()))?;
        let salt = STANDARD
            .decode(encoded)
            .map_err(|e| VaultError::Config(format!("vault.salt is not valid base64: {e}")))?;

        let kdf = KdfParams::new(
            salt,
            config.kdf.time_cost,
            config.kdf.memory_cost,
            config.kdf.parallelism,
            config.kdf.length,
        )?;
        let layout = ShareLayout::new(
            config.vault.directory.clone(),
            config.vault.share_file_pattern.clone(),
        )?;

        Ok(Self::new(layout, kdf))
    }
}
