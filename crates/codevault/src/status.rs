// SPDX-FileCopyrightText: 2026 Codevault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `codevault status` command implementation.
//!
//! Reports the vault state without asking for a password.

use codevault_config::CodevaultConfig;
use codevault_core::{VaultError, SHARE_COUNT};
use codevault_vault::{MasterKeyStore, VaultSettings};
use serde::Serialize;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub state: String,
    pub directory: String,
    pub shares_present: Vec<usize>,
    pub shares_expected: usize,
}

pub fn collect_status(store: &MasterKeyStore) -> StatusResponse {
    StatusResponse {
        state: store.state().to_string(),
        directory: store.settings().layout.directory().display().to_string(),
        shares_present: store.settings().layout.existing(),
        shares_expected: SHARE_COUNT,
    }
}

/// Run the `codevault status` command.
pub fn run_status(config: &CodevaultConfig, json: bool) -> Result<(), VaultError> {
    let store = MasterKeyStore::new(VaultSettings::from_config(config)?);
    let status = collect_status(&store);

    if json {
        let out = serde_json::to_string_pretty(&status)
            .map_err(|e| VaultError::Internal(format!("failed to serialize status: {e}")))?;
        println!("{out}");
        return Ok(());
    }

    println!("state:     {}", status.state);
    println!("directory: {}", status.directory);
    println!(
        "shares:    {} of {} present",
        status.shares_present.len(),
        status.shares_expected
    );
    if !status.shares_present.is_empty() && status.shares_present.len() < SHARE_COUNT {
        println!("warning:   some shares are missing; rotate to restore a full set");
    }
    Ok(())
}
