// SPDX-FileCopyrightText: 2026 Codevault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `codevault init|unlock|rotate|seal|open|salt` command implementations.

use std::io::{IsTerminal, Read, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use codevault_config::CodevaultConfig;
use codevault_core::VaultError;
use codevault_vault::{kdf, prompt, MasterKeyStore, VaultSettings};
use zeroize::Zeroizing;

fn open_store(config: &CodevaultConfig) -> Result<MasterKeyStore, VaultError> {
    Ok(MasterKeyStore::new(VaultSettings::from_config(config)?))
}

/// Build a store and unlock it with the `CODEVAULT_PASSWORD` / prompted password.
fn unlocked_store(config: &CodevaultConfig, label: &str) -> Result<MasterKeyStore, VaultError> {
    let mut store = open_store(config)?;
    let password = prompt::get_password(label)?;
    store.load_master_key(&password)?;
    Ok(store)
}

/// Run `codevault init`.
pub fn run_init(config: &CodevaultConfig) -> Result<(), VaultError> {
    let mut store = open_store(config)?;
    if store.is_initialized() {
        return Err(VaultError::AlreadyInitialized);
    }

    let passwords = prompt::get_enrollment_passwords()?;
    store.generate_master_key(&passwords)?;

    println!(
        "vault initialized: {} shares written to {}",
        passwords.len(),
        store.settings().layout.directory().display()
    );
    Ok(())
}

/// Run `codevault unlock`.
pub fn run_unlock(config: &CodevaultConfig) -> Result<(), VaultError> {
    unlocked_store(config, "Password")?;
    println!("master key loaded");
    Ok(())
}

/// Run `codevault rotate`.
///
/// The current password both unlocks the store and re-verifies the
/// enrollment before any share is replaced.
pub fn run_rotate(config: &CodevaultConfig) -> Result<(), VaultError> {
    let mut store = open_store(config)?;
    let current = prompt::get_password("Current password")?;
    store.load_master_key(&current)?;

    let new_passwords = prompt::get_enrollment_passwords()?;
    store.update_master_key(&current, &new_passwords)?;

    println!("passwords rotated; master key unchanged");
    Ok(())
}

/// Run `codevault seal`: stdin in, token out.
///
/// A single trailing newline is stripped so `echo CODE | codevault seal`
/// seals just the code.
pub fn run_seal(config: &CodevaultConfig) -> Result<(), VaultError> {
    let store = unlocked_store(config, "Password")?;

    let mut input = Zeroizing::new(Vec::new());
    std::io::stdin()
        .read_to_end(&mut input)
        .map_err(|e| VaultError::io("failed to read stdin", e))?;
    let plaintext = strip_trailing_newline(&input);

    let token = store.envelope()?.encrypt(plaintext)?;
    println!("{token}");
    Ok(())
}

/// Run `codevault open <TOKEN>`.
pub fn run_open(config: &CodevaultConfig, token: &str) -> Result<(), VaultError> {
    let store = unlocked_store(config, "Password")?;
    let plaintext = store.envelope()?.decrypt(token)?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(&plaintext)
        .map_err(|e| VaultError::io("failed to write plaintext", e))?;
    if stdout.is_terminal() {
        let _ = writeln!(stdout);
    }
    Ok(())
}

/// Run `codevault salt`.
pub fn run_salt() -> Result<(), VaultError> {
    let salt = kdf::generate_salt()?;
    println!("{}", STANDARD.encode(salt));
    Ok(())
}

fn strip_trailing_newline(input: &[u8]) -> &[u8] {
    let input = input.strip_suffix(b"\n").unwrap_or(input);
    input.strip_suffix(b"\r").unwrap_or(input)
}
