// SPDX-FileCopyrightText: 2026 Codevault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Password acquisition via TTY prompt or `CODEVAULT_PASSWORD*` environment variables.

use codevault_core::{Password, VaultError, SHARE_COUNT};

/// Environment variable holding the password used to unlock the vault.
pub const PASSWORD_ENV_VAR: &str = "CODEVAULT_PASSWORD";

/// Prefix of the numbered variables (`CODEVAULT_PASSWORD_1` ..
/// `CODEVAULT_PASSWORD_3`) holding the passwords to enroll.
pub const ENROLLMENT_ENV_PREFIX: &str = "CODEVAULT_PASSWORD_";

/// Get the unlock password from the environment or an interactive prompt.
///
/// Priority:
/// 1. `CODEVAULT_PASSWORD` environment variable (for scripts and CI)
/// 2. Interactive TTY prompt via `rpassword`
pub fn get_password(label: &str) -> Result<Password, VaultError> {
    if let Some(password) = non_empty_env(PASSWORD_ENV_VAR) {
        return Ok(password);
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        let password = read_tty(&format!("{label}: "))?;
        if password.is_empty() {
            return Err(VaultError::Validation("empty password not allowed".to_string()));
        }
        return Ok(Password::from(password.as_bytes().to_vec()));
    }

    Err(VaultError::Validation(format!(
        "No password provided. Set {PASSWORD_ENV_VAR} or run interactively."
    )))
}

/// Get the three passwords to enroll.
///
/// Uses `CODEVAULT_PASSWORD_1..3` when all three are set. Otherwise prompts
/// for each password twice on the TTY and rejects mismatched confirmations.
pub fn get_enrollment_passwords() -> Result<Vec<Password>, VaultError> {
    let from_env: Vec<Password> = (1..=SHARE_COUNT)
        .filter_map(|n| non_empty_env(&format!("{ENROLLMENT_ENV_PREFIX}{n}")))
        .collect();
    if from_env.len() == SHARE_COUNT {
        return Ok(from_env);
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        let mut passwords = Vec::with_capacity(SHARE_COUNT);
        for n in 1..=SHARE_COUNT {
            let first = read_tty(&format!("New password {n} of {SHARE_COUNT}: "))?;
            let second = read_tty(&format!("Confirm password {n}: "))?;
            if first != second {
                return Err(VaultError::Validation(format!(
                    "password {n} confirmation does not match"
                )));
            }
            if first.is_empty() {
                return Err(VaultError::Validation("empty password not allowed".to_string()));
            }
            passwords.push(Password::from(first.as_bytes().to_vec()));
        }
        return Ok(passwords);
    }

    Err(VaultError::Validation(format!(
        "No passwords provided. Set {ENROLLMENT_ENV_PREFIX}1..{SHARE_COUNT} or run interactively."
    )))
}

fn non_empty_env(name: &str) -> Option<Password> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .map(|value| Password::from(value.into_bytes()))
}

fn read_tty(prompt: &str) -> Result<zeroize::Zeroizing<String>, VaultError> {
    rpassword::prompt_password(prompt)
        .map(zeroize::Zeroizing::new)
        .map_err(|e| VaultError::io("failed to read password", e))
}
