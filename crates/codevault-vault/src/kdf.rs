// SPDX-FileCopyrightText: 2026 Codevault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argon2id key derivation from a password.
//!
//! Derives a 32-byte wrapping key using Argon2id (Algorithm::Argon2id,
//! Version::V0x13) with a fixed, configured salt. The memory and time cost
//! are the brute-force protection for every enrolled password.

use codevault_core::{VaultError, KEY_LEN, MIN_SALT_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

/// Length of salts produced by [`generate_salt`].
pub const SALT_LEN: usize = 16;

/// Validated Argon2id inputs: the fixed salt plus cost parameters.
///
/// Construction fails with [`VaultError::Config`] for values Argon2id rejects
/// or an output length other than [`KEY_LEN`], so derivation itself has no
/// parameter errors left to report.
#[derive(Debug, Clone)]
pub struct KdfParams {
    salt: Vec<u8>,
    params: argon2::Params,
}

impl KdfParams {
    /// Validate and bundle derivation parameters.
    ///
    /// `memory_cost` is in KiB.
    pub fn new(
        salt: Vec<u8>,
        time_cost: u32,
        memory_cost: u32,
        parallelism: u32,
        length: usize,
    ) -> Result<Self, VaultError> {
        if length != KEY_LEN {
            return Err(VaultError::Config(format!(
                "Argon2id output length must be {KEY_LEN} bytes, got {length}"
            )));
        }
        if salt.len() < MIN_SALT_LEN {
            return Err(VaultError::Config(format!(
                "salt must be at least {MIN_SALT_LEN} bytes, got {}",
                salt.len()
            )));
        }
        let params = argon2::Params::new(memory_cost, time_cost, parallelism, Some(length))
            .map_err(|e| VaultError::Config(format!("invalid Argon2id parameters: {e}")))?;

        Ok(Self { salt, params })
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn time_cost(&self) -> u32 {
        self.params.t_cost()
    }

    pub fn memory_cost(&self) -> u32 {
        self.params.m_cost()
    }

    pub fn parallelism(&self) -> u32 {
        self.params.p_cost()
    }
}

/// Derive a 32-byte key from a password using Argon2id.
///
/// Deterministic for fixed inputs. The returned key is wrapped in
/// [`Zeroizing`] for automatic memory zeroing on drop.
pub fn derive_key(
    password: &[u8],
    params: &KdfParams,
) -> Result<Zeroizing<[u8; KEY_LEN]>, VaultError> {
    let argon2 = argon2::Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params.params.clone(),
    );

    let mut output = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(password, &params.salt, output.as_mut())
        .map_err(|e| VaultError::Internal(format!("Argon2id key derivation failed: {e}")))?;

    Ok(output)
}

/// Generate a random 16-byte salt for the vault configuration.
pub fn generate_salt() -> Result<[u8; SALT_LEN], VaultError> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| VaultError::Internal("failed to generate random salt".to_string()))?;
    Ok(salt)
}
