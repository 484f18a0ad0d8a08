// SPDX-FileCopyrightText: 2026 Codevault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key material, password, and vault-state types shared across the workspace.

use secrecy::SecretSlice;
use strum::Display;
use zeroize::Zeroizing;

/// AES-256-GCM key length in bytes. Also the required Argon2id output length.
pub const KEY_LEN: usize = 32;

/// AES-GCM nonce length in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Number of independently enrolled passwords, and therefore of share files.
pub const SHARE_COUNT: usize = 3;

/// Shortest salt Argon2 accepts, in bytes.
pub const MIN_SALT_LEN: usize = 8;

/// Slot in the share filename template replaced by the share index.
pub const INDEX_PLACEHOLDER: &str = "{}";

/// Check a share filename template.
///
/// The template must hold exactly one [`INDEX_PLACEHOLDER`] and no path
/// separators. The error describes the problem without naming the setting, so
/// callers can prefix it with their own context.
pub fn check_share_pattern(pattern: &str) -> Result<(), String> {
    let slots = pattern.matches(INDEX_PLACEHOLDER).count();
    if slots != 1 {
        return Err(format!(
            "must contain exactly one `{INDEX_PLACEHOLDER}`, found {slots} in `{pattern}`"
        ));
    }
    if pattern.contains('/') || pattern.contains('\\') {
        return Err(format!("must be a file name, not a path: `{pattern}`"));
    }
    Ok(())
}

/// An enrolled password. Opaque bytes, zeroed on drop, never persisted.
pub type Password = SecretSlice<u8>;

/// The 32-byte symmetric secret protecting every sealed payload.
///
/// The bytes are zeroed when the value is dropped, and `Debug` output
/// never shows them.
#[derive(Clone)]
pub struct MasterKey(Zeroizing<[u8; KEY_LEN]>);

impl MasterKey {
    /// Take ownership of raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Borrow the raw key bytes for sealing and opening.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MasterKey").field(&"[REDACTED]").finish()
    }
}

// Constant-time so comparing a candidate against the held key leaks no prefix length.
impl PartialEq for MasterKey {
    fn eq(&self, other: &Self) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl Eq for MasterKey {}

/// Lifecycle state of a vault directory as seen by one store instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum VaultState {
    /// No share files exist yet.
    Uninitialized,
    /// Shares exist but the master key is not held in memory.
    Locked,
    /// The master key is held in memory.
    Unlocked,
}
