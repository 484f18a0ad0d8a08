// SPDX-FileCopyrightText: 2026 Codevault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the codevault master-key vault.

use thiserror::Error;

/// The error type returned by every key-management and envelope operation.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Missing or invalid salt, Argon2id cost parameters, or share template.
    #[error("configuration error: {0}")]
    Config(String),

    /// Caller input rejected before any I/O or cryptography took place.
    #[error("validation error: {0}")]
    Validation(String),

    /// The vault directory or a share file could not be read or written.
    #[error("{context}: {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },

    /// AEAD open failed.
    ///
    /// Wrong passwords, wrong keys, tampered ciphertext and malformed tokens
    /// all surface as this single variant.
    #[error("decryption failed -- wrong password or corrupted data")]
    Crypto,

    /// No key share was available to try.
    #[error("not found: {0}")]
    NotFound(String),

    /// The operation needs the master key in memory, but the store is locked.
    #[error("vault is locked -- load the master key first")]
    Locked,

    /// Enrollment was attempted against a vault that already holds shares.
    #[error("vault is already initialized -- use rotation to change passwords")]
    AlreadyInitialized,

    /// Some staged share files were renamed into place before a failure.
    ///
    /// The vault now mixes shares under old and new passwords. Re-running
    /// the same operation restores a consistent set.
    #[error(
        "share commit interrupted after {committed} of {total} files were replaced \
         -- re-run the operation: {source}"
    )]
    PartialCommit {
        committed: usize,
        total: usize,
        source: std::io::Error,
    },

    /// Failures of the random source or primitives that are not caller errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl VaultError {
    /// Wrap an I/O error with a short description of what was being attempted.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}
