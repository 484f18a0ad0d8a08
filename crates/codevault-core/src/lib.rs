// SPDX-FileCopyrightText: 2026 Codevault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core types for the codevault master-key vault.
//!
//! This crate holds what every other codevault crate agrees on: the error
//! taxonomy, the in-memory representations of key material and passwords, and
//! the fixed sizes of the AES-256-GCM construction.

pub mod error;
pub mod types;

pub use error::VaultError;
pub use types::{
    check_share_pattern, MasterKey, Password, VaultState, INDEX_PLACEHOLDER, KEY_LEN,
    MIN_SALT_LEN, NONCE_LEN, SHARE_COUNT, TAG_LEN,
};
