// SPDX-FileCopyrightText: 2026 Codevault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Password-escrowed master key and AES-256-GCM envelope for codevault.
//!
//! A random master key seals every stored payload. The master key itself is
//! escrowed as three independent shares, each sealed under a key derived
//! from one enrolled password via Argon2id. Any single password unlocks the
//! vault.
//!
//! Collaborators see four operations:
//! [`MasterKeyStore::generate_master_key`], [`MasterKeyStore::load_master_key`],
//! [`MasterKeyStore::update_master_key`], and the [`envelope`] pair
//! `encrypt` / `decrypt`.

pub mod crypto;
pub mod envelope;
pub mod kdf;
pub mod prompt;
pub mod settings;
pub mod share;
pub mod store;

pub use codevault_core::{MasterKey, Password, VaultError, VaultState};
pub use envelope::{decrypt, encrypt, Envelope};
pub use prompt::{get_enrollment_passwords, get_password};
pub use settings::VaultSettings;
pub use store::MasterKeyStore;
