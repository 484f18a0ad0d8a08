// SPDX-FileCopyrightText: 2026 Codevault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authenticated-encryption envelope for arbitrary payloads under the master key.
//!
//! A token is the base64 text of `nonce(12) ‖ ciphertext ‖ tag(16)`. Every
//! failure to open a token, whatever the cause, is [`VaultError::Crypto`].

use codevault_core::{MasterKey, VaultError};
use zeroize::Zeroizing;

use crate::crypto;

/// Seal `plaintext` under `key` with a fresh nonce and return the text token.
pub fn encrypt(plaintext: &[u8], key: &MasterKey) -> Result<String, VaultError> {
    let sealed = crypto::seal(key.as_bytes(), plaintext)?;
    Ok(crypto::encode(&sealed))
}

/// Open a token produced by [`encrypt`].
pub fn decrypt(token: &str, key: &MasterKey) -> Result<Zeroizing<Vec<u8>>, VaultError> {
    let sealed = crypto::decode(token)?;
    crypto::open(key.as_bytes(), &sealed)
}

/// An encryption handle bound to one master key.
///
/// Handed to collaborators that store opaque tokens, so they never touch the
/// key itself.
#[derive(Debug, Clone)]
pub struct Envelope {
    key: MasterKey,
}

impl Envelope {
    pub fn new(key: MasterKey) -> Self {
        Self { key }
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Result<String, VaultError> {
        encrypt(plaintext, &self.key)
    }

    pub fn decrypt(&self, token: &str) -> Result<Zeroizing<Vec<u8>>, VaultError> {
        decrypt(token, &self.key)
    }
}
