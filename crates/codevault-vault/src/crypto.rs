// SPDX-FileCopyrightText: 2026 Codevault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AES-256-GCM seal/open operations and the text encoding of
//! sealed bytes.
//!
//! Every call to [`seal`] generates a fresh random 96-bit nonce via the system
//! CSPRNG. Nonce reuse would be catastrophic for GCM security.
//!
//! Sealed data travels as `nonce ‖ ciphertext ‖ tag`, standard base64 encoded.
//! Key shares and payload tokens share this layout.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use codevault_core::{VaultError, KEY_LEN, NONCE_LEN, TAG_LEN};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

/// Encrypt plaintext with AES-256-GCM using a random 96-bit nonce and no
/// associated data.
///
/// Returns `nonce ‖ ciphertext ‖ tag`, exactly `12 + plaintext.len() + 16`
/// bytes long.
pub fn seal(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<Vec<u8>, VaultError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| VaultError::Internal("failed to create AES-256-GCM key".to_string()))?;
    let less_safe = LessSafeKey::new(unbound);

    let rng = SystemRandom::new();
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill(&mut nonce_bytes)
        .map_err(|_| VaultError::Internal("failed to generate random nonce".to_string()))?;

    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    // Seal in place: the plaintext copy is extended with the authentication tag.
    let mut in_out = Zeroizing::new(plaintext.to_vec());
    less_safe
        .seal_in_place_append_tag(nonce, Aad::empty(), &mut *in_out)
        .map_err(|_| VaultError::Internal("AES-256-GCM encryption failed".to_string()))?;

    let mut sealed = Vec::with_capacity(NONCE_LEN + in_out.len());
    sealed.extend_from_slice(&nonce_bytes);
    sealed.extend_from_slice(&in_out);
    Ok(sealed)
}

/// Decrypt `nonce ‖ ciphertext ‖ tag` produced by [`seal`].
///
/// Input too short to hold a nonce and tag, a wrong key, and a tag mismatch
/// all return [`VaultError::Crypto`]; no partial plaintext is ever returned.
pub fn open(key: &[u8; KEY_LEN], sealed: &[u8]) -> Result<Zeroizing<Vec<u8>>, VaultError> {
    if sealed.len() < NONCE_LEN + TAG_LEN {
        return Err(VaultError::Crypto);
    }
    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
    let nonce = Nonce::try_assume_unique_for_key(nonce_bytes).map_err(|_| VaultError::Crypto)?;

    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| VaultError::Internal("failed to create AES-256-GCM key".to_string()))?;
    let less_safe = LessSafeKey::new(unbound);

    let mut in_out = Zeroizing::new(ciphertext.to_vec());
    let plaintext_len = less_safe
        .open_in_place(nonce, Aad::empty(), &mut *in_out)
        .map_err(|_| VaultError::Crypto)?
        .len();
    in_out.truncate(plaintext_len);

    Ok(in_out)
}

/// Generate a random 32-byte key suitable for AES-256-GCM.
pub fn generate_random_key() -> Result<[u8; KEY_LEN], VaultError> {
    let rng = SystemRandom::new();
    let mut key = [0u8; KEY_LEN];
    rng.fill(&mut key)
        .map_err(|_| VaultError::Internal("failed to generate random key".to_string()))?;
    Ok(key)
}

/// Encode sealed bytes as standard base64 text.
pub fn encode(sealed: &[u8]) -> String {
    STANDARD.encode(sealed)
}

/// Decode base64 text back into sealed bytes.
///
/// Surrounding whitespace (such as a trailing newline added by an editor) is
/// ignored. Anything else that fails to decode is reported as
/// [`VaultError::Crypto`], the same as a failed tag check.
pub fn decode(text: &str) -> Result<Vec<u8>, VaultError> {
    STANDARD.decode(text.trim()).map_err(|_| VaultError::Crypto)
}
