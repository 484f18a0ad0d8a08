// SPDX-FileCopyrightText: 2026 Codevault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master key lifecycle: generate, load, and rotate the escrowed key.
//!
//! The vault uses an independent-copy escrow pattern:
//! - A random 32-byte master key protects every sealed payload.
//! - The master key is sealed three times, once under a key derived from
//!   each enrolled password via Argon2id, and each copy is stored in its own
//!   share file.
//! - Any single password opens its own share; this is not a threshold scheme.
//! - Rotating passwords re-wraps the same master key, so payloads sealed
//!   before the rotation stay readable.

use codevault_core::{MasterKey, Password, VaultError, VaultState, KEY_LEN, SHARE_COUNT};
use secrecy::ExposeSecret;
use tracing::{debug, info, warn};

use crate::crypto;
use crate::envelope::Envelope;
use crate::kdf;
use crate::settings::VaultSettings;

/// Owns the master key for one vault directory.
///
/// Debug output never includes the master key.
#[derive(Debug)]
pub struct MasterKeyStore {
    settings: VaultSettings,
    /// The unwrapped master key -- only in memory, never on disk.
    master_key: Option<MasterKey>,
}

impl MasterKeyStore {
    /// Create a locked store over the vault described by `settings`.
    pub fn new(settings: VaultSettings) -> Self {
        Self {
            settings,
            master_key: None,
        }
    }

    pub fn settings(&self) -> &VaultSettings {
        &self.settings
    }

    /// Whether any share file exists in the vault directory.
    pub fn is_initialized(&self) -> bool {
        !self.settings.layout.existing().is_empty()
    }

    pub fn state(&self) -> VaultState {
        if self.master_key.is_some() {
            VaultState::Unlocked
        } else if self.is_initialized() {
            VaultState::Locked
        } else {
            VaultState::Uninitialized
        }
    }

    /// The master key, if this store has generated or loaded it.
    pub fn master_key(&self) -> Option<&MasterKey> {
        self.master_key.as_ref()
    }

    /// Enroll three passwords around a freshly generated master key.
    ///
    /// Writes one share per password and leaves the store unlocked. Refuses
    /// to run against a vault that already holds shares, since that would
    /// orphan every payload sealed under the existing key.
    ///
    /// If the commit stops after some shares were written, those shares are
    /// removed again so the vault is back to uninitialized and the call can
    /// simply be repeated.
    pub fn generate_master_key(&mut self, passwords: &[Password]) -> Result<MasterKey, VaultError> {
        validate_passwords(passwords)?;
        if self.is_initialized() {
            return Err(VaultError::AlreadyInitialized);
        }

        let master_key = MasterKey::from_bytes(crypto::generate_random_key()?);
        let shares = self.wrap(&master_key, passwords)?;
        match self.settings.layout.commit(&shares) {
            Ok(()) => {}
            Err(VaultError::PartialCommit {
                committed, source, ..
            }) => {
                warn!(committed, "enrollment interrupted -- removing written shares");
                self.settings.layout.discard()?;
                return Err(VaultError::io(
                    "enrollment interrupted; written shares were removed, run it again",
                    source,
                ));
            }
            Err(e) => return Err(e),
        }

        info!(
            directory = %self.settings.layout.directory().display(),
            shares = SHARE_COUNT,
            "vault created"
        );
        self.master_key = Some(master_key.clone());
        Ok(master_key)
    }

    /// Unlock the vault with any one enrolled password.
    ///
    /// Every share is tried with the password-derived key, since nothing
    /// records which share belongs to which password. Returns
    /// [`VaultError::NotFound`] when no share files exist and
    /// [`VaultError::Crypto`] when none of them opens. A wrong password and a
    /// corrupted share are indistinguishable.
    pub fn load_master_key(&mut self, password: &Password) -> Result<MasterKey, VaultError> {
        let master_key = self.open_any_share(password)?;
        info!("master key loaded");
        self.master_key = Some(master_key.clone());
        Ok(master_key)
    }

    /// Re-wrap the held master key under three new passwords.
    ///
    /// The store must be unlocked, and `current_password` must still open one
    /// of the existing shares to the held key. The master key itself does not
    /// change. If the commit is interrupted after some shares were replaced,
    /// [`VaultError::PartialCommit`] is returned and the rotation should be
    /// run again with the same new passwords.
    pub fn update_master_key(
        &mut self,
        current_password: &Password,
        new_passwords: &[Password],
    ) -> Result<(), VaultError> {
        validate_passwords(new_passwords)?;
        let held = self.master_key.clone().ok_or(VaultError::Locked)?;

        // NotFound here means the shares vanished underneath us; treat like a mismatch.
        let verified = match self.open_any_share(current_password) {
            Ok(key) => key,
            Err(VaultError::NotFound(_)) => return Err(VaultError::Crypto),
            Err(e) => return Err(e),
        };
        if verified != held {
            warn!("current password opens a share for a different master key");
            return Err(VaultError::Crypto);
        }

        let shares = self.wrap(&held, new_passwords)?;
        self.settings.layout.commit(&shares)?;

        info!(shares = SHARE_COUNT, "vault passwords rotated");
        Ok(())
    }

    /// An encryption handle bound to the held master key.
    pub fn envelope(&self) -> Result<Envelope, VaultError> {
        self.master_key
            .clone()
            .map(Envelope::new)
            .ok_or(VaultError::Locked)
    }

    /// Drop the in-memory master key. The key bytes are zeroed.
    pub fn lock(&mut self) {
        if self.master_key.take().is_some() {
            debug!("master key dropped from memory");
        }
    }

    /// Seal `master_key` once per password, each with its own derived key and nonce.
    fn wrap(&self, master_key: &MasterKey, passwords: &[Password]) -> Result<Vec<String>, VaultError> {
        passwords
            .iter()
            .enumerate()
            .map(|(index, password)| -> Result<String, VaultError> {
                let wrapping_key = kdf::derive_key(password.expose_secret(), &self.settings.kdf)?;
                let sealed = crypto::seal(&wrapping_key, master_key.as_bytes())?;
                debug!(index, "share sealed");
                Ok(crypto::encode(&sealed))
            })
            .collect()
    }

    fn open_any_share(&self, password: &Password) -> Result<MasterKey, VaultError> {
        let layout = &self.settings.layout;
        let indices = layout.existing();
        if indices.is_empty() {
            return Err(VaultError::NotFound(format!(
                "no key shares in {}",
                layout.directory().display()
            )));
        }

        let candidate = kdf::derive_key(password.expose_secret(), &self.settings.kdf)?;

        for index in indices {
            let text = match layout.read(index) {
                Ok(Some(text)) => text,
                Ok(None) => continue,
                Err(e) => {
                    warn!(index, error = %e, "share unreadable -- skipping");
                    continue;
                }
            };

            let opened = crypto::decode(&text).and_then(|sealed| crypto::open(&candidate, &sealed));
            match opened {
                Ok(plaintext) => match <[u8; KEY_LEN]>::try_from(plaintext.as_slice()) {
                    Ok(bytes) => {
                        debug!(index, "share opened");
                        return Ok(MasterKey::from_bytes(bytes));
                    }
                    Err(_) => warn!(index, "share holds a value of the wrong length -- skipping"),
                },
                Err(_) => debug!(index, "share rejected"),
            }
        }

        Err(VaultError::Crypto)
    }
}

/// Exactly [`SHARE_COUNT`] non-empty, pairwise distinct passwords.
fn validate_passwords(passwords: &[Password]) -> Result<(), VaultError> {
    if passwords.len() != SHARE_COUNT {
        return Err(VaultError::Validation(format!(
            "exactly {SHARE_COUNT} passwords are required, got {}",
            passwords.len()
        )));
    }
    if passwords.iter().any(|p| p.expose_secret().is_empty()) {
        return Err(VaultError::Validation("passwords must not be empty".to_string()));
    }
    for (i, a) in passwords.iter().enumerate() {
        if passwords[i + 1..]
            .iter()
            .any(|b| a.expose_secret() == b.expose_secret())
        {
            return Err(VaultError::Validation("passwords must be distinct".to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdf::KdfParams;
    use crate::share::ShareLayout;
    use codevault_core::{NONCE_LEN, TAG_LEN};
    use tempfile::{tempdir, TempDir};
    use tracing_test::traced_test;

    fn password(s: &str) -> Password {
        Password::from(s.as_bytes().to_vec())
    }

    fn passwords(list: &[&str]) -> Vec<Password> {
        list.iter().map(|s| password(s)).collect()
    }

    /// Store with low-cost Argon2id parameters for fast tests.
    fn test_store() -> (MasterKeyStore, TempDir) {
        let dir = tempdir().unwrap();
        let layout = ShareLayout::new(dir.path().join("keyvault"), "master_key_{}.enc").unwrap();
        let kdf = KdfParams::new(vec![7u8; 16], 1, 1024, 1, KEY_LEN).unwrap();
        (MasterKeyStore::new(VaultSettings::new(layout, kdf)), dir)
    }

    fn share_bytes(store: &MasterKeyStore) -> Vec<Vec<u8>> {
        (0..SHARE_COUNT)
            .map(|i| std::fs::read(store.settings().layout.path(i)).unwrap())
            .collect()
    }

    #[test]
    fn fresh_store_is_uninitialized() {
        let (store, _dir) = test_store();
        assert_eq!(store.state(), VaultState::Uninitialized);
        assert!(store.master_key().is_none());
    }

    #[test]
    fn generate_writes_three_shares_and_unlocks() {
        let (mut store, _dir) = test_store();

        let key = store
            .generate_master_key(&passwords(&["a", "b", "c"]))
            .unwrap();

        assert_eq!(store.state(), VaultState::Unlocked);
        assert_eq!(store.master_key(), Some(&key));
        assert_eq!(store.settings().layout.existing(), vec![0, 1, 2]);
    }

    #[test]
    fn generate_rejects_wrong_count_without_side_effects() {
        let (mut store, _dir) = test_store();

        for list in [&["a", "b"][..], &["a", "b", "c", "d"][..], &[][..]] {
            let result = store.generate_master_key(&passwords(list));
            assert!(matches!(result, Err(VaultError::Validation(_))));
        }
        assert!(!store.settings().layout.directory().exists());
        assert_eq!(store.state(), VaultState::Uninitialized);
    }

    #[test]
    fn generate_rejects_duplicate_and_empty_passwords() {
        let (mut store, _dir) = test_store();

        let dup = store.generate_master_key(&passwords(&["a", "b", "a"]));
        assert!(matches!(dup, Err(VaultError::Validation(msg)) if msg.contains("distinct")));

        let empty = store.generate_master_key(&passwords(&["a", "", "c"]));
        assert!(matches!(empty, Err(VaultError::Validation(msg)) if msg.contains("empty")));
    }

    #[test]
    fn generate_refuses_initialized_vault() {
        let (mut store, _dir) = test_store();
        store
            .generate_master_key(&passwords(&["a", "b", "c"]))
            .unwrap();
        let before = share_bytes(&store);

        let again = store.generate_master_key(&passwords(&["d", "e", "f"]));
        assert!(matches!(again, Err(VaultError::AlreadyInitialized)));
        assert_eq!(share_bytes(&store), before);
    }

    #[test]
    fn interrupted_generate_rolls_back_and_can_be_repeated() {
        let (mut store, _dir) = test_store();
        let layout = store.settings().layout.clone();

        // A non-empty directory at share 1's path makes its rename fail after share 0 landed.
        let blocker = layout.path(1);
        std::fs::create_dir_all(blocker.join("occupied")).unwrap();

        let result = store.generate_master_key(&passwords(&["a", "b", "c"]));
        assert!(matches!(result, Err(VaultError::Io { .. })), "got {result:?}");
        assert!(layout.existing().is_empty());
        assert_eq!(store.state(), VaultState::Uninitialized);
        assert!(store.master_key().is_none());

        std::fs::remove_dir_all(&blocker).unwrap();

        let key = store
            .generate_master_key(&passwords(&["a", "b", "c"]))
            .unwrap();
        assert_eq!(layout.existing(), vec![0, 1, 2]);
        for pw in ["a", "b", "c"] {
            let mut fresh = MasterKeyStore::new(store.settings().clone());
            assert_eq!(fresh.load_master_key(&password(pw)).unwrap(), key);
        }
    }

    #[test]
    fn any_of_three_passwords_recovers_same_key() {
        let (mut store, _dir) = test_store();
        let key = store
            .generate_master_key(&passwords(&["a", "b", "c"]))
            .unwrap();

        for pw in ["a", "b", "c"] {
            let mut fresh = MasterKeyStore::new(store.settings().clone());
            assert_eq!(fresh.state(), VaultState::Locked);
            assert_eq!(fresh.load_master_key(&password(pw)).unwrap(), key);
            assert_eq!(fresh.state(), VaultState::Unlocked);
        }
    }

    #[test]
    fn shares_are_independent_ciphertexts() {
        let (mut store, _dir) = test_store();
        store
            .generate_master_key(&passwords(&["a", "b", "c"]))
            .unwrap();

        let shares = share_bytes(&store);
        assert_ne!(shares[0], shares[1]);
        assert_ne!(shares[1], shares[2]);
        assert_ne!(shares[0], shares[2]);
    }

    #[test]
    fn wrong_password_fails_and_leaves_shares_untouched() {
        let (mut store, _dir) = test_store();
        store
            .generate_master_key(&passwords(&["a", "b", "c"]))
            .unwrap();
        let before = share_bytes(&store);

        let mut fresh = MasterKeyStore::new(store.settings().clone());
        let result = fresh.load_master_key(&password("wrong"));

        assert!(matches!(result, Err(VaultError::Crypto)));
        assert_eq!(fresh.state(), VaultState::Locked);
        assert_eq!(share_bytes(&store), before);
    }

    #[test]
    fn load_without_shares_is_not_found() {
        let (mut store, _dir) = test_store();
        let result = store.load_master_key(&password("a"));
        assert!(matches!(result, Err(VaultError::NotFound(_))));
    }

    #[test]
    fn load_skips_corrupt_shares() {
        let (mut store, _dir) = test_store();
        let key = store
            .generate_master_key(&passwords(&["a", "b", "c"]))
            .unwrap();

        // Garbage in share 0 must not stop the scan from reaching the others.
        std::fs::write(store.settings().layout.path(0), b"\x00\xffnot base64").unwrap();

        let mut fresh = MasterKeyStore::new(store.settings().clone());
        assert_eq!(fresh.load_master_key(&password("c")).unwrap(), key);
    }

    #[test]
    fn update_requires_unlocked_store() {
        let (mut store, _dir) = test_store();
        store
            .generate_master_key(&passwords(&["a", "b", "c"]))
            .unwrap();

        let mut fresh = MasterKeyStore::new(store.settings().clone());
        let result = fresh.update_master_key(&password("a"), &passwords(&["x", "y", "z"]));
        assert!(matches!(result, Err(VaultError::Locked)));
    }

    #[test]
    fn update_validates_count_before_anything_else() {
        let (mut store, _dir) = test_store();
        // Locked and uninitialized, but the count check comes first.
        let result = store.update_master_key(&password("a"), &passwords(&["x", "y"]));
        assert!(matches!(result, Err(VaultError::Validation(_))));
    }

    #[test]
    fn update_rejects_wrong_current_password() {
        let (mut store, _dir) = test_store();
        store
            .generate_master_key(&passwords(&["a", "b", "c"]))
            .unwrap();
        let before = share_bytes(&store);

        let result = store.update_master_key(&password("nope"), &passwords(&["x", "y", "z"]));
        assert!(matches!(result, Err(VaultError::Crypto)));
        assert_eq!(share_bytes(&store), before);
    }

    #[test]
    fn update_preserves_key_and_swaps_passwords() {
        let (mut store, _dir) = test_store();
        let key = store
            .generate_master_key(&passwords(&["a", "b", "c"]))
            .unwrap();
        let token = store.envelope().unwrap().encrypt(b"ABCD-1234").unwrap();

        store
            .update_master_key(&password("b"), &passwords(&["x", "y", "z"]))
            .unwrap();
        assert_eq!(store.master_key(), Some(&key));

        let mut fresh = MasterKeyStore::new(store.settings().clone());
        assert!(matches!(
            fresh.load_master_key(&password("a")),
            Err(VaultError::Crypto)
        ));
        for pw in ["x", "y", "z"] {
            assert_eq!(fresh.load_master_key(&password(pw)).unwrap(), key);
        }
        let envelope = fresh.envelope().unwrap();
        assert_eq!(envelope.decrypt(&token).unwrap().as_slice(), b"ABCD-1234");
    }

    #[test]
    fn tampered_share_fails_only_for_its_password() {
        let (mut store, _dir) = test_store();
        let names = ["a", "b", "c"];
        let key = store.generate_master_key(&passwords(&names)).unwrap();
        let layout = store.settings().layout.clone();

        // Share i is sealed under names[i]. Positions cover the nonce, the
        // ciphertext body, and the tag of the 60-byte sealed key.
        let sealed_len = NONCE_LEN + KEY_LEN + TAG_LEN;
        let positions = [
            0,
            NONCE_LEN - 1,
            NONCE_LEN,
            NONCE_LEN + 17,
            sealed_len - TAG_LEN,
            sealed_len - 1,
        ];

        for index in 0..SHARE_COUNT {
            let path = layout.path(index);
            let original = std::fs::read_to_string(&path).unwrap();

            for &pos in &positions {
                let mut raw = crypto::decode(&original).unwrap();
                assert_eq!(raw.len(), sealed_len);
                raw[pos] ^= 0x01;
                std::fs::write(&path, crypto::encode(&raw)).unwrap();

                let mut fresh = MasterKeyStore::new(store.settings().clone());
                let own = fresh.load_master_key(&password(names[index]));
                assert!(
                    matches!(own, Err(VaultError::Crypto)),
                    "flip at byte {pos} of share {index} went unnoticed"
                );
                for (other, pw) in names.iter().enumerate().filter(|&(i, _)| i != index) {
                    let mut fresh = MasterKeyStore::new(store.settings().clone());
                    assert_eq!(
                        fresh.load_master_key(&password(pw)).unwrap(),
                        key,
                        "share {other} stopped working after share {index} was altered"
                    );
                }
            }

            std::fs::write(&path, &original).unwrap();
        }
    }

    #[test]
    fn envelope_requires_unlocked_store() {
        let (store, _dir) = test_store();
        assert!(matches!(store.envelope(), Err(VaultError::Locked)));
    }

    #[test]
    fn lock_drops_key() {
        let (mut store, _dir) = test_store();
        store
            .generate_master_key(&passwords(&["a", "b", "c"]))
            .unwrap();

        store.lock();
        assert_eq!(store.state(), VaultState::Locked);
        assert!(store.master_key().is_none());
    }

    #[test]
    fn debug_output_redacts_key() {
        let (mut store, _dir) = test_store();
        store
            .generate_master_key(&passwords(&["a", "b", "c"]))
            .unwrap();
        assert!(format!("{store:?}").contains("[REDACTED]"));
    }

    #[traced_test]
    #[test]
    fn failed_load_logs_without_secrets() {
        let (mut store, _dir) = test_store();
        store
            .generate_master_key(&passwords(&["alpha", "bravo", "charlie"]))
            .unwrap();

        let mut fresh = MasterKeyStore::new(store.settings().clone());
        let _ = fresh.load_master_key(&password("hunter2-guess"));

        assert!(logs_contain("share rejected"));
        assert!(!logs_contain("hunter2-guess"));
        assert!(!logs_contain("alpha"));
    }
}
