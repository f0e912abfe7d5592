//! The vault key and the codec that wraps it under the KEK.
//!
//! A vault has one random 256-bit key, generated at creation and used
//! for every item. It is persisted only in wrapped form: AES-256-GCM
//! under the key-encryption-key derived from the master password. The
//! persisted bundle is `{encryptedVaultKey, salt, kdfParams}`, where
//! `encryptedVaultKey` is `base64(nonce || ciphertext)` on the wire.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use super::kdf::{derive_kek, generate_salt, KdfParams, Kek};
use crate::errors::{Result, VaultError};

/// Length of the vault key in bytes (256 bits).
pub const VAULT_KEY_LEN: usize = 32;

/// Length of the AES-256-GCM nonce in bytes.
const NONCE_LEN: usize = 12;

/// The vault's symmetric item-encryption key.
///
/// This is the single most sensitive runtime value in the system. It is
/// decrypted into memory only after a successful unlock, owned by
/// exactly one session, and its bytes are zeroed when dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct VaultKey {
    bytes: [u8; VAULT_KEY_LEN],
}

impl VaultKey {
    /// Generate a fresh random vault key. Called once, at vault creation.
    pub fn generate() -> Self {
        let mut bytes = [0u8; VAULT_KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Create a `VaultKey` from raw bytes.
    pub fn new(bytes: [u8; VAULT_KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes (e.g. to build an AEAD cipher).
    pub fn as_bytes(&self) -> &[u8; VAULT_KEY_LEN] {
        &self.bytes
    }
}

/// The vault key in wrapped (persisted) form: nonce + ciphertext + tag.
///
/// Serializes as a single base64 string of `nonce(12B) || ciphertext`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedVaultKey {
    nonce: Vec<u8>,
    ciphertext: Vec<u8>,
}

impl EncryptedVaultKey {
    /// Concatenate into the wire layout: `nonce || ciphertext`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.nonce.len() + self.ciphertext.len());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Split the wire layout back into nonce and ciphertext.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < NONCE_LEN {
            return Err(VaultError::Serialization(
                "encrypted vault key too short to contain a nonce".into(),
            ));
        }
        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
        Ok(Self {
            nonce: nonce.to_vec(),
            ciphertext: ciphertext.to_vec(),
        })
    }
}

impl Serialize for EncryptedVaultKey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&BASE64.encode(self.to_bytes()))
    }
}

impl<'de> Deserialize<'de> for EncryptedVaultKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = BASE64.decode(&s).map_err(serde::de::Error::custom)?;
        Self::from_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}

/// Wrap the vault key under the KEK.
///
/// A fresh random nonce is generated inside this call — there is no way
/// to supply one, so nonce reuse is ruled out structurally rather than
/// by convention.
pub fn wrap(vault_key: &VaultKey, kek: &Kek) -> Result<EncryptedVaultKey> {
    let cipher = Aes256Gcm::new_from_slice(kek.as_bytes())
        .map_err(|e| VaultError::EncryptionFailed(format!("invalid KEK length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, vault_key.as_bytes().as_slice())
        .map_err(|e| VaultError::EncryptionFailed(format!("wrap error: {e}")))?;

    Ok(EncryptedVaultKey {
        nonce: nonce.to_vec(),
        ciphertext,
    })
}

/// Unwrap the vault key using the KEK.
///
/// Fails closed with `AuthenticationFailure` on any tag mismatch —
/// wrong password, corrupted data, or tampering all look the same, and
/// no intermediate bytes are ever returned.
pub fn unwrap(encrypted: &EncryptedVaultKey, kek: &Kek) -> Result<VaultKey> {
    if encrypted.nonce.len() != NONCE_LEN {
        return Err(VaultError::AuthenticationFailure);
    }

    let cipher = Aes256Gcm::new_from_slice(kek.as_bytes())
        .map_err(|_| VaultError::AuthenticationFailure)?;

    let nonce = Nonce::from_slice(&encrypted.nonce);

    let mut plaintext = cipher
        .decrypt(nonce, encrypted.ciphertext.as_slice())
        .map_err(|_| VaultError::AuthenticationFailure)?;

    if plaintext.len() != VAULT_KEY_LEN {
        plaintext.zeroize();
        return Err(VaultError::AuthenticationFailure);
    }

    let mut bytes = [0u8; VAULT_KEY_LEN];
    bytes.copy_from_slice(&plaintext);
    plaintext.zeroize();

    let key = VaultKey::new(bytes);
    bytes.zeroize();
    Ok(key)
}

/// The persisted unlock bundle: everything the client needs to turn a
/// master password back into the vault key.
///
/// Only meaningful as a whole — the encrypted vault key cannot be
/// unwrapped without the exact salt and KDF parameters it was created
/// with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultKeyBundle {
    /// The wrapped vault key, `base64(nonce || ciphertext)` on the wire.
    pub encrypted_vault_key: EncryptedVaultKey,

    /// The KDF salt, generated once per vault and immutable afterwards.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub salt: Vec<u8>,

    /// The KDF parameters the salt was used with.
    pub kdf_params: KdfParams,
}

impl VaultKeyBundle {
    /// Create a brand-new vault bundle.
    ///
    /// Generates a random salt and a random vault key, derives the KEK
    /// from the master password, and wraps the vault key under it.
    /// Returns the bundle together with the still-unlocked vault key so
    /// the caller can start a session without a second derivation.
    pub fn create(master_password: &[u8], kdf_params: KdfParams) -> Result<(Self, VaultKey)> {
        let salt = generate_salt();
        let kek = derive_kek(master_password, &salt, &kdf_params)?;
        let vault_key = VaultKey::generate();
        let encrypted_vault_key = wrap(&vault_key, &kek)?;

        Ok((
            Self {
                encrypted_vault_key,
                salt: salt.to_vec(),
                kdf_params,
            },
            vault_key,
        ))
    }

    /// Derive the KEK from the stored salt and parameters and unwrap
    /// the vault key.
    ///
    /// Runs the full KDF — treat this as a long-running operation.
    pub fn unlock(&self, master_password: &[u8]) -> Result<VaultKey> {
        let kek = derive_kek(master_password, &self.salt, &self.kdf_params)?;
        unwrap(&self.encrypted_vault_key, &kek)
    }

    /// Re-wrap the vault key under a new master password.
    ///
    /// Unwraps with the old password, generates a fresh salt, and wraps
    /// the *same* vault key under the new KEK — items stay decryptable
    /// without re-encryption. Also the upgrade path when
    /// [`KdfParams::needs_upgrade`] reports stale parameters.
    pub fn rotate(
        &self,
        old_password: &[u8],
        new_password: &[u8],
        new_params: KdfParams,
    ) -> Result<Self> {
        let vault_key = self.unlock(old_password)?;

        let new_salt = generate_salt();
        let kek = derive_kek(new_password, &new_salt, &new_params)?;
        let encrypted_vault_key = wrap(&vault_key, &kek)?;

        Ok(Self {
            encrypted_vault_key,
            salt: new_salt.to_vec(),
            kdf_params: new_params,
        })
    }
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let encoded = BASE64.encode(data);
    serializer.serialize_str(&encoded)
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}
