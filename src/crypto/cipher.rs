//! AES-256-GCM authenticated encryption for individual secret payloads.
//!
//! Each call to `encrypt_item` generates a fresh random 12-byte nonce —
//! nonce reuse under the same key fully breaks confidentiality for this
//! mode, so the nonce is produced inside the call and there is no way
//! for a caller to supply one. Ciphertext and nonce are returned
//! separately because the persisted item record stores them as separate
//! base64 fields.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};

use super::vault_key::VaultKey;
use crate::errors::{Result, VaultError};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Encrypt a secret payload under the vault key.
///
/// Returns `(ciphertext, nonce)`. The ciphertext includes the 16-byte
/// authentication tag.
pub fn encrypt_item(key: &VaultKey, plaintext: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| VaultError::EncryptionFailed(format!("encryption error: {e}")))?;

    Ok((ciphertext, nonce.to_vec()))
}

/// Decrypt a secret payload produced by [`encrypt_item`].
///
/// Fails with `AuthenticationFailure` on a wrong key, a tampered
/// ciphertext, or a malformed nonce — never with partial plaintext.
/// Callers parsing the decrypted bytes get a distinct `Serialization`
/// error for malformed content, so "wrong key" and "bad JSON" stay
/// distinguishable.
pub fn decrypt_item(key: &VaultKey, ciphertext: &[u8], nonce: &[u8]) -> Result<Vec<u8>> {
    if nonce.len() != NONCE_LEN {
        return Err(VaultError::AuthenticationFailure);
    }

    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| VaultError::AuthenticationFailure)?;

    let nonce = Nonce::from_slice(nonce);

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| VaultError::AuthenticationFailure)
}
