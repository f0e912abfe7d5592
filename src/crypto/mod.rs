//! Cryptographic primitives for ZeroVault.
//!
//! This module provides:
//! - Versioned password-based key derivation (`kdf`)
//! - Vault-key wrapping under the derived KEK (`vault_key`)
//! - AES-256-GCM encryption of individual secret payloads (`cipher`)

pub mod cipher;
pub mod kdf;
pub mod vault_key;

// Re-export the most commonly used items so callers can write:
//   use zerovault::crypto::{derive_kek, encrypt_item, VaultKey, ...};
pub use cipher::{decrypt_item, encrypt_item};
pub use kdf::{derive_kek, generate_salt, KdfParams, Kek, CURRENT_KDF_VERSION};
pub use vault_key::{unwrap, wrap, EncryptedVaultKey, VaultKey, VaultKeyBundle};
