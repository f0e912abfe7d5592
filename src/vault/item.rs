//! Secret types and the encrypted item wire record.
//!
//! An [`EncryptedItem`] is what the external persistence store receives:
//! opaque ciphertext + nonce (base64 in JSON), the secret type tag, and
//! the plaintext [`Metadata`] record. Nothing in it is recoverable
//! without the vault key except the metadata, which the boundary
//! validator constrains to non-secret derivatives.

use serde::{Deserialize, Serialize};

use crate::boundary::metadata::Metadata;
use crate::crypto::vault_key::{base64_decode, base64_encode};

/// The kind of secret stored in an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecretType {
    #[serde(rename = "PASSWORD")]
    Password,
    #[serde(rename = "API_KEY")]
    ApiKey,
    #[serde(rename = "ENV_VARS")]
    EnvVars,
}

impl SecretType {
    /// The wire tag for this type.
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Password => "PASSWORD",
            Self::ApiKey => "API_KEY",
            Self::EnvVars => "ENV_VARS",
        }
    }

    /// Parse a wire tag. Returns `None` for unrecognized tags.
    pub fn from_wire(tag: &str) -> Option<Self> {
        match tag {
            "PASSWORD" => Some(Self::Password),
            "API_KEY" => Some(Self::ApiKey),
            "ENV_VARS" => Some(Self::EnvVars),
            _ => None,
        }
    }
}

/// A single stored secret record.
///
/// `ciphertext` and `nonce` are opaque to every component except the
/// item cipher holding the correct vault key. Both serialize as base64
/// strings in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedItem {
    /// Stable identifier assigned by the caller.
    pub id: String,

    /// The kind of secret inside the ciphertext.
    pub secret_type: SecretType,

    /// AES-256-GCM ciphertext including the auth tag.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub ciphertext: Vec<u8>,

    /// The nonce the ciphertext was produced with.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub nonce: Vec<u8>,

    /// Plaintext metadata, constrained per secret type.
    pub metadata: Metadata,
}
