//! The secret payload splitter.
//!
//! Partitions a user-entered secret into the encrypted-only payload and
//! the plaintext metadata record. The split is total: every sensitive
//! field lands in the payload, and the metadata gets nothing but
//! length/count/boolean derivatives and env-var names.

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use super::metadata::Metadata;
use crate::errors::{Result, VaultError};

/// A single environment variable inside an ENV_VARS secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
pub struct EnvVar {
    /// The variable name (safe — it appears in metadata as well).
    pub key: String,
    /// The variable value (sensitive — encrypted payload only).
    pub value: String,
}

/// A user-entered secret before the split.
///
/// Transient: held only for the duration of a save operation and
/// consumed by [`split`].
#[derive(Debug, Clone)]
pub enum SecretInput {
    Password {
        title: String,
        username: String,
        website: String,
        password: String,
        notes: Option<String>,
    },
    ApiKey {
        title: String,
        service_name: String,
        environment: String,
        api_key: String,
        notes: Option<String>,
    },
    EnvVars {
        title: String,
        description: String,
        variables: Vec<EnvVar>,
        notes: Option<String>,
    },
}

/// The sensitive half of a secret. Exists in plaintext only inside the
/// client process; serialized exclusively as input to the item cipher.
/// Zeroed when dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Zeroize)]
#[zeroize(drop)]
#[serde(tag = "type")]
pub enum SecretPayload {
    #[serde(rename = "PASSWORD")]
    Password {
        password: String,
        notes: Option<String>,
    },
    #[serde(rename = "API_KEY", rename_all = "camelCase")]
    ApiKey {
        api_key: String,
        notes: Option<String>,
    },
    #[serde(rename = "ENV_VARS")]
    EnvVars {
        variables: Vec<EnvVar>,
        notes: Option<String>,
    },
}

impl SecretPayload {
    /// Serialize to the JSON bytes that get encrypted.
    ///
    /// The caller owns the returned buffer and must zeroize it once the
    /// ciphertext exists.
    pub fn to_plaintext_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| VaultError::Serialization(format!("payload: {e}")))
    }

    /// Parse a decrypted payload.
    ///
    /// A parse failure here is a `Serialization` error, distinct from
    /// the `AuthenticationFailure` a wrong key produces — the bytes did
    /// decrypt, they just are not a valid payload.
    pub fn from_plaintext_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| VaultError::Serialization(format!("payload: {e}")))
    }
}

/// Compute the safe metadata record for a secret.
///
/// Metadata values are derivatives only — lengths, counts, booleans,
/// and env-var names. No prefix, suffix, hash, or masked rendering of a
/// sensitive field is ever computed here.
pub fn build_metadata(input: &SecretInput) -> Metadata {
    match input {
        SecretInput::Password {
            title,
            username,
            website,
            password,
            notes,
        } => Metadata::Password {
            title: title.clone(),
            username: username.clone(),
            website: website.clone(),
            password_length: password.chars().count(),
            has_notes: has_notes(notes),
        },
        SecretInput::ApiKey {
            title,
            service_name,
            environment,
            api_key,
            notes,
        } => Metadata::ApiKey {
            title: title.clone(),
            service_name: service_name.clone(),
            environment: environment.clone(),
            api_key_length: api_key.chars().count(),
            has_notes: has_notes(notes),
        },
        SecretInput::EnvVars {
            title,
            description,
            variables,
            notes,
        } => Metadata::EnvVars {
            title: title.clone(),
            description: description.clone(),
            variable_count: variables.len(),
            variable_keys: variables.iter().map(|v| v.key.clone()).collect(),
            has_notes: has_notes(notes),
        },
    }
}

/// Split a secret into its encrypted payload and its safe metadata.
pub fn split(input: SecretInput) -> (SecretPayload, Metadata) {
    let metadata = build_metadata(&input);

    let payload = match input {
        SecretInput::Password {
            password, notes, ..
        } => SecretPayload::Password { password, notes },
        SecretInput::ApiKey { api_key, notes, .. } => SecretPayload::ApiKey { api_key, notes },
        SecretInput::EnvVars {
            variables, notes, ..
        } => SecretPayload::EnvVars { variables, notes },
    };

    (payload, metadata)
}

/// An empty notes field does not count as notes.
fn has_notes(notes: &Option<String>) -> bool {
    notes.as_deref().map_or(false, |n| !n.is_empty())
}
