//! Plaintext metadata records, one shape per secret type.
//!
//! Metadata is the only part of a secret record the server can read, so
//! its shape is fixed as a tagged union: a field either exists in the
//! variant for its type or it cannot be represented at all. The dynamic
//! validator in [`super::validate`] is a second, independent layer on
//! top of this structural guarantee.

use serde::{Deserialize, Serialize};

use crate::vault::item::SecretType;

/// Safe, plaintext metadata for a stored secret.
///
/// Carries only derivatives of sensitive values: lengths, counts,
/// booleans, and (for env vars) variable *names*. Never a prefix,
/// suffix, hash, or masked rendering of a secret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Metadata {
    #[serde(rename = "PASSWORD", rename_all = "camelCase")]
    Password {
        title: String,
        username: String,
        website: String,
        /// Character count of the password, not its content.
        password_length: usize,
        has_notes: bool,
    },

    #[serde(rename = "API_KEY", rename_all = "camelCase")]
    ApiKey {
        title: String,
        service_name: String,
        environment: String,
        api_key_length: usize,
        has_notes: bool,
    },

    #[serde(rename = "ENV_VARS", rename_all = "camelCase")]
    EnvVars {
        title: String,
        description: String,
        variable_count: usize,
        /// Variable names only — values live in the encrypted payload.
        variable_keys: Vec<String>,
        has_notes: bool,
    },
}

impl Metadata {
    /// The secret type this metadata belongs to.
    pub fn secret_type(&self) -> SecretType {
        match self {
            Self::Password { .. } => SecretType::Password,
            Self::ApiKey { .. } => SecretType::ApiKey,
            Self::EnvVars { .. } => SecretType::EnvVars,
        }
    }
}
