//! The metadata boundary validator.
//!
//! Metadata is the one part of a secret record that crosses the
//! zero-knowledge boundary in plaintext, so it is checked twice: once
//! on the authoring side before anything is encrypted, and once on the
//! receiving side before persistence. Both entry points funnel into the
//! same implementation — a divergence between them would itself be a
//! security bug.
//!
//! Three checks run in order:
//! 1. every field name against a fixed case-insensitive denylist;
//! 2. every string value against a partial-secret mask pattern
//!    (`***word` leaks trailing characters and is forbidden outright);
//! 3. every top-level field against the safe-field table for the
//!    declared secret type.
//!
//! The ordering matters: a custom field smuggling `***word` must be
//! reported as a pattern violation, not as a generic unknown field.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::metadata::Metadata;
use crate::errors::{Result, VaultError};
use crate::vault::item::SecretType;

/// Field names that may never appear in metadata, compared
/// case-insensitively.
const FORBIDDEN_FIELDS: &[&str] = &[
    "password",
    "apikey",
    "value",
    "secret",
    "token",
    "credential",
    "mask",
    "passwordmask",
    "apikeymask",
];

/// Fields allowed in PASSWORD metadata.
const PASSWORD_SAFE_FIELDS: &[&str] = &[
    "type",
    "title",
    "username",
    "website",
    "passwordLength",
    "hasNotes",
];

/// Fields allowed in API_KEY metadata.
const API_KEY_SAFE_FIELDS: &[&str] = &[
    "type",
    "title",
    "serviceName",
    "environment",
    "apiKeyLength",
    "hasNotes",
];

/// Fields allowed in ENV_VARS metadata.
const ENV_VARS_SAFE_FIELDS: &[&str] = &[
    "type",
    "title",
    "description",
    "variableCount",
    "variableKeys",
    "hasNotes",
];

/// Matches partial-secret masks: two or more asterisks followed by
/// literal characters, anywhere in a string.
fn mask_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\*{2,}[^\s*]+").expect("mask pattern is valid"))
}

/// Validate typed metadata on the authoring side, before encryption.
///
/// The tagged-union type already makes unsafe shapes unrepresentable;
/// this run of the dynamic checks is defense in depth on top of it.
pub fn validate_metadata(metadata: &Metadata) -> Result<()> {
    let value = serde_json::to_value(metadata)
        .map_err(|e| VaultError::Serialization(format!("metadata: {e}")))?;
    validate_untrusted_metadata(&value)
}

/// Validate untyped metadata on the receiving side, before persistence.
///
/// Operates on the plaintext metadata object only — never on decrypted
/// secrets, which the receiving side cannot have.
pub fn validate_untrusted_metadata(metadata: &Value) -> Result<()> {
    let object = metadata.as_object().ok_or_else(|| {
        VaultError::Serialization("metadata must be a JSON object".to_string())
    })?;

    // 1. Fixed denylist over top-level field names.
    for key in object.keys() {
        if is_forbidden_name(key) {
            return Err(VaultError::MetadataForbiddenField(key.clone()));
        }
    }

    // 2. Mask-pattern scan over every string value, recursively —
    //    arbitrary custom fields must not smuggle partial secrets in.
    for (key, value) in object {
        scan_for_masks(key, value)?;
    }

    // 3. Everything left must be in the safe-field table for the
    //    declared type.
    let type_tag = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| VaultError::Serialization("metadata missing secret type tag".to_string()))?;
    let secret_type = SecretType::from_wire(type_tag).ok_or_else(|| {
        VaultError::Serialization(format!("unknown secret type '{type_tag}'"))
    })?;

    let safe = safe_fields(secret_type);
    for key in object.keys() {
        if !safe.contains(&key.as_str()) {
            return Err(VaultError::MetadataForbiddenField(key.clone()));
        }
    }

    Ok(())
}

/// The safe-field table for a secret type.
fn safe_fields(secret_type: SecretType) -> &'static [&'static str] {
    match secret_type {
        SecretType::Password => PASSWORD_SAFE_FIELDS,
        SecretType::ApiKey => API_KEY_SAFE_FIELDS,
        SecretType::EnvVars => ENV_VARS_SAFE_FIELDS,
    }
}

fn is_forbidden_name(name: &str) -> bool {
    let lowered = name.to_ascii_lowercase();
    FORBIDDEN_FIELDS.contains(&lowered.as_str())
}

/// Walk a value looking for mask-shaped strings. Nested object keys are
/// also held to the denylist — a `{variables: [{value: ...}]}` shape
/// fails here on its inner `value` key.
///
/// Violations carry the field name only, never the matched text.
fn scan_for_masks(field: &str, value: &Value) -> Result<()> {
    match value {
        Value::String(s) => {
            if mask_pattern().is_match(s) {
                return Err(VaultError::MetadataForbiddenPattern(field.to_string()));
            }
            Ok(())
        }
        Value::Array(items) => {
            for item in items {
                scan_for_masks(field, item)?;
            }
            Ok(())
        }
        Value::Object(map) => {
            for (key, nested) in map {
                if is_forbidden_name(key) {
                    return Err(VaultError::MetadataForbiddenField(key.clone()));
                }
                scan_for_masks(key, nested)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}
