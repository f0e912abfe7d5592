//! The secret/metadata boundary.
//!
//! This module is the structural half of the zero-knowledge guarantee:
//! - `metadata` — the tagged plaintext record, one variant per type
//! - `split` — partitions a secret into encrypted payload + metadata
//! - `validate` — rejects any metadata carrying secret material

pub mod metadata;
pub mod split;
pub mod validate;

pub use metadata::Metadata;
pub use split::{build_metadata, split, EnvVar, SecretInput, SecretPayload};
pub use validate::{validate_metadata, validate_untrusted_metadata};
