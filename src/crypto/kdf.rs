//! Versioned password-based key derivation.
//!
//! Two KDF generations are supported simultaneously:
//!
//! - **Version 1** — PBKDF2-HMAC-SHA256. Legacy, retained so old vaults
//!   can still be unlocked. Never used for new vaults.
//! - **Version 2** — scrypt (memory-hard). Current, used for all new
//!   vaults.
//!
//! The algorithm is selected from the `version` field of the persisted
//! [`KdfParams`] — callers never choose it directly. Parameters are
//! re-validated against minimum work-factor floors on every derivation,
//! so a tampered or downgraded parameter blob is rejected even if it
//! parsed cleanly.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::OsRng;
use pbkdf2::pbkdf2_hmac;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::errors::{Result, VaultError};

/// Length of the derived key-encryption-key in bytes (256 bits).
pub const KEK_LEN: usize = 32;

/// Length of a freshly generated salt in bytes (256 bits).
pub const SALT_LEN: usize = 32;

/// Minimum accepted salt length on derivation (128 bits).
const MIN_SALT_LEN: usize = 16;

/// The KDF version assigned to newly created vaults.
pub const CURRENT_KDF_VERSION: u8 = 2;

/// Minimum scrypt cost parameter (2^14).
const MIN_SCRYPT_N: u32 = 1 << 14;

/// Minimum PBKDF2 iteration count for version-1 parameters.
const MIN_LEGACY_ITERATIONS: u32 = 100_000;

/// Persisted KDF parameters, stored alongside the encrypted vault key.
///
/// The wire form is a version tag plus the fields for that version:
///
/// ```json
/// {"version": 1, "iterations": 310000, "hash": "sha256"}
/// {"version": 2, "N": 32768, "r": 8, "p": 1}
/// ```
///
/// Unknown versions stay representable so that [`derive_kek`] can reject
/// them with a typed error instead of failing at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// KDF generation. 1 = PBKDF2-HMAC-SHA256, 2 = scrypt.
    pub version: u8,

    /// Iteration count (version 1 only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u32>,

    /// Digest name (version 1 only). Only "sha256" is recognized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,

    /// scrypt cost parameter, must be a power of two (version 2 only).
    #[serde(rename = "N", default, skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,

    /// scrypt block size (version 2 only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<u32>,

    /// scrypt parallelism (version 2 only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<u32>,
}

impl KdfParams {
    /// Version-1 (PBKDF2-HMAC-SHA256) parameters.
    ///
    /// Exists for reading vaults created before the scrypt migration;
    /// new vaults must use [`KdfParams::scrypt`].
    pub fn legacy(iterations: u32) -> Self {
        Self {
            version: 1,
            iterations: Some(iterations),
            hash: Some("sha256".to_string()),
            n: None,
            r: None,
            p: None,
        }
    }

    /// Version-2 (scrypt) parameters.
    pub fn scrypt(n: u32, r: u32, p: u32) -> Self {
        Self {
            version: CURRENT_KDF_VERSION,
            iterations: None,
            hash: None,
            n: Some(n),
            r: Some(r),
            p: Some(p),
        }
    }

    /// The parameters assigned to newly created vaults (N=2^15, r=8, p=1).
    pub fn recommended() -> Self {
        Self::scrypt(1 << 15, 8, 1)
    }

    /// Returns `true` if these parameters predate the current KDF
    /// generation and the vault key should be re-wrapped on next unlock.
    ///
    /// The migration itself (re-derive + re-wrap) belongs to the
    /// surrounding auth flow; this is only the query it needs.
    pub fn needs_upgrade(&self) -> bool {
        self.version < CURRENT_KDF_VERSION
    }

    /// Validate the parameters and resolve them to a concrete algorithm.
    fn resolve(&self) -> Result<KdfAlgorithm> {
        match self.version {
            1 => {
                let iterations = self.iterations.ok_or_else(|| {
                    VaultError::InvalidKdfParams("version 1 requires an iteration count".into())
                })?;
                let hash = self.hash.as_deref().ok_or_else(|| {
                    VaultError::InvalidKdfParams("version 1 requires a hash name".into())
                })?;
                if !hash.eq_ignore_ascii_case("sha256") {
                    return Err(VaultError::InvalidKdfParams(format!(
                        "unrecognized legacy hash '{hash}'"
                    )));
                }
                if iterations < MIN_LEGACY_ITERATIONS {
                    return Err(VaultError::InvalidKdfParams(format!(
                        "iteration count must be at least {MIN_LEGACY_ITERATIONS} (got {iterations})"
                    )));
                }
                Ok(KdfAlgorithm::Pbkdf2Sha256 { iterations })
            }
            2 => {
                let n = self.n.ok_or_else(|| {
                    VaultError::InvalidKdfParams("version 2 requires the N cost parameter".into())
                })?;
                let r = self.r.ok_or_else(|| {
                    VaultError::InvalidKdfParams("version 2 requires the r block size".into())
                })?;
                let p = self.p.ok_or_else(|| {
                    VaultError::InvalidKdfParams("version 2 requires the p parallelism".into())
                })?;
                if !n.is_power_of_two() {
                    return Err(VaultError::InvalidKdfParams(format!(
                        "N must be a power of two (got {n})"
                    )));
                }
                if n < MIN_SCRYPT_N {
                    return Err(VaultError::InvalidKdfParams(format!(
                        "N must be at least {MIN_SCRYPT_N} (got {n})"
                    )));
                }
                if r < 1 {
                    return Err(VaultError::InvalidKdfParams(
                        "r must be at least 1".into(),
                    ));
                }
                if p < 1 {
                    return Err(VaultError::InvalidKdfParams(
                        "p must be at least 1".into(),
                    ));
                }
                Ok(KdfAlgorithm::Scrypt {
                    log_n: n.trailing_zeros() as u8,
                    r,
                    p,
                })
            }
            other => Err(VaultError::UnsupportedKdfVersion(other)),
        }
    }
}

/// A concrete, floor-checked derivation algorithm.
enum KdfAlgorithm {
    Pbkdf2Sha256 { iterations: u32 },
    Scrypt { log_n: u8, r: u32, p: u32 },
}

/// A wrapper around the derived 32-byte key-encryption-key that
/// automatically zeroes its memory when dropped.
///
/// The KEK exists only for the duration of a wrap/unwrap operation and
/// is never persisted or serialized.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct Kek {
    bytes: [u8; KEK_LEN],
}

impl Kek {
    /// Create a new `Kek` from raw bytes.
    pub fn new(bytes: [u8; KEK_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes (e.g. to build an AEAD cipher).
    pub fn as_bytes(&self) -> &[u8; KEK_LEN] {
        &self.bytes
    }
}

/// Derive the key-encryption-key from the master password.
///
/// Deterministic: the same password + salt + params always produce the
/// same KEK. Fails with `InvalidKdfParams` when the parameters fall
/// below the work-factor floors and with `UnsupportedKdfVersion` for an
/// unrecognized version tag.
///
/// This is CPU- and memory-hard by design and can take hundreds of
/// milliseconds — callers should treat it as a long-running operation
/// and keep it off any interactive thread.
pub fn derive_kek(master_password: &[u8], salt: &[u8], params: &KdfParams) -> Result<Kek> {
    if salt.len() < MIN_SALT_LEN {
        return Err(VaultError::InvalidKdfParams(format!(
            "salt must be at least {MIN_SALT_LEN} bytes (got {})",
            salt.len()
        )));
    }

    let algorithm = params.resolve()?;

    let mut kek_bytes = [0u8; KEK_LEN];
    match algorithm {
        KdfAlgorithm::Pbkdf2Sha256 { iterations } => {
            pbkdf2_hmac::<Sha256>(master_password, salt, iterations, &mut kek_bytes);
        }
        KdfAlgorithm::Scrypt { log_n, r, p } => {
            let scrypt_params = scrypt::Params::new(log_n, r, p, KEK_LEN)
                .map_err(|e| VaultError::InvalidKdfParams(format!("scrypt params: {e}")))?;
            scrypt::scrypt(master_password, salt, &scrypt_params, &mut kek_bytes)
                .map_err(|e| VaultError::InvalidKdfParams(format!("scrypt output: {e}")))?;
        }
    }

    let kek = Kek::new(kek_bytes);
    kek_bytes.zeroize();
    Ok(kek)
}

/// Generate a cryptographically random 32-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}
