//! The unlocked vault session.
//!
//! `VaultSession` is the single owner of the live vault key. Every
//! operation that needs the key goes through the session, which
//! enforces the lock discipline: explicit `lock()`, an inactivity
//! timeout, and an absolute lifetime — all of which wipe the key bytes
//! rather than merely dropping the reference.

use chrono::{DateTime, Duration, Utc};
use zeroize::Zeroize;

use super::item::EncryptedItem;
use crate::boundary::split::{split, SecretInput, SecretPayload};
use crate::boundary::validate::validate_metadata;
use crate::crypto::cipher::{decrypt_item, encrypt_item};
use crate::crypto::kdf::KdfParams;
use crate::crypto::vault_key::{VaultKey, VaultKeyBundle};
use crate::errors::{Result, VaultError};
use crate::health::{evaluate, HealthCheckOptions, PasswordHealthResult};

/// Session expiry policy.
#[derive(Debug, Clone, Copy)]
pub struct SessionPolicy {
    /// Lock after this long without a key access.
    pub inactivity_timeout: Duration,
    /// Lock this long after unlock no matter what.
    pub max_lifetime: Duration,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            inactivity_timeout: Duration::minutes(15),
            max_lifetime: Duration::hours(12),
        }
    }
}

/// An unlocked vault.
///
/// Create one with [`VaultSession::create`] (new vault) or
/// [`VaultSession::unlock`] (existing bundle), then use its methods to
/// seal and open secrets. The vault key never leaves the session.
pub struct VaultSession {
    /// `None` once locked. Dropping the key zeroizes it.
    key: Option<VaultKey>,
    created_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
    policy: SessionPolicy,
}

impl VaultSession {
    /// Create a brand-new vault and an unlocked session for it.
    ///
    /// Runs the full KDF — treat as long-running. The returned bundle
    /// is what the caller hands to the persistence store.
    pub fn create(
        master_password: &[u8],
        kdf_params: KdfParams,
        policy: SessionPolicy,
    ) -> Result<(Self, VaultKeyBundle)> {
        let (bundle, vault_key) = VaultKeyBundle::create(master_password, kdf_params)?;
        Ok((Self::with_key(vault_key, policy), bundle))
    }

    /// Unlock an existing vault from its persisted bundle.
    ///
    /// Runs the full KDF — treat as long-running. A wrong password and
    /// corrupted data both surface as the same `AuthenticationFailure`;
    /// callers get no oracle about which check failed.
    pub fn unlock(
        bundle: &VaultKeyBundle,
        master_password: &[u8],
        policy: SessionPolicy,
    ) -> Result<Self> {
        let vault_key = bundle.unlock(master_password)?;
        Ok(Self::with_key(vault_key, policy))
    }

    fn with_key(key: VaultKey, policy: SessionPolicy) -> Self {
        let now = Utc::now();
        Self {
            key: Some(key),
            created_at: now,
            last_activity: now,
            policy,
        }
    }

    /// Whether the session has been locked (explicitly or by expiry).
    ///
    /// Does not itself trigger expiry — only key accesses do.
    pub fn is_locked(&self) -> bool {
        self.key.is_none()
    }

    /// Irrecoverably discard the vault key. Idempotent.
    ///
    /// Dropping the key runs its zeroize-on-drop wipe, so the bytes are
    /// gone, not just unreferenced.
    pub fn lock(&mut self) {
        self.key = None;
    }

    /// Access the live key, enforcing both expiry clocks.
    ///
    /// An expired session locks itself before returning `VaultLocked`,
    /// so the key is wiped even if the caller ignores the error.
    fn key(&mut self) -> Result<&VaultKey> {
        let now = Utc::now();
        if self.key.is_some()
            && (now - self.last_activity > self.policy.inactivity_timeout
                || now - self.created_at > self.policy.max_lifetime)
        {
            self.lock();
        }

        if self.key.is_none() {
            return Err(VaultError::VaultLocked);
        }
        self.last_activity = now;
        self.key.as_ref().ok_or(VaultError::VaultLocked)
    }

    /// Split, validate, and encrypt a secret into a persistable item.
    ///
    /// Metadata validation runs before any ciphertext exists; an unsafe
    /// metadata record rejects the save outright.
    pub fn seal_secret(&mut self, id: impl Into<String>, input: SecretInput) -> Result<EncryptedItem> {
        let (payload, metadata) = split(input);

        validate_metadata(&metadata)?;

        let mut plaintext = payload.to_plaintext_bytes()?;
        let key = self.key()?;
        let sealed = encrypt_item(key, &plaintext);
        plaintext.zeroize();
        let (ciphertext, nonce) = sealed?;

        Ok(EncryptedItem {
            id: id.into(),
            secret_type: metadata.secret_type(),
            ciphertext,
            nonce,
            metadata,
        })
    }

    /// Decrypt an item back into its payload.
    ///
    /// `AuthenticationFailure` means wrong key or tampering; a payload
    /// that decrypts but does not parse is a `Serialization` error.
    pub fn open_secret(&mut self, item: &EncryptedItem) -> Result<SecretPayload> {
        let key = self.key()?;
        let mut plaintext = decrypt_item(key, &item.ciphertext, &item.nonce)?;
        let payload = SecretPayload::from_plaintext_bytes(&plaintext);
        plaintext.zeroize();
        payload
    }

    /// Evaluate password health with this session's key injected for
    /// the reuse scan.
    pub fn password_health(
        &mut self,
        password: &str,
        options: &HealthCheckOptions,
    ) -> Result<PasswordHealthResult> {
        let key = self.key()?;
        let options = HealthCheckOptions {
            vault_key: Some(key),
            ..*options
        };
        Ok(evaluate(password, &options))
    }
}
