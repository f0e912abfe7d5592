use thiserror::Error;

/// All errors that can occur in ZeroVault.
///
/// Hard failures (authentication, metadata boundary) always propagate to
/// the caller and block the operation. Advisory signals (reuse scan,
/// breach check) swallow their internal errors and report "no signal"
/// instead of surfacing here.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Key derivation errors ---
    #[error("Invalid KDF parameters: {0}")]
    InvalidKdfParams(String),

    #[error("Unsupported KDF version {0}")]
    UnsupportedKdfVersion(u8),

    // --- Cipher errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Wrong key or tampered ciphertext. Fails closed — no partial
    /// plaintext is ever returned, and the message stays generic so a
    /// failed unlock gives no oracle about which check failed.
    #[error("Authentication failed — invalid master password or corrupted data")]
    AuthenticationFailure,

    // --- Metadata boundary violations ---
    #[error("Metadata contains forbidden field '{0}'")]
    MetadataForbiddenField(String),

    #[error("Metadata field '{0}' matches a partial-secret mask pattern")]
    MetadataForbiddenPattern(String),

    // --- Session errors ---
    #[error("Vault is locked — unlock it before accessing secrets")]
    VaultLocked,

    // --- Breach check (advisory, fail-open) ---
    #[error("Breach check unavailable: {0}")]
    BreachCheckUnavailable(String),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    Serialization(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    Config(String),
}

/// Convenience type alias for ZeroVault results.
pub type Result<T> = std::result::Result<T, VaultError>;
