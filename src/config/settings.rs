use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::crypto::kdf::KdfParams;
use crate::errors::{Result, VaultError};
use crate::vault::session::SessionPolicy;

/// Deployment configuration, loaded from `.zerovault.toml`.
///
/// Every field has a sensible default so the engine works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// scrypt cost parameter for new vaults (default: 32 768 = 2^15).
    #[serde(default = "default_scrypt_n")]
    pub scrypt_n: u32,

    /// scrypt block size (default: 8).
    #[serde(default = "default_scrypt_r")]
    pub scrypt_r: u32,

    /// scrypt parallelism (default: 1).
    #[serde(default = "default_scrypt_p")]
    pub scrypt_p: u32,

    /// Minutes of inactivity before a session locks (default: 15).
    #[serde(default = "default_inactivity_minutes")]
    pub inactivity_timeout_minutes: u32,

    /// Absolute session lifetime in hours (default: 12).
    #[serde(default = "default_max_session_hours")]
    pub max_session_hours: u32,

    /// Days before a password is flagged old (default: 180).
    #[serde(default = "default_password_max_age_days")]
    pub password_max_age_days: u32,

    /// Whether breach checking is enabled (default: false — strictly
    /// opt-in).
    #[serde(default)]
    pub breach_check_enabled: bool,

    /// Endpoint of the breach-range proxy. Must be set when breach
    /// checking is enabled.
    #[serde(default)]
    pub breach_proxy_url: String,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_scrypt_n() -> u32 {
    1 << 15
}

fn default_scrypt_r() -> u32 {
    8
}

fn default_scrypt_p() -> u32 {
    1
}

fn default_inactivity_minutes() -> u32 {
    15
}

fn default_max_session_hours() -> u32 {
    12
}

fn default_password_max_age_days() -> u32 {
    180
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            scrypt_n: default_scrypt_n(),
            scrypt_r: default_scrypt_r(),
            scrypt_p: default_scrypt_p(),
            inactivity_timeout_minutes: default_inactivity_minutes(),
            max_session_hours: default_max_session_hours(),
            password_max_age_days: default_password_max_age_days(),
            breach_check_enabled: false,
            breach_proxy_url: String::new(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    const FILE_NAME: &'static str = ".zerovault.toml";

    /// Load settings from `<project_dir>/.zerovault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)
            .map_err(|e| VaultError::Config(format!("{}: {e}", config_path.display())))?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultError::Config(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// KDF parameters for newly created vaults.
    ///
    /// The work-factor floors are re-checked at derivation time, so a
    /// config file cannot downgrade below them.
    pub fn kdf_params(&self) -> KdfParams {
        KdfParams::scrypt(self.scrypt_n, self.scrypt_r, self.scrypt_p)
    }

    /// Session expiry policy from the configured timeouts.
    pub fn session_policy(&self) -> SessionPolicy {
        SessionPolicy {
            inactivity_timeout: Duration::minutes(i64::from(self.inactivity_timeout_minutes)),
            max_lifetime: Duration::hours(i64::from(self.max_session_hours)),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
