//! Password health evaluation.
//!
//! `evaluate` is a pure function: given the same password, options, and
//! vault contents it produces the same result, performs no I/O of its
//! own, and never retains or emits the password. The advisory signals
//! (reuse, breach) swallow their internal failures — a corrupted
//! sibling item or an unreachable breach proxy reads as "no signal",
//! never as an error that blocks the caller.

pub mod breach;
pub mod generation;

use chrono::{DateTime, Duration, Utc};
use zeroize::Zeroize;

use crate::boundary::split::SecretPayload;
use crate::crypto::cipher::decrypt_item;
use crate::crypto::vault_key::VaultKey;
use crate::vault::item::EncryptedItem;

pub use breach::BreachCheck;
pub use generation::EvaluationGate;

/// Default maximum password age before the `old` flag is set.
pub const DEFAULT_MAX_AGE_DAYS: i64 = 180;

/// Score threshold below which a password is flagged weak.
const WEAK_THRESHOLD: f64 = 60.0;

/// Advisory flags attached to a health result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HealthFlags {
    /// Another item in the vault holds the same secret value.
    pub reused: bool,
    /// Score below threshold or a character class missing.
    pub weak: bool,
    /// Last changed longer ago than the configured maximum age.
    pub old: bool,
    /// Positive signal from the breach corpus (opt-in only).
    pub breached: bool,
}

/// The outcome of a health evaluation.
///
/// Purely computed — never persisted, and never contains the password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHealthResult {
    /// 0..=100.
    pub score: u8,
    pub warnings: Vec<String>,
    pub flags: HealthFlags,
}

/// Inputs for an evaluation beyond the password itself.
///
/// Everything is borrowed: the engine must not be able to cache the
/// vault key or the items past the call.
#[derive(Clone, Copy)]
pub struct HealthCheckOptions<'a> {
    /// Key for decrypting sibling items during the reuse scan. Without
    /// it the reuse check is skipped entirely.
    pub vault_key: Option<&'a VaultKey>,

    /// The other encrypted items to compare against.
    pub other_items: &'a [EncryptedItem],

    /// Id of the item being edited, excluded from the reuse scan.
    pub current_item_id: Option<&'a str>,

    /// When the password was last changed, if known.
    pub last_changed: Option<DateTime<Utc>>,

    /// Age threshold in days for the `old` flag.
    pub max_age_days: i64,

    /// Master switch for the breach check. When false, any supplied
    /// callback is ignored and `breached` stays false.
    pub breach_check_enabled: bool,

    /// The breach-corpus callback. The engine never performs a network
    /// call on its own.
    pub breach_check: Option<&'a dyn BreachCheck>,
}

impl Default for HealthCheckOptions<'_> {
    fn default() -> Self {
        Self {
            vault_key: None,
            other_items: &[],
            current_item_id: None,
            last_changed: None,
            max_age_days: DEFAULT_MAX_AGE_DAYS,
            breach_check_enabled: false,
            breach_check: None,
        }
    }
}

/// Evaluate the health of a password.
///
/// Scoring contract:
/// - length: 2.5 points per character up to 20 characters (0–50)
/// - diversity: 12.5 points per present class (0–50), with a warning
///   for each missing class
/// - reuse match: −30, age past threshold: −10, breach hit: −50
/// - final score clamped to [0, 100]; `weak` when the score is under 60
///   or any class is missing
pub fn evaluate(password: &str, options: &HealthCheckOptions) -> PasswordHealthResult {
    let mut warnings = Vec::new();
    let mut flags = HealthFlags::default();

    let length = password.chars().count();
    let mut score = 2.5 * length.min(20) as f64;

    let classes = [
        (
            password.chars().any(|c| c.is_lowercase()),
            "Add lowercase letters",
        ),
        (
            password.chars().any(|c| c.is_uppercase()),
            "Add uppercase letters",
        ),
        (password.chars().any(|c| c.is_ascii_digit()), "Add digits"),
        (
            password
                .chars()
                .any(|c| !c.is_alphanumeric() && !c.is_whitespace()),
            "Add symbols",
        ),
    ];
    let mut present_classes = 0u8;
    for (present, warning) in classes {
        if present {
            present_classes += 1;
        } else {
            warnings.push(warning.to_string());
        }
    }
    score += 12.5 * f64::from(present_classes);

    if let Some(key) = options.vault_key {
        if password_is_reused(password, key, options.other_items, options.current_item_id) {
            flags.reused = true;
            score -= 30.0;
            warnings.push("Password is reused by another item".to_string());
        }
    }

    if let Some(last_changed) = options.last_changed {
        if Utc::now() - last_changed > Duration::days(options.max_age_days) {
            flags.old = true;
            score -= 10.0;
            warnings.push(format!(
                "Password is older than {} days",
                options.max_age_days
            ));
        }
    }

    // Opt-in only, and fail-open: an unavailable breach check must never
    // read as "breached".
    if options.breach_check_enabled {
        if let Some(checker) = options.breach_check {
            match checker.is_breached(password) {
                Ok(true) => {
                    flags.breached = true;
                    score -= 50.0;
                    warnings.push("Password appears in a known breach corpus".to_string());
                }
                Ok(false) | Err(_) => {}
            }
        }
    }

    let score = score.clamp(0.0, 100.0);
    flags.weak = score < WEAK_THRESHOLD || present_classes < 4;

    PasswordHealthResult {
        score: score.round() as u8,
        warnings,
        flags,
    }
}

/// Scan sibling items for an exact (case-sensitive) match of the
/// evaluated password against their sensitive values.
///
/// Per-item failures — foreign-key ciphertext, corrupted records,
/// unparseable payloads — are treated as "no match". Reuse detection is
/// advisory, not load-bearing.
fn password_is_reused(
    password: &str,
    key: &VaultKey,
    items: &[EncryptedItem],
    current_item_id: Option<&str>,
) -> bool {
    for item in items {
        if current_item_id.map_or(false, |id| id == item.id) {
            continue;
        }

        let mut plaintext = match decrypt_item(key, &item.ciphertext, &item.nonce) {
            Ok(bytes) => bytes,
            Err(_) => continue,
        };
        let payload = SecretPayload::from_plaintext_bytes(&plaintext);
        plaintext.zeroize();

        let payload = match payload {
            Ok(p) => p,
            Err(_) => continue,
        };

        if payload_matches(password, &payload) {
            return true;
        }
    }
    false
}

fn payload_matches(password: &str, payload: &SecretPayload) -> bool {
    match payload {
        SecretPayload::Password {
            password: other, ..
        } => other == password,
        SecretPayload::ApiKey { api_key, .. } => api_key == password,
        SecretPayload::EnvVars { variables, .. } => {
            variables.iter().any(|v| v.value == password)
        }
    }
}
