//! k-anonymity breach lookup.
//!
//! The password is hashed with SHA-1 — a legacy fast hash, used here
//! solely because the upstream breach corpus is indexed by it, never
//! for storage or key material. Only the first 5 hex characters of the
//! digest leave the client; the proxy returns every known suffix under
//! that prefix as `SUFFIX:COUNT` lines and the match happens locally.
//!
//! Every failure path is fail-open: a dead proxy, a non-200 response,
//! or garbage in the body all read as "not breached". Unavailability
//! must never be interpreted as a breach signal.

use std::fmt::Write as _;

use sha1::{Digest, Sha1};
use subtle::ConstantTimeEq;

use crate::errors::Result;

/// Hex characters of the digest disclosed to the proxy.
pub const PREFIX_LEN: usize = 5;

/// A breach-corpus lookup.
///
/// The health engine only ever calls this when the caller both enabled
/// breach checking and supplied an implementation; it treats an `Err`
/// as "no signal". Implementations must not cache or log the password.
pub trait BreachCheck {
    /// Returns whether the password appears in the breach corpus.
    fn is_breached(&self, password: &str) -> Result<bool>;
}

/// Split a password into the disclosed digest prefix and the locally
/// kept suffix.
///
/// Returns `(prefix, suffix)` — 5 and 35 uppercase hex characters of
/// the SHA-1 digest respectively.
pub fn anonymity_split(password: &str) -> (String, String) {
    let digest = Sha1::digest(password.as_bytes());

    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(hex, "{byte:02X}");
    }

    let suffix = hex.split_off(PREFIX_LEN);
    (hex, suffix)
}

/// Match a range-proxy response body against the local digest suffix.
///
/// Lines are `SUFFIX:COUNT`. Zero-count padding lines are ignored, the
/// suffix comparison is case-insensitive and constant-time, and an
/// empty or malformed body means "not breached".
pub fn match_range_response(body: &str, suffix: &str) -> bool {
    let wanted = suffix.to_ascii_uppercase();

    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (candidate, count) = match line.split_once(':') {
            Some(parts) => parts,
            None => continue,
        };

        // Upstream pads responses with zero-count entries.
        let count: u64 = count.trim().parse().unwrap_or(0);
        if count == 0 {
            continue;
        }

        let candidate = candidate.trim().to_ascii_uppercase();
        if candidate.len() != wanted.len() {
            continue;
        }
        if candidate.as_bytes().ct_eq(wanted.as_bytes()).into() {
            return true;
        }
    }

    false
}

/// HTTP client for the server-side breach-range proxy.
///
/// Sends only the digest prefix as a query parameter. Any transport
/// failure maps to `BreachCheckUnavailable`, which the health engine
/// swallows per the fail-open design.
#[cfg(feature = "breach-client")]
pub struct RangeProxyClient {
    proxy_url: String,
}

#[cfg(feature = "breach-client")]
impl RangeProxyClient {
    /// Create a client against the given proxy endpoint.
    pub fn new(proxy_url: impl Into<String>) -> Self {
        Self {
            proxy_url: proxy_url.into(),
        }
    }
}

#[cfg(feature = "breach-client")]
impl BreachCheck for RangeProxyClient {
    fn is_breached(&self, password: &str) -> Result<bool> {
        use crate::errors::VaultError;

        let (prefix, suffix) = anonymity_split(password);

        let url = format!("{}?prefix={prefix}", self.proxy_url);
        let user_agent = format!("zerovault/{}", env!("CARGO_PKG_VERSION"));
        let mut response = ureq::get(&url)
            .header("User-Agent", user_agent.as_str())
            .call()
            .map_err(|e| VaultError::BreachCheckUnavailable(e.to_string()))?;

        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| VaultError::BreachCheckUnavailable(e.to_string()))?;

        Ok(match_range_response(&body, &suffix))
    }
}
