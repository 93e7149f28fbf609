//! Storefront policy constants.
//!
//! The two knobs that changed across revisions of the original storefront —
//! the cancellation window (20 minutes, later 10) and the flat delivery fee —
//! live here as one validated config struct instead of magic numbers. The
//! defaults fix the window at 10 minutes and the fee at 50.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default cancellation window: 10 minutes.
const DEFAULT_CANCEL_WINDOW_SECS: u64 = 600;

/// Default flat delivery fee, in whole currency units.
const DEFAULT_DELIVERY_FEE: i64 = 50;

/// Upper bound on the window: one year. Keeps the window safely inside
/// `chrono::Duration`'s representable range.
const MAX_CANCEL_WINDOW_SECS: u64 = 365 * 24 * 60 * 60;

/// Validated storefront policy.
///
/// Loaded from YAML (all keys optional) or taken as [`Default`]. Invalid
/// values are rejected at load time so the ledger never has to re-check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorePolicy {
    /// Seconds after placement during which an order may be cancelled.
    #[serde(default = "default_cancel_window_secs")]
    pub cancel_window_secs: u64,
    /// Flat fee added to every order's subtotal at placement.
    #[serde(default = "default_delivery_fee")]
    pub delivery_fee: i64,
}

fn default_cancel_window_secs() -> u64 {
    DEFAULT_CANCEL_WINDOW_SECS
}

fn default_delivery_fee() -> i64 {
    DEFAULT_DELIVERY_FEE
}

impl Default for StorePolicy {
    fn default() -> Self {
        Self {
            cancel_window_secs: DEFAULT_CANCEL_WINDOW_SECS,
            delivery_fee: DEFAULT_DELIVERY_FEE,
        }
    }
}

impl StorePolicy {
    /// Parse a policy from a YAML document. Missing keys fall back to the
    /// defaults; present keys are validated.
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let policy: StorePolicy = serde_yaml::from_str(raw).context("invalid policy yaml")?;
        policy.validate()?;
        Ok(policy)
    }

    /// Load a policy from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())
            .with_context(|| format!("read policy file {:?}", path.as_ref()))?;
        Self::from_yaml_str(&raw)
    }

    /// The cancellation window as a `chrono::Duration`.
    pub fn cancel_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cancel_window_secs as i64)
    }

    fn validate(&self) -> Result<()> {
        if self.cancel_window_secs == 0 {
            bail!("POLICY_INVALID cancel_window_secs must be > 0");
        }
        if self.cancel_window_secs > MAX_CANCEL_WINDOW_SECS {
            bail!(
                "POLICY_INVALID cancel_window_secs must be <= {MAX_CANCEL_WINDOW_SECS}, got {}",
                self.cancel_window_secs
            );
        }
        if self.delivery_fee < 0 {
            bail!(
                "POLICY_INVALID delivery_fee must be >= 0, got {}",
                self.delivery_fee
            );
        }
        Ok(())
    }
}
