pub mod ledger;
pub mod pool;
pub mod token;

use std::time::Duration;

use alloy_primitives::U256;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use ledger::{aggregate_records, LiquidityRecord, Position};
pub use pool::{Pool, Reserves, TokenPair};
pub use token::{Token, TokenRegistry};

/// Absolute UNIX timestamp after which the protocol rejects a submitted call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Deadline(u64);

impl Deadline {
    /// Deadline `window` after the current wall-clock time.
    pub fn after(window: Duration) -> Self {
        Self::at(Utc::now(), window)
    }

    pub fn at(now: DateTime<Utc>, window: Duration) -> Self {
        let now = u64::try_from(now.timestamp()).unwrap_or_default();
        Self(now.saturating_add(window.as_secs()))
    }

    pub fn timestamp(&self) -> u64 {
        self.0
    }

    pub fn as_u256(&self) -> U256 {
        U256::from(self.0)
    }
}

/// Maximum accepted adverse deviation, in basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slippage {
    bps: u16,
}

impl Slippage {
    const BPS_DENOMINATOR: u64 = 10_000;

    /// Tolerances above 100% are clamped to 100%.
    pub fn from_bps(bps: u16) -> Self {
        Self { bps: bps.min(Self::BPS_DENOMINATOR as u16) }
    }

    pub fn bps(&self) -> u16 {
        self.bps
    }

    /// Lowest acceptable amount given an expected `amount`, rounded down.
    pub fn min_output(&self, amount: U256) -> U256 {
        let keep = U256::from(Self::BPS_DENOMINATOR - u64::from(self.bps));
        match amount.checked_mul(keep) {
            Some(scaled) => scaled / U256::from(Self::BPS_DENOMINATOR),
            None => amount / U256::from(Self::BPS_DENOMINATOR) * keep,
        }
    }
}

impl Default for Slippage {
    fn default() -> Self {
        Self::from_bps(50)
    }
}
