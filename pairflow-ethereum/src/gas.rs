use serde::{Deserialize, Serialize};

pub const WEI_PER_GWEI: u128 = 1_000_000_000;

pub fn gwei_to_wei(gwei: u64) -> u128 {
    u128::from(gwei) * WEI_PER_GWEI
}

/// Explicit gas limit attached to every transaction the client sends.
///
/// Setting the limit up front skips `eth_estimateGas`, so a call that would revert is still
/// mined and reported through its failed receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasLimits {
    /// `deposit`/`withdraw` on the wrapped-native token.
    pub wrap: u64,
    pub approve: u64,
    pub transfer: u64,
    pub add_liquidity: u64,
    pub swap: u64,
    pub create_pair: u64,
    /// `addBlockchain` on the ledger contract.
    pub ledger_record: u64,
}

impl Default for GasLimits {
    fn default() -> Self {
        Self {
            wrap: 100_000,
            approve: 100_000,
            transfer: 100_000,
            add_liquidity: 2_000_000,
            swap: 300_000,
            create_pair: 5_000_000,
            ledger_record: 200_000,
        }
    }
}
