use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// One entry of the external liquidity ledger. Records are append-only and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityRecord {
    pub pair_address: Address,
    pub liquidity_amount: U256,
}

impl LiquidityRecord {
    pub fn new(pair_address: Address, liquidity_amount: U256) -> Self {
        Self { pair_address, liquidity_amount }
    }
}

/// Client-side running total of an account's contributions to one pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub pair_address: Address,
    pub liquidity: U256,
    /// Number of ledger records summed into `liquidity`.
    pub records: usize,
}

/// Sums records per pool, keeping pools in the order they first appear in the ledger.
pub fn aggregate_records(records: &[LiquidityRecord]) -> Vec<Position> {
    let mut positions: Vec<Position> = Vec::new();
    for record in records {
        match positions
            .iter_mut()
            .find(|p| p.pair_address == record.pair_address)
        {
            Some(position) => {
                position.liquidity = position
                    .liquidity
                    .saturating_add(record.liquidity_amount);
                position.records += 1;
            }
            None => positions.push(Position {
                pair_address: record.pair_address,
                liquidity: record.liquidity_amount,
                records: 1,
            }),
        }
    }
    positions
}
