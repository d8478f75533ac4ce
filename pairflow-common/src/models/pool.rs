use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Unordered pair of token addresses. Two pairs with swapped sides are equal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TokenPair {
    pub token_a: Address,
    pub token_b: Address,
}

impl TokenPair {
    pub fn new(token_a: Address, token_b: Address) -> Self {
        Self { token_a, token_b }
    }

    /// The pair sorted the way the factory orders pool tokens.
    pub fn sorted(&self) -> (Address, Address) {
        if self.token_a < self.token_b {
            (self.token_a, self.token_b)
        } else {
            (self.token_b, self.token_a)
        }
    }

    pub fn contains(&self, token: &Address) -> bool {
        &self.token_a == token || &self.token_b == token
    }
}

impl PartialEq for TokenPair {
    fn eq(&self, other: &Self) -> bool {
        self.sorted() == other.sorted()
    }
}

impl Eq for TokenPair {}

/// Raw `getReserves()` answer, in the pool's canonical token order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reserves {
    pub reserve0: U256,
    pub reserve1: U256,
    pub block_timestamp_last: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
    pub reserve0: U256,
    pub reserve1: U256,
}

impl Pool {
    pub fn new(address: Address, token0: Address, token1: Address, reserves: Reserves) -> Self {
        Self {
            address,
            token0,
            token1,
            reserve0: reserves.reserve0,
            reserve1: reserves.reserve1,
        }
    }

    /// Reserve held for `token`, regardless of which side of the pool it sits on.
    pub fn reserve_of(&self, token: &Address) -> Option<U256> {
        if &self.token0 == token {
            Some(self.reserve0)
        } else if &self.token1 == token {
            Some(self.reserve1)
        } else {
            None
        }
    }

    pub fn pair(&self) -> TokenPair {
        TokenPair::new(self.token0, self.token1)
    }
}
