use std::time::Duration;

use pairflow_common::{
    models::{token::WETH_ADDRESS, Slippage, Token},
    Address, U256,
};
use serde::{Deserialize, Serialize};

/// 100 gwei.
pub const DEFAULT_MAX_GAS_PRICE_WEI: u128 = 100_000_000_000;

/// Fee charged on swaps paid in the wrapped-native token, denominated in its base units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commission {
    pub collector: Address,
    pub amount: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowConfig {
    /// Swaps are refused while the network gas price is above this value (wei).
    pub max_gas_price_wei: u128,
    pub swap_slippage: Slippage,
    /// `None` submits liquidity with zero minimum amounts.
    pub liquidity_slippage: Option<Slippage>,
    pub liquidity_deadline: Duration,
    pub swap_deadline: Duration,
    /// Wait before the single quote retry.
    pub quote_retry_delay: Duration,
    pub wrapped_native: Token,
    pub commission: Option<Commission>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_gas_price_wei: DEFAULT_MAX_GAS_PRICE_WEI,
            swap_slippage: Slippage::default(),
            liquidity_slippage: None,
            liquidity_deadline: Duration::from_secs(600),
            swap_deadline: Duration::from_secs(1200),
            quote_retry_delay: Duration::from_secs(1),
            wrapped_native: Token::wrapped_native(WETH_ADDRESS, "WETH", "Wrapped Ethereum"),
            commission: None,
        }
    }
}

impl WorkflowConfig {
    pub fn with_wrapped_native(mut self, token: Token) -> Self {
        self.wrapped_native = token;
        self
    }

    pub fn with_commission(mut self, commission: Option<Commission>) -> Self {
        self.commission = commission;
        self
    }

    pub fn is_wrapped_native(&self, token: &Token) -> bool {
        token.address == self.wrapped_native.address
    }

    /// Commission to charge on a swap from `token_in`, if any.
    pub fn commission_for(&self, token_in: &Token) -> Option<&Commission> {
        if !self.is_wrapped_native(token_in) {
            return None;
        }
        self.commission
            .as_ref()
            .filter(|c| !c.amount.is_zero())
    }
}
