use alloy_primitives::{Address, U256};
use thiserror::Error;

use crate::TxHash;

/// Failure reported by a contract binding.
///
/// Bindings never retry on their own; the workflow decides what a failure means.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The node could not be reached or the transport broke mid-request.
    #[error("Network error: {0}")]
    Network(String),
    /// The node rejected the call, e.g. an `eth_call` or gas estimation revert.
    #[error("Call reverted: {0}")]
    Reverted(String),
    /// The transaction was mined but its receipt reports failure.
    #[error("Transaction {hash} failed on-chain")]
    TransactionFailed { hash: TxHash },
    /// The node answered with data that could not be decoded.
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ProtocolError {
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Terminal outcome of a failed workflow, carrying enough context to render a precise message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Invalid amount '{input}' for {symbol}: {reason}")]
    InvalidAmount { input: String, symbol: String, reason: String },
    #[error("Both sides of the pair are {symbol}")]
    InvalidPair { symbol: String },
    #[error("Insufficient {symbol} balance: required {required}, available {available}")]
    InsufficientBalance { symbol: String, required: U256, available: U256 },
    #[error("Insufficient native balance: required {required}, available {available}")]
    InsufficientNativeBalance { required: U256, available: U256 },
    #[error("No pool exists for {token_a}/{token_b}")]
    PoolNotFound { token_a: Address, token_b: Address },
    #[error("Quote unavailable for path {path:?}: {reason}")]
    QuoteUnavailable { path: Vec<Address>, reason: String },
    #[error("Gas price {current} wei exceeds ceiling of {ceiling} wei")]
    GasPriceTooHigh { current: u128, ceiling: u128 },
    #[error("Approval of {symbol} for spender {spender} failed: {source}")]
    AllowanceTransactionFailed {
        symbol: String,
        spender: Address,
        #[source]
        source: ProtocolError,
    },
    #[error("Protocol call reverted: {0}")]
    ProtocolCallReverted(#[source] ProtocolError),
    #[error("Network unreachable: {0}")]
    NetworkUnreachable(String),
    #[error("Workflow aborted: {0}")]
    Aborted(String),
}

impl From<ProtocolError> for WorkflowError {
    fn from(error: ProtocolError) -> Self {
        match error {
            ProtocolError::Network(msg) => WorkflowError::NetworkUnreachable(msg),
            other => WorkflowError::ProtocolCallReverted(other),
        }
    }
}
