//! Mapping of contract binding failures onto [`ProtocolError`].

use alloy::{contract::Error as ContractError, providers::PendingTransactionError};
use pairflow_common::errors::ProtocolError;

use crate::rpc::errors::classify;

pub(crate) fn contract_error(context: &str, error: ContractError) -> ProtocolError {
    match error {
        ContractError::TransportError(e) => classify(context, &e),
        other => ProtocolError::Decode(format!("{context}: {other}")),
    }
}

/// Failure while waiting for a receipt. Anything but a node error response means the
/// confirmation could not be observed, which is treated as a network failure.
pub(crate) fn pending_error(context: &str, error: PendingTransactionError) -> ProtocolError {
    match error {
        PendingTransactionError::TransportError(e) => classify(context, &e),
        other => ProtocolError::Network(format!("{context}: {other}")),
    }
}
