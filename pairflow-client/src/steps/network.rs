use pairflow_common::errors::{ProtocolError, WorkflowError};
use tracing::{debug, warn};

use crate::session::Session;

/// Confirms the node answers. On a network failure the bindings reconnect once and the check is
/// repeated before giving up with `NetworkUnreachable`.
pub async fn ensure_connected(session: &Session) -> Result<u64, WorkflowError> {
    let chain = &session.contracts.chain;
    match chain.chain_id().await {
        Ok(chain_id) => {
            debug!(chain_id, "Node reachable");
            Ok(chain_id)
        }
        Err(err) if err.is_network() => {
            warn!(error = %err, "Node unreachable, reconnecting");
            chain
                .reconnect()
                .await
                .map_err(unreachable)?;
            chain
                .chain_id()
                .await
                .map_err(unreachable)
        }
        Err(err) => Err(err.into()),
    }
}

fn unreachable(err: ProtocolError) -> WorkflowError {
    WorkflowError::NetworkUnreachable(err.to_string())
}

/// Fails with `GasPriceTooHigh` when the current network gas price exceeds `ceiling` (wei).
pub async fn ensure_gas_price(session: &Session, ceiling: u128) -> Result<u128, WorkflowError> {
    let current = session
        .contracts
        .chain
        .gas_price()
        .await?;
    if current > ceiling {
        return Err(WorkflowError::GasPriceTooHigh { current, ceiling });
    }
    debug!(current, ceiling, "Gas price within ceiling");
    Ok(current)
}
