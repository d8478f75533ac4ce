use pairflow_common::{errors::WorkflowError, models::Token, Address, TxHash, U256};
use tracing::{debug, info};

use crate::session::Session;

/// Ensures `spender` may transfer at least `required` of `token` from the session account.
///
/// Reads the current allowance and, only when it is short, submits an unlimited approval and
/// waits for it. Returns the approval hash when one was sent.
pub async fn ensure_allowance(
    session: &Session,
    token: &Token,
    spender: Address,
    required: U256,
) -> Result<Option<TxHash>, WorkflowError> {
    let current = session
        .contracts
        .erc20
        .allowance(token.address, session.account, spender)
        .await?;
    if current >= required {
        debug!(symbol = %token.symbol, %spender, %current, "Allowance sufficient");
        return Ok(None);
    }

    let tx = session
        .contracts
        .erc20
        .approve(token.address, spender, U256::MAX)
        .await
        .map_err(|source| WorkflowError::AllowanceTransactionFailed {
            symbol: token.symbol.clone(),
            spender,
            source,
        })?;
    info!(symbol = %token.symbol, %spender, %tx, "Approved spender");
    Ok(Some(tx))
}
