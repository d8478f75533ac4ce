use std::time::Duration;

use pairflow_common::{
    errors::WorkflowError, models::Token, routing::build_path, Address, U256,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub path: Vec<Address>,
    pub amount_in: U256,
    /// Expected output at the last hop.
    pub amount_out: U256,
}

/// Asks the router for the output of swapping `amount_in` of `token_in` into `token_out`.
///
/// The route goes through `wrapped_native` when neither side is the wrapped-native token.
pub async fn quote(
    session: &Session,
    token_in: &Token,
    token_out: &Token,
    amount_in: U256,
    wrapped_native: Address,
) -> Result<Quote, WorkflowError> {
    let path = build_path(token_in.address, token_out.address, wrapped_native);
    let unavailable = |reason: String| WorkflowError::QuoteUnavailable { path: path.clone(), reason };

    let amounts = session
        .contracts
        .router
        .get_amounts_out(amount_in, path.clone())
        .await
        .map_err(|e| unavailable(e.to_string()))?;
    let amount_out = match amounts.last() {
        Some(amount) if amounts.len() == path.len() => *amount,
        _ => {
            return Err(unavailable(format!(
                "router returned {} amounts for a path of {}",
                amounts.len(),
                path.len()
            )))
        }
    };

    debug!(from = %token_in.symbol, to = %token_out.symbol, %amount_in, %amount_out, "Quoted");
    Ok(Quote { path, amount_in, amount_out })
}

/// [`quote`], retried once after `retry_delay` if the first attempt fails.
pub async fn quote_with_retry(
    session: &Session,
    token_in: &Token,
    token_out: &Token,
    amount_in: U256,
    wrapped_native: Address,
    retry_delay: Duration,
) -> Result<Quote, WorkflowError> {
    match quote(session, token_in, token_out, amount_in, wrapped_native).await {
        Ok(quote) => Ok(quote),
        Err(err) => {
            warn!(error = %err, "Quote failed, retrying once");
            tokio::time::sleep(retry_delay).await;
            quote(session, token_in, token_out, amount_in, wrapped_native).await
        }
    }
}

/// Price of one whole `token` expressed in base units of `quote_token`.
///
/// `None` when the token has no route to the quote token.
pub async fn unit_price(
    session: &Session,
    token: &Token,
    quote_token: &Token,
    wrapped_native: Address,
) -> Option<U256> {
    let one = token.one()?;
    match quote(session, token, quote_token, one, wrapped_native).await {
        Ok(quote) => Some(quote.amount_out),
        Err(err) => {
            debug!(symbol = %token.symbol, error = %err, "No price");
            None
        }
    }
}
