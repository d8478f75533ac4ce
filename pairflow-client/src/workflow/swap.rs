use pairflow_common::{
    amount::resolve_amount,
    errors::WorkflowError,
    models::{Deadline, Token},
    routing::{build_path, hops},
    traits::SwapParams,
    Address, TxHash, U256,
};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    config::WorkflowConfig,
    session::Session,
    steps::{
        allowance,
        balance::{self, Balances},
        network, pair, quote,
    },
};

/// Swap an exact `amount_in` (decimal string in `token_in` units) into `token_out`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRequest {
    pub token_in: Token,
    pub token_out: Token,
    pub amount_in: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapOutcome {
    pub path: Vec<Address>,
    pub amount_in: U256,
    pub quoted_out: U256,
    pub min_out: U256,
    /// Native currency wrapped to cover the input and commission.
    pub wrapped: Option<U256>,
    pub commission: Option<U256>,
    pub tx: TxHash,
    /// `None` when the balances could not be re-read after the swap.
    pub balances: Option<Balances>,
}

/// Executes an exact-input swap.
///
/// Refuses to start while the node is unreachable or the gas price is above the configured
/// ceiling. Every pool along the route must already exist; swaps never create pools.
#[instrument(skip_all, fields(
    account = %session.account,
    token_in = %request.token_in.symbol,
    token_out = %request.token_out.symbol,
))]
pub async fn swap(
    session: &Session,
    config: &WorkflowConfig,
    request: SwapRequest,
) -> Result<SwapOutcome, WorkflowError> {
    let SwapRequest { token_in, token_out, amount_in } = request;
    if token_in == token_out {
        return Err(WorkflowError::InvalidPair { symbol: token_in.symbol });
    }

    network::ensure_connected(session).await?;
    network::ensure_gas_price(session, config.max_gas_price_wei).await?;

    let amount_in = resolve_amount(&token_in, &amount_in)?;

    let wrapped_native = config.wrapped_native.address;
    let route = build_path(token_in.address, token_out.address, wrapped_native);
    for (from, to) in hops(&route) {
        pair::require_pool(session, from, to).await?;
    }

    let (wrapped, commission) = if config.is_wrapped_native(&token_in) {
        let commission = config.commission_for(&token_in).cloned();
        let fee = commission
            .as_ref()
            .map(|c| c.amount)
            .unwrap_or_default();
        let required = amount_in.saturating_add(fee);

        let wrapped = balance::wrap_deficit(session, &token_in, required).await?;
        balance::ensure_balance(session, &token_in, required).await?;

        if let Some(commission) = &commission {
            let tx = session
                .contracts
                .erc20
                .transfer(token_in.address, commission.collector, commission.amount)
                .await?;
            info!(collector = %commission.collector, amount = %commission.amount, %tx, "Paid commission");
        }
        (wrapped, commission.map(|c| c.amount))
    } else {
        balance::ensure_balance(session, &token_in, amount_in).await?;
        (None, None)
    };

    let router = session.contracts.router.address();
    allowance::ensure_allowance(session, &token_in, router, amount_in).await?;

    let quote = quote::quote_with_retry(
        session,
        &token_in,
        &token_out,
        amount_in,
        wrapped_native,
        config.quote_retry_delay,
    )
    .await?;
    let min_out = config
        .swap_slippage
        .min_output(quote.amount_out);

    let nonce = session
        .contracts
        .chain
        .transaction_count(session.account)
        .await?;
    let tx = session
        .contracts
        .router
        .swap_exact_tokens_for_tokens(SwapParams {
            amount_in,
            amount_out_min: min_out,
            path: quote.path.clone(),
            to: session.account,
            deadline: Deadline::after(config.swap_deadline),
            nonce,
        })
        .await?;
    info!(%tx, %amount_in, quoted_out = %quote.amount_out, %min_out, nonce, "Swapped");

    let balances = match balance::refresh(session, &token_in, &token_out).await {
        Ok(balances) => Some(balances),
        Err(err) => {
            warn!(error = %err, "Failed to refresh balances");
            None
        }
    };

    Ok(SwapOutcome {
        path: quote.path,
        amount_in,
        quoted_out: quote.amount_out,
        min_out,
        wrapped,
        commission,
        tx,
        balances,
    })
}
