use pairflow_common::{
    amount::resolve_amount,
    errors::WorkflowError,
    models::{Deadline, Token},
    traits::AddLiquidityParams,
    Address, TxHash, U256,
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    config::WorkflowConfig,
    session::Session,
    steps::{allowance, balance, ledger, network, pair},
};

/// Add liquidity to the `token_a`/`token_b` pool. Amounts are decimal strings in each token's
/// own units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityRequest {
    pub token_a: Token,
    pub token_b: Token,
    pub amount_a: String,
    pub amount_b: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiquidityOutcome {
    pub pool: Address,
    pub pool_created: bool,
    pub amount_a: U256,
    pub amount_b: U256,
    /// LP tokens minted to the account, measured as the balance difference around the add.
    pub liquidity: U256,
    pub add_tx: TxHash,
    pub record_tx: TxHash,
}

/// Adds liquidity and records the minted LP amount in the ledger.
///
/// Steps run strictly in order and every write is confirmed before the next step starts. A
/// failure aborts the remaining steps; writes that were already confirmed (pool creation, wraps,
/// approvals) are left in place.
#[instrument(skip_all, fields(
    account = %session.account,
    token_a = %request.token_a.symbol,
    token_b = %request.token_b.symbol,
))]
pub async fn add_liquidity(
    session: &Session,
    config: &WorkflowConfig,
    request: LiquidityRequest,
) -> Result<LiquidityOutcome, WorkflowError> {
    let LiquidityRequest { token_a, token_b, amount_a, amount_b } = request;
    if token_a == token_b {
        return Err(WorkflowError::InvalidPair { symbol: token_a.symbol });
    }
    let amount_a = resolve_amount(&token_a, &amount_a)?;
    let amount_b = resolve_amount(&token_b, &amount_b)?;
    network::ensure_connected(session).await?;

    let pool = pair::resolve_or_create(session, &token_a, &token_b).await?;
    info!(pool = %pool.address, created = pool.created, "Resolved pool");

    for (token, amount) in [(&token_a, amount_a), (&token_b, amount_b)] {
        if config.is_wrapped_native(token) {
            balance::wrap_deficit(session, token, amount).await?;
        }
    }

    balance::ensure_balance(session, &token_a, amount_a).await?;
    balance::ensure_balance(session, &token_b, amount_b).await?;

    // The router pulls both sides with transferFrom, the wrapped-native one included.
    let router = session.contracts.router.address();
    allowance::ensure_allowance(session, &token_a, router, amount_a).await?;
    allowance::ensure_allowance(session, &token_b, router, amount_b).await?;

    let lp = &session.contracts.pair;
    let before = lp
        .balance_of(pool.address, session.account)
        .await?;

    let (amount_a_min, amount_b_min) = match config.liquidity_slippage {
        Some(slippage) => (slippage.min_output(amount_a), slippage.min_output(amount_b)),
        None => (U256::ZERO, U256::ZERO),
    };
    let add_tx = session
        .contracts
        .router
        .add_liquidity(AddLiquidityParams {
            token_a: token_a.address,
            token_b: token_b.address,
            amount_a_desired: amount_a,
            amount_b_desired: amount_b,
            amount_a_min,
            amount_b_min,
            to: session.account,
            deadline: Deadline::after(config.liquidity_deadline),
        })
        .await?;
    info!(tx = %add_tx, %amount_a, %amount_b, "Liquidity added");

    let after = lp
        .balance_of(pool.address, session.account)
        .await?;
    let liquidity = after.saturating_sub(before);

    let record_tx = ledger::record(session, pool.address, liquidity).await?;

    Ok(LiquidityOutcome {
        pool: pool.address,
        pool_created: pool.created,
        amount_a,
        amount_b,
        liquidity,
        add_tx,
        record_tx,
    })
}
