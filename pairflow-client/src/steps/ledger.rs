use pairflow_common::{
    errors::WorkflowError,
    models::{aggregate_records, LiquidityRecord, TokenRegistry},
    Address, TxHash, U256,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::session::Session;

/// Appends a liquidity contribution for the session account to the external ledger.
pub async fn record(
    session: &Session,
    pool: Address,
    liquidity: U256,
) -> Result<TxHash, WorkflowError> {
    if liquidity.is_zero() {
        warn!(%pool, "Recording zero liquidity");
    }
    let tx = session
        .contracts
        .ledger
        .add_blockchain(pool, liquidity)
        .await?;
    info!(%pool, %liquidity, %tx, "Recorded liquidity");
    Ok(tx)
}

/// Every ledger record of `account`, in insertion order.
pub async fn history(
    session: &Session,
    account: Address,
) -> Result<Vec<LiquidityRecord>, WorkflowError> {
    let records = session
        .contracts
        .ledger
        .get_transactions(account)
        .await?;
    debug!(%account, records = records.len(), "Read ledger");
    Ok(records)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolToken {
    pub address: Address,
    pub symbol: String,
}

/// Aggregated ledger position of an account in one pool, with the pool's tokens resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionView {
    pub pair_address: Address,
    pub token0: PoolToken,
    pub token1: PoolToken,
    pub liquidity: U256,
    pub records: usize,
}

async fn pool_token(
    session: &Session,
    registry: &TokenRegistry,
    address: Address,
) -> PoolToken {
    let symbol = match registry.by_address(&address) {
        Some(token) => token.symbol.clone(),
        None => session
            .contracts
            .erc20
            .symbol(address)
            .await
            .unwrap_or_else(|_| address.to_string()),
    };
    PoolToken { address, symbol }
}

/// Sums the ledger per pool for `account` and resolves each pool's tokens.
pub async fn positions(
    session: &Session,
    registry: &TokenRegistry,
    account: Address,
) -> Result<Vec<PositionView>, WorkflowError> {
    let records = history(session, account).await?;
    let mut views = Vec::new();
    for position in aggregate_records(&records) {
        let pair = &session.contracts.pair;
        let token0 = pair.token0(position.pair_address).await?;
        let token1 = pair.token1(position.pair_address).await?;
        views.push(PositionView {
            pair_address: position.pair_address,
            token0: pool_token(session, registry, token0).await,
            token1: pool_token(session, registry, token1).await,
            liquidity: position.liquidity,
            records: position.records,
        });
    }
    Ok(views)
}
