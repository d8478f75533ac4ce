use pairflow_common::{
    errors::WorkflowError,
    models::{Pool, Token},
    Address,
};
use tracing::{debug, info};

use crate::session::Session;

/// Pool address for the unordered pair, `None` when the factory has none.
pub async fn find_pool(
    session: &Session,
    token_a: Address,
    token_b: Address,
) -> Result<Option<Address>, WorkflowError> {
    let pool = session
        .contracts
        .factory
        .get_pair(token_a, token_b)
        .await?;
    debug!(%token_a, %token_b, %pool, "Looked up pool");
    Ok((!pool.is_zero()).then_some(pool))
}

/// Like [`find_pool`], failing with `PoolNotFound` instead of returning `None`.
pub async fn require_pool(
    session: &Session,
    token_a: Address,
    token_b: Address,
) -> Result<Address, WorkflowError> {
    find_pool(session, token_a, token_b)
        .await?
        .ok_or(WorkflowError::PoolNotFound { token_a, token_b })
}

/// Pool resolved for a liquidity request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPool {
    pub address: Address,
    /// Whether this call created the pool.
    pub created: bool,
}

/// Returns the pool for the pair, creating it through the factory when it does not exist yet.
pub async fn resolve_or_create(
    session: &Session,
    token_a: &Token,
    token_b: &Token,
) -> Result<ResolvedPool, WorkflowError> {
    if let Some(address) = find_pool(session, token_a.address, token_b.address).await? {
        return Ok(ResolvedPool { address, created: false });
    }

    let tx = session
        .contracts
        .factory
        .create_pair(token_a.address, token_b.address)
        .await?;
    info!(token_a = %token_a.symbol, token_b = %token_b.symbol, %tx, "Created pool");

    let address = require_pool(session, token_a.address, token_b.address).await?;
    Ok(ResolvedPool { address, created: true })
}

/// Current state of an existing pool, in the pool's own token order.
pub async fn pool_state(
    session: &Session,
    token_a: Address,
    token_b: Address,
) -> Result<Pool, WorkflowError> {
    let address = require_pool(session, token_a, token_b).await?;
    let pair = &session.contracts.pair;
    let token0 = pair.token0(address).await?;
    let token1 = pair.token1(address).await?;
    let reserves = pair.get_reserves(address).await?;
    Ok(Pool::new(address, token0, token1, reserves))
}
