//! Entry points of the two orchestration workflows and the read-only views around them.

pub mod liquidity;
pub mod swap;

use std::{future::Future, sync::Arc};

use pairflow_common::{
    amount::{format_amount, resolve_amount},
    errors::WorkflowError,
    models::{LiquidityRecord, Pool, Token, TokenRegistry},
    Address,
};
use serde::Serialize;
use tracing::debug;

pub use liquidity::{LiquidityOutcome, LiquidityRequest};
pub use swap::{SwapOutcome, SwapRequest};

use crate::{
    config::WorkflowConfig,
    session::{AccountLocks, Session},
    steps::{
        ledger::{self, PositionView},
        pair,
        quote::{self, Quote},
    },
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPrice {
    pub symbol: String,
    /// Price of one whole token in the quote token, `None` when no route exists.
    pub price: Option<String>,
}

/// Runs workflows with at most one in flight per account.
///
/// A started workflow runs to completion on its own task, even if the caller stops waiting for
/// it, since submitted transactions cannot be retracted.
#[derive(Clone)]
pub struct Exchange {
    config: Arc<WorkflowConfig>,
    registry: Arc<TokenRegistry>,
    locks: AccountLocks,
}

impl Exchange {
    pub fn new(config: WorkflowConfig, registry: TokenRegistry) -> Self {
        Self { config: Arc::new(config), registry: Arc::new(registry), locks: AccountLocks::default() }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    pub async fn add_liquidity(
        &self,
        session: &Session,
        request: LiquidityRequest,
    ) -> Result<LiquidityOutcome, WorkflowError> {
        self.serialized(session.clone(), |session, config| async move {
            liquidity::add_liquidity(&session, &config, request).await
        })
        .await
    }

    pub async fn swap(
        &self,
        session: &Session,
        request: SwapRequest,
    ) -> Result<SwapOutcome, WorkflowError> {
        self.serialized(session.clone(), |session, config| async move {
            swap::swap(&session, &config, request).await
        })
        .await
    }

    async fn serialized<F, Fut, T>(&self, session: Session, workflow: F) -> Result<T, WorkflowError>
    where
        F: FnOnce(Session, Arc<WorkflowConfig>) -> Fut,
        Fut: Future<Output = Result<T, WorkflowError>> + Send + 'static,
        T: Send + 'static,
    {
        let guard = self.locks.acquire(session.account).await;
        debug!(account = %session.account, "Acquired account lock");
        let task = workflow(session, self.config.clone());
        tokio::spawn(async move {
            let result = task.await;
            drop(guard);
            result
        })
        .await
        .map_err(|e| WorkflowError::Aborted(e.to_string()))?
    }

    pub async fn positions(
        &self,
        session: &Session,
        account: Address,
    ) -> Result<Vec<PositionView>, WorkflowError> {
        ledger::positions(session, &self.registry, account).await
    }

    pub async fn history(
        &self,
        session: &Session,
        account: Address,
    ) -> Result<Vec<LiquidityRecord>, WorkflowError> {
        ledger::history(session, account).await
    }

    /// Quotes `amount_in` (decimal string) of `token_in` into `token_out` without trading.
    pub async fn quote(
        &self,
        session: &Session,
        token_in: &Token,
        token_out: &Token,
        amount_in: &str,
    ) -> Result<Quote, WorkflowError> {
        if token_in == token_out {
            return Err(WorkflowError::InvalidPair { symbol: token_in.symbol.clone() });
        }
        let amount_in = resolve_amount(token_in, amount_in)?;
        quote::quote(session, token_in, token_out, amount_in, self.config.wrapped_native.address)
            .await
    }

    pub async fn pool(
        &self,
        session: &Session,
        token_a: &Token,
        token_b: &Token,
    ) -> Result<Pool, WorkflowError> {
        if token_a == token_b {
            return Err(WorkflowError::InvalidPair { symbol: token_a.symbol.clone() });
        }
        pair::pool_state(session, token_a.address, token_b.address).await
    }

    /// Unit price of every registered token in `quote_token`.
    pub async fn prices(&self, session: &Session, quote_token: &Token) -> Vec<TokenPrice> {
        let mut prices = Vec::with_capacity(self.registry.len());
        for token in self
            .registry
            .iter()
            .filter(|token| *token != quote_token)
        {
            let price = quote::unit_price(session, token, quote_token, self.config.wrapped_native.address)
                .await
                .map(|price| format_amount(quote_token, price));
            prices.push(TokenPrice { symbol: token.symbol.clone(), price });
        }
        prices
    }
}
