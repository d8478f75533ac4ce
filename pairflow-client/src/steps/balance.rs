use pairflow_common::{amount::format_amount, errors::WorkflowError, models::Token, U256};
use serde::Serialize;
use tracing::{debug, info};

use crate::session::Session;

pub async fn token_balance(session: &Session, token: &Token) -> Result<U256, WorkflowError> {
    let balance = session
        .contracts
        .erc20
        .balance_of(token.address, session.account)
        .await?;
    debug!(symbol = %token.symbol, %balance, "Read token balance");
    Ok(balance)
}

/// Fails with `InsufficientBalance` unless the account holds at least `required` of `token`.
/// Returns the balance read.
pub async fn ensure_balance(
    session: &Session,
    token: &Token,
    required: U256,
) -> Result<U256, WorkflowError> {
    let available = token_balance(session, token).await?;
    if available < required {
        return Err(WorkflowError::InsufficientBalance {
            symbol: token.symbol.clone(),
            required,
            available,
        });
    }
    Ok(available)
}

/// Makes sure the account holds `required` of the wrapped-native `token`, depositing native
/// currency for the deficit only.
///
/// Returns the deposited amount, `None` when the wrapped balance already sufficed.
pub async fn wrap_deficit(
    session: &Session,
    token: &Token,
    required: U256,
) -> Result<Option<U256>, WorkflowError> {
    let wrapped = token_balance(session, token).await?;
    if wrapped >= required {
        return Ok(None);
    }

    let deficit = required - wrapped;
    let native = session
        .contracts
        .chain
        .native_balance(session.account)
        .await?;
    if native < deficit {
        return Err(WorkflowError::InsufficientNativeBalance { required: deficit, available: native });
    }

    let tx = session
        .contracts
        .wrapped_native
        .deposit(token.address, deficit)
        .await?;
    info!(symbol = %token.symbol, %deficit, %tx, "Wrapped native currency");
    Ok(Some(deficit))
}

/// Balances of both sides of a swap, rendered for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Balances {
    pub token_in: String,
    pub token_out: String,
}

pub async fn refresh(
    session: &Session,
    token_in: &Token,
    token_out: &Token,
) -> Result<Balances, WorkflowError> {
    let balance_in = token_balance(session, token_in).await?;
    let balance_out = token_balance(session, token_out).await?;
    Ok(Balances {
        token_in: format_amount(token_in, balance_in),
        token_out: format_amount(token_out, balance_out),
    })
}
