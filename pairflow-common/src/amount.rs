//! Conversion between user-entered decimal strings and base-unit integers.

use alloy_primitives::{
    utils::{format_units, parse_units, ParseUnits},
    U256,
};

use crate::{errors::WorkflowError, models::Token};

/// Decimals used for the wrapped-native token, whatever its registry entry says.
pub const NATIVE_DECIMALS: u8 = 18;

fn scale_of(token: &Token) -> u8 {
    if token.wrapped_native {
        NATIVE_DECIMALS
    } else {
        token.decimals
    }
}

/// Resolves a decimal string such as `"2000"` or `"0.5"` into base units of `token`.
///
/// Fractional digits beyond the token's precision are truncated. Empty, non-numeric and
/// non-positive inputs are rejected with [`WorkflowError::InvalidAmount`].
pub fn resolve_amount(token: &Token, input: &str) -> Result<U256, WorkflowError> {
    let invalid = |reason: &str| WorkflowError::InvalidAmount {
        input: input.to_string(),
        symbol: token.symbol.clone(),
        reason: reason.to_string(),
    };

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid("amount is empty"));
    }

    match parse_units(trimmed, scale_of(token)) {
        Ok(ParseUnits::U256(value)) if value > U256::ZERO => Ok(value),
        Ok(ParseUnits::U256(_)) | Ok(ParseUnits::I256(_)) => {
            Err(invalid("amount must be greater than zero"))
        }
        Err(err) => Err(invalid(&err.to_string())),
    }
}

/// Renders base units of `token` as a decimal string without trailing zeros.
pub fn format_amount(token: &Token, amount: U256) -> String {
    match format_units(amount, scale_of(token)) {
        Ok(formatted) if formatted.contains('.') => formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string(),
        Ok(formatted) => formatted,
        Err(_) => amount.to_string(),
    }
}
