//! Retry of raw chain reads on transient transport failures.

use std::{future::Future, time::Duration};

use alloy::{
    rpc::json_rpc::ErrorPayload,
    transports::{RpcError, TransportErrorKind},
};
use backoff::{backoff::Backoff, exponential::ExponentialBackoffBuilder, ExponentialBackoff};
use serde::Deserialize;
use serde_json::value::RawValue;
use tracing::warn;

use super::config::RPCRetryConfig;

/// Extension trait to implement retry logic for [`RpcError<TransportErrorKind>`].
///
/// # Attribution
/// Adapted from alloy-transport:
/// https://github.com/alloy-rs/alloy/blob/a3899575fbc0c789275f95661516b99e9a92838d/crates/transport/src/error.rs#L156
/// License: MIT OR Apache-2.0
pub(crate) trait RpcErrorExt {
    /// Returns `true` for transient errors that are likely to succeed on retry: rate limiting
    /// (429), service unavailable (503), null responses and retryable JSON-RPC error codes.
    fn is_retryable(&self) -> bool;

    /// Suggested wait from a rate limit response (`data.rate.backoff_seconds`), if present.
    fn backoff_hint(&self) -> Option<Duration>;
}

impl<E: std::borrow::Borrow<RawValue>> RpcErrorExt for RpcError<TransportErrorKind, E> {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(err) => err.is_retry_err(),
            Self::ErrorResp(payload) => payload.is_retry_err(),
            Self::NullResp => true,
            // Some nodes answer rate limits with an error body that is not a valid response.
            Self::DeserError { text, .. } => error_payload(text).is_some_and(|p| p.is_retry_err()),
            _ => false,
        }
    }

    fn backoff_hint(&self) -> Option<Duration> {
        let Self::ErrorResp(payload) = self else {
            return None;
        };
        let data = payload
            .try_data_as::<serde_json::Value>()?
            .ok()?;
        let seconds = data
            .pointer("/rate/backoff_seconds")?
            .as_f64()?;
        Some(Duration::from_secs(seconds.ceil() as u64))
    }
}

/// Error object of a failed response, either bare or wrapped in an `error` field.
fn error_payload(text: &str) -> Option<ErrorPayload> {
    #[derive(Deserialize)]
    struct Wrapped {
        error: ErrorPayload,
    }

    serde_json::from_str::<ErrorPayload>(text)
        .or_else(|_| serde_json::from_str::<Wrapped>(text).map(|w| w.error))
        .ok()
}

/// Exponential backoff bounded by a maximum number of retries.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    max_retries: usize,
    backoff: ExponentialBackoff,
}

impl RetryPolicy {
    pub fn new(max_retries: usize, backoff: ExponentialBackoff) -> Self {
        Self { max_retries, backoff }
    }

    #[cfg(test)]
    pub fn for_testing(max_retries: usize) -> Self {
        Self::new(
            max_retries,
            ExponentialBackoffBuilder::new()
                .with_initial_interval(Duration::from_millis(1))
                .with_multiplier(1.1)
                .with_max_interval(Duration::from_millis(5))
                .with_max_elapsed_time(None)
                .build(),
        )
    }

    /// Runs `operation`, retrying transient failures until `max_retries` is exhausted.
    ///
    /// Permanent errors (reverts, malformed requests) are returned immediately.
    pub(crate) async fn retry_request<F, Fut, T>(
        &self,
        mut operation: F,
    ) -> Result<T, RpcError<TransportErrorKind>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RpcError<TransportErrorKind>>>,
    {
        let mut backoff = self.backoff.clone();
        backoff.reset();
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_retries && err.is_retryable() => {
                    let Some(delay) = err
                        .backoff_hint()
                        .or_else(|| backoff.next_backoff())
                    else {
                        return Err(err);
                    };
                    attempt += 1;
                    warn!(attempt, ?delay, error = %err, "Retrying RPC request");
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl From<RPCRetryConfig> for RetryPolicy {
    fn from(config: RPCRetryConfig) -> Self {
        Self::new(
            config.max_retries,
            ExponentialBackoffBuilder::new()
                .with_initial_interval(Duration::from_millis(config.initial_backoff_ms))
                .with_max_interval(Duration::from_millis(config.max_backoff_ms))
                .with_max_elapsed_time(None)
                .build(),
        )
    }
}
