use std::fmt::Display;

use alloy::transports::{RpcError as AlloyRpcError, TransportErrorKind};
use pairflow_common::errors::ProtocolError;
use thiserror::Error;

pub(crate) type AlloyError = AlloyRpcError<TransportErrorKind>;

#[derive(Error, Debug)]
pub struct ReqwestError {
    pub msg: String,
    #[source]
    pub source: AlloyError,
}

impl Display for ReqwestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.msg, self.source)
    }
}

#[derive(Error, Debug)]
pub enum RequestError {
    Reqwest(ReqwestError),
}

impl Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestError::Reqwest(e) => write!(f, "{}: {}", e.msg, e.source),
        }
    }
}

#[derive(Error, Debug)]
pub enum RPCError {
    #[error("RPC setup error: {0}")]
    SetupError(String),
    #[error("Request error: {0}")]
    RequestError(RequestError),
}

impl RPCError {
    pub(crate) fn from_alloy<S: ToString>(msg: S, error: AlloyError) -> Self {
        RPCError::RequestError(RequestError::Reqwest(ReqwestError {
            msg: msg.to_string(),
            source: error,
        }))
    }
}

/// Extension trait for wrapping Alloy RPC errors into [`RPCError`] with a context message.
pub(crate) trait RpcResultExt<T> {
    fn rpc_context<C: Display>(self, context: C) -> Result<T, RPCError>;

    fn with_rpc_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T, RPCError>;
}

impl<T> RpcResultExt<T> for Result<T, AlloyError> {
    fn rpc_context<C: Display>(self, context: C) -> Result<T, RPCError> {
        self.map_err(|e| RPCError::from_alloy(context.to_string(), e))
    }

    fn with_rpc_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T, RPCError> {
        self.map_err(|e| RPCError::from_alloy(f().to_string(), e))
    }
}

/// Classifies a raw JSON-RPC failure.
///
/// Error responses from the node (reverts, rejected transactions) are `Reverted`; transport
/// failures and empty responses are `Network`; everything else is a decoding problem.
pub(crate) fn classify(context: &str, error: &AlloyError) -> ProtocolError {
    match error {
        AlloyRpcError::ErrorResp(payload) => {
            ProtocolError::Reverted(format!("{context}: {}", payload.message))
        }
        AlloyRpcError::Transport(_) | AlloyRpcError::NullResp => {
            ProtocolError::Network(format!("{context}: {error}"))
        }
        other => ProtocolError::Decode(format!("{context}: {other}")),
    }
}

impl From<RPCError> for ProtocolError {
    fn from(error: RPCError) -> Self {
        match error {
            RPCError::SetupError(msg) => ProtocolError::Network(msg),
            RPCError::RequestError(RequestError::Reqwest(e)) => classify(&e.msg, &e.source),
        }
    }
}
