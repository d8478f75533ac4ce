#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

pub mod abi;
pub mod client;
pub mod errors;
pub mod gas;
pub mod rpc;

pub use client::{EthereumClient, ProtocolAddresses};
pub use gas::GasLimits;
pub use rpc::{
    config::RPCRetryConfig,
    errors::{RPCError, RequestError},
    EthereumRpcClient,
};
