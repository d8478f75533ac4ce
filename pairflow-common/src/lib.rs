#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

pub mod amount;
pub mod errors;
pub mod models;
pub mod routing;
pub mod traits;

pub use alloy_primitives::{Address, B256, U256};

/// Hash of a confirmed transaction.
pub type TxHash = B256;
