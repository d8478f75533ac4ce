//! Leaf steps the workflows are composed of. Each step re-reads on-chain state right before it
//! is used; nothing is cached across steps.

pub mod allowance;
pub mod balance;
pub mod ledger;
pub mod network;
pub mod pair;
pub mod quote;
