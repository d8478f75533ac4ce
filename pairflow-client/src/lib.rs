//! Orchestration of liquidity provision and swaps over Uniswap V2 style pools.
//!
//! Workflows are composed from the leaf steps in [`steps`] and run through
//! [`workflow::Exchange`], which serializes them per account.

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

pub mod cli;
pub mod config;
pub mod session;
pub mod steps;
#[cfg(test)]
mod testing;
pub mod workflow;
