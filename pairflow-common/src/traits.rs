//! Typed interfaces of the external protocol contracts.
//!
//! Workflows depend only on these traits. Every write method waits for the transaction receipt
//! and returns the hash of the confirmed transaction; a mined-but-failed transaction surfaces as
//! [`ProtocolError::TransactionFailed`]. Implementations never retry writes.

use async_trait::async_trait;

use crate::{
    errors::ProtocolError,
    models::{Deadline, LiquidityRecord, Reserves},
    Address, TxHash, U256,
};

/// Arguments of the router's `addLiquidity` entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLiquidityParams {
    pub token_a: Address,
    pub token_b: Address,
    pub amount_a_desired: U256,
    pub amount_b_desired: U256,
    pub amount_a_min: U256,
    pub amount_b_min: U256,
    pub to: Address,
    pub deadline: Deadline,
}

/// Arguments of the router's `swapExactTokensForTokens` entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapParams {
    pub amount_in: U256,
    pub amount_out_min: U256,
    pub path: Vec<Address>,
    pub to: Address,
    pub deadline: Deadline,
    /// Explicit nonce, taken from the account's transaction count right before submission.
    pub nonce: u64,
}

/// Network-level reads and connection management.
#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn chain_id(&self) -> Result<u64, ProtocolError>;

    /// Current gas price in wei.
    async fn gas_price(&self) -> Result<u128, ProtocolError>;

    async fn native_balance(&self, account: Address) -> Result<U256, ProtocolError>;

    /// Number of transactions sent from `account`, i.e. its next nonce.
    async fn transaction_count(&self, account: Address) -> Result<u64, ProtocolError>;

    /// Drops the current connection and establishes a new one with the same signer.
    async fn reconnect(&self) -> Result<(), ProtocolError>;
}

#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait Erc20Client: Send + Sync {
    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, ProtocolError>;

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ProtocolError>;

    async fn decimals(&self, token: Address) -> Result<u8, ProtocolError>;

    async fn symbol(&self, token: Address) -> Result<String, ProtocolError>;

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, ProtocolError>;

    async fn transfer(
        &self,
        token: Address,
        to: Address,
        amount: U256,
    ) -> Result<TxHash, ProtocolError>;
}

/// The wrapped-native token's mint and burn entry points.
#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait WrappedNativeClient: Send + Sync {
    /// Mints `amount` wrapped tokens by sending the same amount of native currency.
    async fn deposit(&self, token: Address, amount: U256) -> Result<TxHash, ProtocolError>;

    async fn withdraw(&self, token: Address, amount: U256) -> Result<TxHash, ProtocolError>;
}

#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait FactoryClient: Send + Sync {
    /// Pool address for the unordered pair, [`Address::ZERO`] if it was never created.
    async fn get_pair(&self, token_a: Address, token_b: Address)
        -> Result<Address, ProtocolError>;

    async fn create_pair(
        &self,
        token_a: Address,
        token_b: Address,
    ) -> Result<TxHash, ProtocolError>;
}

#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait RouterClient: Send + Sync {
    /// Address used as spender for allowances.
    fn address(&self) -> Address;

    /// Expected amounts at every hop of `path`, the last being the final output.
    async fn get_amounts_out(
        &self,
        amount_in: U256,
        path: Vec<Address>,
    ) -> Result<Vec<U256>, ProtocolError>;

    async fn add_liquidity(&self, params: AddLiquidityParams) -> Result<TxHash, ProtocolError>;

    async fn swap_exact_tokens_for_tokens(
        &self,
        params: SwapParams,
    ) -> Result<TxHash, ProtocolError>;
}

#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait PairClient: Send + Sync {
    async fn get_reserves(&self, pair: Address) -> Result<Reserves, ProtocolError>;

    async fn token0(&self, pair: Address) -> Result<Address, ProtocolError>;

    async fn token1(&self, pair: Address) -> Result<Address, ProtocolError>;

    /// LP-token balance of `owner`.
    async fn balance_of(&self, pair: Address, owner: Address) -> Result<U256, ProtocolError>;

    async fn decimals(&self, pair: Address) -> Result<u8, ProtocolError>;
}

/// The external contract recording each account's liquidity contributions.
#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Appends a record for the signing account.
    async fn add_blockchain(
        &self,
        pair_address: Address,
        liquidity_amount: U256,
    ) -> Result<TxHash, ProtocolError>;

    async fn get_transactions(
        &self,
        account: Address,
    ) -> Result<Vec<LiquidityRecord>, ProtocolError>;
}
