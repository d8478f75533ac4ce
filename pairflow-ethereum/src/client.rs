//! Signer-bound binding of every external contract the workflows call.

use std::fmt;

use alloy::{
    network::{Ethereum, EthereumWallet, ReceiptResponse},
    primitives::{address, Address, U256},
    providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use pairflow_common::{
    errors::ProtocolError,
    models::{LiquidityRecord, Reserves},
    traits::{
        AddLiquidityParams, ChainReader, Erc20Client, FactoryClient, LedgerClient, PairClient,
        RouterClient, SwapParams, WrappedNativeClient,
    },
    TxHash,
};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};
use url::Url;

use crate::{
    abi::{
        decode_decimals, IUniswapV2Factory, IUniswapV2Pair, IUniswapV2Router02, IUserStorageData,
        IERC20, IWETH9,
    },
    errors::{contract_error, pending_error},
    gas::GasLimits,
    rpc::{
        config::RPCRetryConfig,
        errors::RPCError,
        EthereumRpcClient,
    },
};

pub const UNISWAP_V2_ROUTER: Address = address!("7a250d5630B4cF539739dF2C5dAcb4c659F2488D");
pub const UNISWAP_V2_FACTORY: Address = address!("5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f");

/// Deployed contracts the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolAddresses {
    pub router: Address,
    pub factory: Address,
    pub wrapped_native: Address,
    /// The liquidity ledger contract.
    pub ledger: Address,
}

impl ProtocolAddresses {
    /// Uniswap V2 on Ethereum mainnet, with the given ledger deployment.
    pub fn mainnet(ledger: Address) -> Self {
        Self {
            router: UNISWAP_V2_ROUTER,
            factory: UNISWAP_V2_FACTORY,
            wrapped_native: pairflow_common::models::token::WETH_ADDRESS,
            ledger,
        }
    }
}

struct Connection {
    rpc: EthereumRpcClient,
    provider: DynProvider,
}

impl Connection {
    fn open(
        url: &str,
        signer: &PrivateKeySigner,
        retry: &RPCRetryConfig,
    ) -> Result<Self, RPCError> {
        let rpc = EthereumRpcClient::new(url)?.with_retry(retry.clone());
        let url: Url = url
            .parse()
            .map_err(|e| RPCError::SetupError(format!("Invalid RPC URL: {e}")))?;
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer.clone()))
            .connect_http(url)
            .erased();
        Ok(Self { rpc, provider })
    }
}

/// Client holding one signing account and a reconnectable connection to one node.
///
/// Every write attaches an explicit gas limit and waits for its receipt before returning.
pub struct EthereumClient {
    url: String,
    signer: PrivateKeySigner,
    addresses: ProtocolAddresses,
    gas: GasLimits,
    retry: RPCRetryConfig,
    connection: RwLock<Connection>,
}

impl fmt::Debug for EthereumClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EthereumClient")
            .field("url", &self.url)
            .field("account", &self.signer.address())
            .field("addresses", &self.addresses)
            .field("gas", &self.gas)
            .finish()
    }
}

impl EthereumClient {
    pub fn new(
        rpc_url: &str,
        private_key: &str,
        addresses: ProtocolAddresses,
        gas: GasLimits,
    ) -> Result<Self, RPCError> {
        let signer: PrivateKeySigner = private_key
            .trim()
            .parse()
            .map_err(|e| RPCError::SetupError(format!("Invalid private key: {e}")))?;
        let retry = RPCRetryConfig::default();
        let connection = Connection::open(rpc_url, &signer, &retry)?;
        Ok(Self {
            url: rpc_url.to_string(),
            signer,
            addresses,
            gas,
            retry,
            connection: RwLock::new(connection),
        })
    }

    /// Retry config for raw chain reads. Takes effect on the next (re)connect.
    pub fn with_retry(mut self, retry: RPCRetryConfig) -> Result<Self, RPCError> {
        let connection = Connection::open(&self.url, &self.signer, &retry)?;
        self.retry = retry;
        self.connection = RwLock::new(connection);
        Ok(self)
    }

    /// Address of the signing account.
    pub fn account(&self) -> Address {
        self.signer.address()
    }

    pub fn addresses(&self) -> &ProtocolAddresses {
        &self.addresses
    }

    async fn provider(&self) -> DynProvider {
        self.connection
            .read()
            .await
            .provider
            .clone()
    }

    async fn rpc(&self) -> EthereumRpcClient {
        self.connection
            .read()
            .await
            .rpc
            .clone()
    }
}

/// Waits for the receipt of a sent transaction and checks its status.
async fn confirm(
    context: &str,
    pending: PendingTransactionBuilder<Ethereum>,
) -> Result<TxHash, ProtocolError> {
    let hash = *pending.tx_hash();
    debug!(%hash, context, "Waiting for confirmation");
    let receipt = pending
        .get_receipt()
        .await
        .map_err(|e| pending_error(context, e))?;
    if !receipt.status() {
        return Err(ProtocolError::TransactionFailed { hash });
    }
    debug!(%hash, context, block = ?receipt.block_number(), "Transaction confirmed");
    Ok(hash)
}

#[async_trait]
impl ChainReader for EthereumClient {
    async fn chain_id(&self) -> Result<u64, ProtocolError> {
        Ok(self.rpc().await.get_chain_id().await?)
    }

    async fn gas_price(&self) -> Result<u128, ProtocolError> {
        Ok(self.rpc().await.get_gas_price().await?)
    }

    async fn native_balance(&self, account: Address) -> Result<U256, ProtocolError> {
        Ok(self
            .rpc()
            .await
            .get_balance(account)
            .await?)
    }

    async fn transaction_count(&self, account: Address) -> Result<u64, ProtocolError> {
        Ok(self
            .rpc()
            .await
            .get_transaction_count(account)
            .await?)
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn reconnect(&self) -> Result<(), ProtocolError> {
        let connection = Connection::open(&self.url, &self.signer, &self.retry)?;
        *self.connection.write().await = connection;
        info!("Reconnected to node");
        Ok(())
    }
}

#[async_trait]
impl Erc20Client for EthereumClient {
    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, ProtocolError> {
        IERC20::new(token, self.provider().await)
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| contract_error("balanceOf", e))
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ProtocolError> {
        IERC20::new(token, self.provider().await)
            .allowance(owner, spender)
            .call()
            .await
            .map_err(|e| contract_error("allowance", e))
    }

    async fn decimals(&self, token: Address) -> Result<u8, ProtocolError> {
        let data = IERC20::new(token, self.provider().await)
            .decimals()
            .call_raw()
            .await
            .map_err(|e| contract_error("decimals", e))?;
        decode_decimals(&data)
    }

    async fn symbol(&self, token: Address) -> Result<String, ProtocolError> {
        IERC20::new(token, self.provider().await)
            .symbol()
            .call()
            .await
            .map_err(|e| contract_error("symbol", e))
    }

    #[instrument(skip(self))]
    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, ProtocolError> {
        let contract = IERC20::new(token, self.provider().await);
        let pending = contract
            .approve(spender, amount)
            .gas(self.gas.approve)
            .send()
            .await
            .map_err(|e| contract_error("approve", e))?;
        confirm("approve", pending).await
    }

    #[instrument(skip(self))]
    async fn transfer(
        &self,
        token: Address,
        to: Address,
        amount: U256,
    ) -> Result<TxHash, ProtocolError> {
        let contract = IERC20::new(token, self.provider().await);
        let pending = contract
            .transfer(to, amount)
            .gas(self.gas.transfer)
            .send()
            .await
            .map_err(|e| contract_error("transfer", e))?;
        confirm("transfer", pending).await
    }
}

#[async_trait]
impl WrappedNativeClient for EthereumClient {
    #[instrument(skip(self))]
    async fn deposit(&self, token: Address, amount: U256) -> Result<TxHash, ProtocolError> {
        let contract = IWETH9::new(token, self.provider().await);
        let pending = contract
            .deposit()
            .value(amount)
            .gas(self.gas.wrap)
            .send()
            .await
            .map_err(|e| contract_error("deposit", e))?;
        confirm("deposit", pending).await
    }

    #[instrument(skip(self))]
    async fn withdraw(&self, token: Address, amount: U256) -> Result<TxHash, ProtocolError> {
        let contract = IWETH9::new(token, self.provider().await);
        let pending = contract
            .withdraw(amount)
            .gas(self.gas.wrap)
            .send()
            .await
            .map_err(|e| contract_error("withdraw", e))?;
        confirm("withdraw", pending).await
    }
}

#[async_trait]
impl FactoryClient for EthereumClient {
    async fn get_pair(&self, token_a: Address, token_b: Address) -> Result<Address, ProtocolError> {
        IUniswapV2Factory::new(self.addresses.factory, self.provider().await)
            .getPair(token_a, token_b)
            .call()
            .await
            .map_err(|e| contract_error("getPair", e))
    }

    #[instrument(skip(self))]
    async fn create_pair(
        &self,
        token_a: Address,
        token_b: Address,
    ) -> Result<TxHash, ProtocolError> {
        let contract = IUniswapV2Factory::new(self.addresses.factory, self.provider().await);
        let pending = contract
            .createPair(token_a, token_b)
            .gas(self.gas.create_pair)
            .send()
            .await
            .map_err(|e| contract_error("createPair", e))?;
        confirm("createPair", pending).await
    }
}

#[async_trait]
impl RouterClient for EthereumClient {
    fn address(&self) -> Address {
        self.addresses.router
    }

    async fn get_amounts_out(
        &self,
        amount_in: U256,
        path: Vec<Address>,
    ) -> Result<Vec<U256>, ProtocolError> {
        IUniswapV2Router02::new(self.addresses.router, self.provider().await)
            .getAmountsOut(amount_in, path)
            .call()
            .await
            .map_err(|e| contract_error("getAmountsOut", e))
    }

    #[instrument(skip_all, fields(token_a = %params.token_a, token_b = %params.token_b))]
    async fn add_liquidity(&self, params: AddLiquidityParams) -> Result<TxHash, ProtocolError> {
        let contract = IUniswapV2Router02::new(self.addresses.router, self.provider().await);
        let pending = contract
            .addLiquidity(
                params.token_a,
                params.token_b,
                params.amount_a_desired,
                params.amount_b_desired,
                params.amount_a_min,
                params.amount_b_min,
                params.to,
                params.deadline.as_u256(),
            )
            .gas(self.gas.add_liquidity)
            .send()
            .await
            .map_err(|e| contract_error("addLiquidity", e))?;
        confirm("addLiquidity", pending).await
    }

    #[instrument(skip_all, fields(nonce = params.nonce))]
    async fn swap_exact_tokens_for_tokens(
        &self,
        params: SwapParams,
    ) -> Result<TxHash, ProtocolError> {
        let contract = IUniswapV2Router02::new(self.addresses.router, self.provider().await);
        let pending = contract
            .swapExactTokensForTokens(
                params.amount_in,
                params.amount_out_min,
                params.path,
                params.to,
                params.deadline.as_u256(),
            )
            .gas(self.gas.swap)
            .nonce(params.nonce)
            .send()
            .await
            .map_err(|e| contract_error("swapExactTokensForTokens", e))?;
        confirm("swapExactTokensForTokens", pending).await
    }
}

#[async_trait]
impl PairClient for EthereumClient {
    async fn get_reserves(&self, pair: Address) -> Result<Reserves, ProtocolError> {
        IUniswapV2Pair::new(pair, self.provider().await)
            .getReserves()
            .call()
            .await
            .map(Reserves::from)
            .map_err(|e| contract_error("getReserves", e))
    }

    async fn token0(&self, pair: Address) -> Result<Address, ProtocolError> {
        IUniswapV2Pair::new(pair, self.provider().await)
            .token0()
            .call()
            .await
            .map_err(|e| contract_error("token0", e))
    }

    async fn token1(&self, pair: Address) -> Result<Address, ProtocolError> {
        IUniswapV2Pair::new(pair, self.provider().await)
            .token1()
            .call()
            .await
            .map_err(|e| contract_error("token1", e))
    }

    async fn balance_of(&self, pair: Address, owner: Address) -> Result<U256, ProtocolError> {
        IUniswapV2Pair::new(pair, self.provider().await)
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| contract_error("balanceOf", e))
    }

    async fn decimals(&self, pair: Address) -> Result<u8, ProtocolError> {
        let data = IUniswapV2Pair::new(pair, self.provider().await)
            .decimals()
            .call_raw()
            .await
            .map_err(|e| contract_error("decimals", e))?;
        decode_decimals(&data)
    }
}

#[async_trait]
impl LedgerClient for EthereumClient {
    #[instrument(skip(self))]
    async fn add_blockchain(
        &self,
        pair_address: Address,
        liquidity_amount: U256,
    ) -> Result<TxHash, ProtocolError> {
        let contract = IUserStorageData::new(self.addresses.ledger, self.provider().await);
        let pending = contract
            .addBlockchain(pair_address, liquidity_amount)
            .gas(self.gas.ledger_record)
            .send()
            .await
            .map_err(|e| contract_error("addBlockchain", e))?;
        confirm("addBlockchain", pending).await
    }

    async fn get_transactions(
        &self,
        account: Address,
    ) -> Result<Vec<LiquidityRecord>, ProtocolError> {
        let records = IUserStorageData::new(self.addresses.ledger, self.provider().await)
            .getTransactions(account)
            .call()
            .await
            .map_err(|e| contract_error("getTransactions", e))?;
        Ok(records
            .into_iter()
            .map(LiquidityRecord::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use mockito::{Matcher, Server, ServerGuard};
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    // Well-known development key, never holds funds.
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ACCOUNT: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

    fn client(server: &ServerGuard) -> EthereumClient {
        EthereumClient::new(
            &server.url(),
            DEV_KEY,
            ProtocolAddresses::mainnet(Address::repeat_byte(0x5e)),
            GasLimits::default(),
        )
        .expect("Failed to create client")
        .with_retry(RPCRetryConfig::disabled())
        .expect("Failed to apply retry config")
    }

    fn word(value: u64) -> String {
        format!("0x{value:064x}")
    }

    #[tokio::test]
    async fn test_account_is_derived_from_key() {
        let server = Server::new_async().await;
        let client = client(&server);
        assert_eq!(client.account(), DEV_ACCOUNT);
        assert_eq!(client.address(), UNISWAP_V2_ROUTER);
    }

    #[test]
    fn test_invalid_private_key_is_a_setup_error() {
        let res = EthereumClient::new(
            "http://localhost:8545",
            "not-a-key",
            ProtocolAddresses::mainnet(Address::ZERO),
            GasLimits::default(),
        );
        assert!(matches!(res, Err(RPCError::SetupError(_))));
    }

    #[tokio::test]
    async fn test_balance_of_decodes_call_result() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({ "method": "eth_call" })))
            .with_status(200)
            .with_body(json!({ "jsonrpc": "2.0", "id": 0, "result": word(500_000_000) }).to_string())
            .expect(1)
            .create_async()
            .await;

        let client = client(&server);
        let usdt = pairflow_common::models::token::USDT_ADDRESS;

        let balance = Erc20Client::balance_of(&client, usdt, DEV_ACCOUNT)
            .await
            .unwrap();

        assert_eq!(balance, U256::from(500_000_000u64));
        m.assert();
    }

    #[rstest]
    #[case::in_range(18, Ok(18))]
    #[case::truncated_word(1024, Err(()))]
    #[tokio::test]
    async fn test_decimals_rejects_values_above_uint8(
        #[case] returned: u64,
        #[case] expected: Result<u8, ()>,
    ) {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({ "method": "eth_call" })))
            .with_status(200)
            .with_body(json!({ "jsonrpc": "2.0", "id": 0, "result": word(returned) }).to_string())
            .create_async()
            .await;

        let client = client(&server);
        let token = Address::repeat_byte(0x42);

        let erc20 = Erc20Client::decimals(&client, token).await;
        let lp = PairClient::decimals(&client, token).await;

        for res in [erc20, lp] {
            match expected {
                Ok(decimals) => assert_eq!(res, Ok(decimals)),
                Err(()) => assert!(matches!(res, Err(ProtocolError::Decode(_))), "got {res:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_reverted_call_is_reported_as_revert() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({ "method": "eth_call" })))
            .with_status(200)
            .with_body(
                json!({
                    "jsonrpc": "2.0",
                    "id": 0,
                    "error": { "code": 3, "message": "execution reverted: UniswapV2Library: INSUFFICIENT_LIQUIDITY" }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = client(&server);
        let path = vec![Address::repeat_byte(1), Address::repeat_byte(2)];

        let err = client
            .get_amounts_out(U256::from(1u64), path)
            .await
            .unwrap_err();

        assert!(matches!(err, ProtocolError::Reverted(msg) if msg.contains("INSUFFICIENT_LIQUIDITY")));
    }

    #[tokio::test]
    async fn test_unreachable_node_is_a_network_error() {
        let client = EthereumClient::new(
            "http://127.0.0.1:1",
            DEV_KEY,
            ProtocolAddresses::mainnet(Address::ZERO),
            GasLimits::default(),
        )
        .unwrap()
        .with_retry(RPCRetryConfig::disabled())
        .unwrap();

        let err = client.chain_id().await.unwrap_err();
        assert!(err.is_network(), "unexpected error {err:?}");
    }

    #[tokio::test]
    async fn test_reconnect_keeps_signer() {
        let server = Server::new_async().await;
        let client = client(&server);

        client.reconnect().await.unwrap();

        assert_eq!(client.account(), DEV_ACCOUNT);
    }
}
