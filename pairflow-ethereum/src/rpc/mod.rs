use std::time::Duration;

use alloy::{
    primitives::{Address, U256, U64},
    rpc::{
        client::{ClientBuilder, ReqwestClient},
        types::BlockNumberOrTag,
    },
    transports::http::reqwest,
};
use tracing::instrument;

pub mod config;
pub mod errors;
mod retry;

use crate::rpc::{
    config::RPCRetryConfig,
    errors::{RPCError, RpcResultExt},
    retry::RetryPolicy,
};

/// This struct wraps the ReqwestClient and provides the chain reads the workflows need, with
/// retry on transient transport failures.
/// It is cheap to clone, as the `inner` internally uses an Arc for the ReqwestClient.
#[derive(Clone, Debug)]
pub struct EthereumRpcClient {
    inner: ReqwestClient,
    retry_policy: RetryPolicy,
}

impl EthereumRpcClient {
    /// Creates a new EthereumRpcClient with the given RPC URL and the default retry config
    /// (max retries 3, initial backoff 100ms, max backoff 5000ms).
    pub fn new(rpc_url: &str) -> Result<Self, RPCError> {
        let url = rpc_url
            .parse()
            .map_err(|e| RPCError::SetupError(format!("Invalid RPC URL: {e}")))?;

        let http_client = reqwest::ClientBuilder::new()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| RPCError::SetupError(format!("Failed to create HTTP client: {e}")))?;

        let rpc = ClientBuilder::default().http_with_client(http_client, url);

        Ok(Self {
            inner: rpc,
            retry_policy: RPCRetryConfig::default().into(),
        })
    }

    pub fn with_retry(mut self, retry_config: RPCRetryConfig) -> Self {
        self.retry_policy = retry_config.into();
        self
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn get_chain_id(&self) -> Result<u64, RPCError> {
        let chain_id: U64 = self
            .retry_policy
            .retry_request(|| async {
                self.inner
                    .request_noparams("eth_chainId")
                    .await
            })
            .await
            .rpc_context("Failed to get chain id")?;

        Ok(chain_id.to::<u64>())
    }

    /// Gets the gas price from the node using eth_gasPrice RPC method.
    ///
    /// Returns the gas price in wei as a u128.
    #[instrument(level = "debug", skip(self))]
    pub async fn get_gas_price(&self) -> Result<u128, RPCError> {
        let gas_price: U256 = self
            .retry_policy
            .retry_request(|| async {
                self.inner
                    .request_noparams("eth_gasPrice")
                    .await
            })
            .await
            .rpc_context("Failed to get gas price")?;

        Ok(gas_price.saturating_to::<u128>())
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn get_balance(&self, address: Address) -> Result<U256, RPCError> {
        self.retry_policy
            .retry_request(|| async {
                self.inner
                    .request("eth_getBalance", (address, BlockNumberOrTag::Latest))
                    .await
            })
            .await
            .with_rpc_context(|| format!("Failed to get balance for address {address}"))
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn get_transaction_count(&self, address: Address) -> Result<u64, RPCError> {
        let count: U64 = self
            .retry_policy
            .retry_request(|| async {
                self.inner
                    .request("eth_getTransactionCount", (address, BlockNumberOrTag::Latest))
                    .await
            })
            .await
            .with_rpc_context(|| format!("Failed to get transaction count for {address}"))?;

        Ok(count.to::<u64>())
    }
}
