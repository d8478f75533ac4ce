use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use pairflow_common::{
    amount::{format_amount, resolve_amount},
    models::{Slippage, Token, TokenRegistry},
    Address,
};
use pairflow_ethereum::{gas::gwei_to_wei, EthereumClient, GasLimits, ProtocolAddresses};
use serde::Serialize;
use tracing::info;
use tracing_appender::rolling;

use crate::{
    config::{Commission, WorkflowConfig},
    session::{Contracts, Session},
    workflow::{Exchange, LiquidityRequest, SwapRequest},
};

/// Pairflow CLI - swap tokens and provide liquidity on Uniswap V2 style pools
///
/// Liquidity additions are recorded in an external ledger contract, which the `positions` and
/// `history` commands read back.
#[derive(Parser, Debug, Clone, PartialEq)]
#[clap(version = env!("CARGO_PKG_VERSION"))]
struct CliArgs {
    /// JSON-RPC endpoint of the node.
    #[clap(long, env = "RPC_URL")]
    rpc_url: String,

    /// Hex private key of the signing account.
    #[clap(long, env = "PRIVATE_KEY", hide_env_values = true)]
    private_key: String,

    /// Address of the liquidity ledger contract.
    #[clap(long, env = "STORAGE_ADDRESS")]
    storage_address: Address,

    /// Receiver of the swap commission. Must be set together with the commission rate.
    #[clap(long, env = "COMMISSION_ADDRESS")]
    commission_address: Option<Address>,

    /// Commission charged on swaps paid in the wrapped-native token, as a decimal amount of that
    /// token. Example: 0.001
    #[clap(long, env = "COMMISSION_RATE")]
    commission_rate: Option<String>,

    /// Overrides the Uniswap V2 mainnet router.
    #[clap(long, env = "ROUTER_ADDRESS")]
    router_address: Option<Address>,

    /// Overrides the Uniswap V2 mainnet factory.
    #[clap(long, env = "FACTORY_ADDRESS")]
    factory_address: Option<Address>,

    /// Overrides the wrapped-native token (WETH on mainnet).
    #[clap(long, env = "WETH_ADDRESS")]
    weth_address: Option<Address>,

    /// Swaps are refused while the gas price is above this many gwei.
    #[clap(long, env = "MAX_GAS_PRICE_GWEI", default_value = "100")]
    max_gas_price_gwei: u64,

    /// Swap slippage tolerance in basis points.
    #[clap(long, default_value = "50")]
    slippage_bps: u16,

    /// Slippage tolerance for liquidity additions in basis points. Without it the minimum
    /// amounts are zero.
    #[clap(long)]
    liquidity_slippage_bps: Option<u16>,

    /// Logging folder path.
    #[clap(long, default_value = "logs")]
    log_folder: String,

    /// Print results as JSON.
    #[clap(long)]
    json: bool,

    /// Enable verbose logging.
    #[clap(long)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Command {
    /// Swap an exact amount of one token into another.
    Swap { token_in: String, token_out: String, amount: String },
    /// Add liquidity to a pool, creating it if needed, and record the minted LP tokens.
    AddLiquidity { token_a: String, token_b: String, amount_a: String, amount_b: String },
    /// Ledger positions summed per pool.
    Positions {
        /// Defaults to the signing account.
        #[clap(long)]
        account: Option<Address>,
    },
    /// Raw ledger records.
    History {
        #[clap(long)]
        account: Option<Address>,
    },
    /// Expected output of a swap, without trading.
    Quote { token_in: String, token_out: String, amount: String },
    /// Pool address and reserves of a pair.
    Pool { token_a: String, token_b: String },
    /// Unit price of every listed token.
    Prices {
        #[clap(default_value = "USDT")]
        quote: String,
    },
}

impl CliArgs {
    fn registry(&self) -> TokenRegistry {
        match self.weth_address {
            Some(address) => TokenRegistry::mainnet().with_wrapped_native(address),
            None => TokenRegistry::mainnet(),
        }
    }

    fn commission(&self, wrapped_native: &Token) -> anyhow::Result<Option<Commission>> {
        match (self.commission_address, &self.commission_rate) {
            (Some(collector), Some(rate)) => Ok(Some(Commission {
                collector,
                amount: resolve_amount(wrapped_native, rate)?,
            })),
            (None, None) => Ok(None),
            _ => bail!("COMMISSION_ADDRESS and COMMISSION_RATE must be set together"),
        }
    }

    fn workflow_config(&self, wrapped_native: Token) -> anyhow::Result<WorkflowConfig> {
        let commission = self.commission(&wrapped_native)?;
        Ok(WorkflowConfig {
            max_gas_price_wei: gwei_to_wei(self.max_gas_price_gwei),
            swap_slippage: Slippage::from_bps(self.slippage_bps),
            liquidity_slippage: self
                .liquidity_slippage_bps
                .map(Slippage::from_bps),
            ..Default::default()
        }
        .with_wrapped_native(wrapped_native)
        .with_commission(commission))
    }

    fn addresses(&self, wrapped_native: Address) -> ProtocolAddresses {
        let mainnet = ProtocolAddresses::mainnet(self.storage_address);
        ProtocolAddresses {
            router: self.router_address.unwrap_or(mainnet.router),
            factory: self
                .factory_address
                .unwrap_or(mainnet.factory),
            wrapped_native,
            ledger: self.storage_address,
        }
    }
}

fn lookup(registry: &TokenRegistry, symbol_or_address: &str) -> anyhow::Result<Token> {
    let token = match symbol_or_address.parse::<Address>() {
        Ok(address) => registry.by_address(&address),
        Err(_) => registry.by_symbol(symbol_or_address),
    };
    token
        .cloned()
        .with_context(|| format!("Unknown token: {symbol_or_address}"))
}

fn print<T: Serialize>(json: bool, value: &T, human: impl FnOnce() -> String) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", human());
    }
    Ok(())
}

pub async fn run_cli() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = CliArgs::parse();

    // Setup Logging
    let log_level = if args.verbose { "debug" } else { "info" };
    let (non_blocking, _guard) =
        tracing_appender::non_blocking(rolling::never(&args.log_folder, "pairflow.log"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(non_blocking)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set up logging subscriber")?;

    let registry = args.registry();
    let wrapped_native = registry
        .wrapped_native()
        .cloned()
        .context("Token registry lists no wrapped-native token")?;
    let config = args.workflow_config(wrapped_native.clone())?;
    let client = Arc::new(
        EthereumClient::new(
            &args.rpc_url,
            &args.private_key,
            args.addresses(wrapped_native.address),
            GasLimits::default(),
        )
        .context("Failed to set up the Ethereum client")?,
    );
    let session = Session::new(client.account(), Contracts::from_client(client));
    info!(account = %session.account, "Session ready");

    let exchange = Exchange::new(config, registry);
    run(&exchange, &session, args).await
}

async fn run(exchange: &Exchange, session: &Session, args: CliArgs) -> anyhow::Result<()> {
    let registry = exchange.registry();
    let json = args.json;
    match args.command {
        Command::Swap { token_in, token_out, amount } => {
            let token_in = lookup(registry, &token_in)?;
            let token_out = lookup(registry, &token_out)?;
            let outcome = exchange
                .swap(
                    session,
                    SwapRequest {
                        token_in: token_in.clone(),
                        token_out: token_out.clone(),
                        amount_in: amount,
                    },
                )
                .await?;
            print(json, &outcome, || {
                let mut out = format!(
                    "Swapped {} {} for at least {} {} (tx {})",
                    format_amount(&token_in, outcome.amount_in),
                    token_in.symbol,
                    format_amount(&token_out, outcome.min_out),
                    token_out.symbol,
                    outcome.tx,
                );
                if let Some(balances) = &outcome.balances {
                    out.push_str(&format!(
                        "\nBalances: {} {}, {} {}",
                        balances.token_in, token_in.symbol, balances.token_out, token_out.symbol
                    ));
                }
                out
            })
        }
        Command::AddLiquidity { token_a, token_b, amount_a, amount_b } => {
            let request = LiquidityRequest {
                token_a: lookup(registry, &token_a)?,
                token_b: lookup(registry, &token_b)?,
                amount_a,
                amount_b,
            };
            let outcome = exchange
                .add_liquidity(session, request)
                .await?;
            print(json, &outcome, || {
                format!(
                    "Added liquidity to {}{}: minted {} LP (tx {}, ledger tx {})",
                    outcome.pool,
                    if outcome.pool_created { " (new pool)" } else { "" },
                    outcome.liquidity,
                    outcome.add_tx,
                    outcome.record_tx,
                )
            })
        }
        Command::Positions { account } => {
            let account = account.unwrap_or(session.account);
            let positions = exchange
                .positions(session, account)
                .await?;
            print(json, &positions, || {
                if positions.is_empty() {
                    return format!("No positions for {account}");
                }
                positions
                    .iter()
                    .map(|p| {
                        format!(
                            "{}/{} {}: {} LP over {} records",
                            p.token0.symbol, p.token1.symbol, p.pair_address, p.liquidity, p.records
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        Command::History { account } => {
            let account = account.unwrap_or(session.account);
            let records = exchange
                .history(session, account)
                .await?;
            print(json, &records, || {
                records
                    .iter()
                    .map(|r| format!("{} {}", r.pair_address, r.liquidity_amount))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        Command::Quote { token_in, token_out, amount } => {
            let token_in = lookup(registry, &token_in)?;
            let token_out = lookup(registry, &token_out)?;
            let quote = exchange
                .quote(session, &token_in, &token_out, &amount)
                .await?;
            print(json, &quote, || {
                format!(
                    "{} {} -> {} {} ({} hops)",
                    format_amount(&token_in, quote.amount_in),
                    token_in.symbol,
                    format_amount(&token_out, quote.amount_out),
                    token_out.symbol,
                    quote.path.len().saturating_sub(1),
                )
            })
        }
        Command::Pool { token_a, token_b } => {
            let token_a = lookup(registry, &token_a)?;
            let token_b = lookup(registry, &token_b)?;
            let pool = exchange
                .pool(session, &token_a, &token_b)
                .await?;
            print(json, &pool, || {
                let reserve = |token: &Token| {
                    pool.reserve_of(&token.address)
                        .map(|r| format_amount(token, r))
                        .unwrap_or_default()
                };
                format!(
                    "Pool {}: {} {} / {} {}",
                    pool.address,
                    reserve(&token_a),
                    token_a.symbol,
                    reserve(&token_b),
                    token_b.symbol,
                )
            })
        }
        Command::Prices { quote } => {
            let quote_token = lookup(registry, &quote)?;
            let prices = exchange
                .prices(session, &quote_token)
                .await;
            print(json, &prices, || {
                prices
                    .iter()
                    .map(|p| {
                        format!(
                            "{}: {}",
                            p.symbol,
                            p.price
                                .as_deref()
                                .unwrap_or("no route")
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
    }
}
