//! In-memory stand-in for the protocol contracts, used by workflow tests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use pairflow_common::{
    errors::ProtocolError,
    models::{LiquidityRecord, Reserves, Token},
    traits::{
        AddLiquidityParams, ChainReader, Erc20Client, FactoryClient, LedgerClient, PairClient,
        RouterClient, SwapParams, WrappedNativeClient,
    },
    Address, TxHash, U256,
};

use crate::{
    config::WorkflowConfig,
    session::{Contracts, Session},
};

pub const ACCOUNT: Address = Address::repeat_byte(0xac);
pub const ROUTER: Address = Address::repeat_byte(0x70);
pub const USDT: Address = Address::repeat_byte(0xda);
pub const DAI: Address = Address::repeat_byte(0xd1);

pub fn usdt() -> Token {
    Token::new(USDT, "USDT", "Tether USD", 6)
}

pub fn dai() -> Token {
    Token::new(DAI, "DAI", "Dai Stablecoin", 18)
}

pub fn weth() -> Token {
    WorkflowConfig::default().wrapped_native
}

pub fn ether(amount: u64) -> U256 {
    U256::from(amount) * U256::from(1_000_000_000_000_000_000u128)
}

/// A write observed by the fake, in submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Approve { token: Address, spender: Address, amount: U256 },
    Transfer { token: Address, to: Address, amount: U256 },
    Deposit { token: Address, amount: U256 },
    Withdraw { token: Address, amount: U256 },
    CreatePair { token_a: Address, token_b: Address },
    AddLiquidity(AddLiquidityParams),
    Swap(SwapParams),
    Record { pair: Address, amount: U256 },
    Reconnect,
}

#[derive(Default)]
struct State {
    gas_price: u128,
    native: HashMap<Address, U256>,
    balances: HashMap<(Address, Address), U256>,
    allowances: HashMap<(Address, Address, Address), U256>,
    pairs: HashMap<(Address, Address), Address>,
    lp_balances: HashMap<(Address, Address), U256>,
    reserves: HashMap<Address, Reserves>,
    symbols: HashMap<Address, String>,
    ledger: Vec<(Address, LiquidityRecord)>,
    nonce: u64,
    lp_per_add: U256,
    /// Output per hop is `amount * rate.0 / rate.1`.
    quote_rate: (u64, u64),
    failing_quotes: usize,
    failing_network: usize,
    calls: Vec<Call>,
}

/// Protocol fake with one signing account. Writes apply immediately and are logged in `calls`.
pub struct FakeProtocol {
    account: Address,
    state: Mutex<State>,
}

fn sorted(a: Address, b: Address) -> (Address, Address) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

impl FakeProtocol {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            account: ACCOUNT,
            state: Mutex::new(State {
                gas_price: 20_000_000_000,
                lp_per_add: U256::from(1_000u64),
                quote_rate: (1, 1),
                ..Default::default()
            }),
        })
    }

    pub fn session(self: &Arc<Self>) -> Session {
        Session::new(self.account, Contracts::from_client(self.clone()))
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        f(&mut self.state.lock().unwrap())
    }

    fn next_hash(state: &State) -> TxHash {
        TxHash::with_last_byte(state.calls.len() as u8)
    }

    pub fn set_gas_price(&self, wei: u128) {
        self.with_state(|s| s.gas_price = wei);
    }

    pub fn set_native(&self, amount: U256) {
        self.with_state(|s| s.native.insert(self.account, amount));
    }

    pub fn set_balance(&self, token: Address, amount: U256) {
        self.with_state(|s| s.balances.insert((token, self.account), amount));
    }

    pub fn set_allowance(&self, token: Address, amount: U256) {
        self.with_state(|s| {
            s.allowances
                .insert((token, self.account, ROUTER), amount)
        });
    }

    pub fn set_lp_balance(&self, pair: Address, amount: U256) {
        self.with_state(|s| s.lp_balances.insert((pair, self.account), amount));
    }

    pub fn set_lp_per_add(&self, amount: U256) {
        self.with_state(|s| s.lp_per_add = amount);
    }

    pub fn set_quote_rate(&self, numerator: u64, denominator: u64) {
        self.with_state(|s| s.quote_rate = (numerator, denominator));
    }

    pub fn set_symbol(&self, token: Address, symbol: &str) {
        self.with_state(|s| s.symbols.insert(token, symbol.to_string()));
    }

    pub fn set_nonce(&self, nonce: u64) {
        self.with_state(|s| s.nonce = nonce);
    }

    /// The next `n` quotes fail.
    pub fn fail_quotes(&self, n: usize) {
        self.with_state(|s| s.failing_quotes = n);
    }

    /// The next `n` chain id reads fail with a network error.
    pub fn fail_network(&self, n: usize) {
        self.with_state(|s| s.failing_network = n);
    }

    pub fn add_pool(&self, token_a: Address, token_b: Address) -> Address {
        self.with_state(|s| Self::insert_pool(s, token_a, token_b))
    }

    pub fn add_ledger_record(&self, account: Address, pair: Address, amount: U256) {
        self.with_state(|s| {
            s.ledger
                .push((account, LiquidityRecord::new(pair, amount)))
        });
    }

    pub fn set_reserves(&self, pair: Address, reserve0: u64, reserve1: u64) {
        self.with_state(|s| {
            s.reserves.insert(
                pair,
                Reserves {
                    reserve0: U256::from(reserve0),
                    reserve1: U256::from(reserve1),
                    block_timestamp_last: 0,
                },
            )
        });
    }

    fn insert_pool(state: &mut State, token_a: Address, token_b: Address) -> Address {
        let key = sorted(token_a, token_b);
        let next = Address::with_last_byte(0xa0 + state.pairs.len() as u8);
        *state.pairs.entry(key).or_insert(next)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.with_state(|s| s.calls.clone())
    }

    pub fn balance(&self, token: Address) -> U256 {
        self.with_state(|s| {
            s.balances
                .get(&(token, self.account))
                .copied()
                .unwrap_or_default()
        })
    }

    pub fn native(&self) -> U256 {
        self.with_state(|s| {
            s.native
                .get(&self.account)
                .copied()
                .unwrap_or_default()
        })
    }

    pub fn lp_balance(&self, pair: Address) -> U256 {
        self.with_state(|s| {
            s.lp_balances
                .get(&(pair, self.account))
                .copied()
                .unwrap_or_default()
        })
    }

    pub fn ledger(&self) -> Vec<LiquidityRecord> {
        self.with_state(|s| {
            s.ledger
                .iter()
                .map(|(_, record)| record.clone())
                .collect()
        })
    }

    fn debit(
        state: &mut State,
        token: Address,
        owner: Address,
        amount: U256,
    ) -> Result<(), ProtocolError> {
        let hash = Self::next_hash(state);
        let balance = state
            .balances
            .entry((token, owner))
            .or_default();
        if *balance < amount {
            return Err(ProtocolError::TransactionFailed { hash });
        }
        *balance -= amount;
        Ok(())
    }

    fn spend_allowance(
        state: &mut State,
        token: Address,
        owner: Address,
        amount: U256,
    ) -> Result<(), ProtocolError> {
        let hash = Self::next_hash(state);
        let allowance = state
            .allowances
            .entry((token, owner, ROUTER))
            .or_default();
        if *allowance < amount {
            return Err(ProtocolError::TransactionFailed { hash });
        }
        if *allowance != U256::MAX {
            *allowance -= amount;
        }
        Ok(())
    }

    fn quote(state: &State, amount_in: U256, path: &[Address]) -> Result<Vec<U256>, ProtocolError> {
        let mut amounts = vec![amount_in];
        let mut amount = amount_in;
        for hop in path.windows(2) {
            if !state
                .pairs
                .contains_key(&sorted(hop[0], hop[1]))
            {
                return Err(ProtocolError::Reverted(
                    "UniswapV2Library: INSUFFICIENT_LIQUIDITY".to_string(),
                ));
            }
            amount = amount * U256::from(state.quote_rate.0) / U256::from(state.quote_rate.1);
            amounts.push(amount);
        }
        Ok(amounts)
    }
}

#[async_trait]
impl ChainReader for FakeProtocol {
    async fn chain_id(&self) -> Result<u64, ProtocolError> {
        self.with_state(|s| {
            if s.failing_network > 0 {
                s.failing_network -= 1;
                return Err(ProtocolError::Network("connection refused".to_string()));
            }
            Ok(1)
        })
    }

    async fn gas_price(&self) -> Result<u128, ProtocolError> {
        Ok(self.with_state(|s| s.gas_price))
    }

    async fn native_balance(&self, account: Address) -> Result<U256, ProtocolError> {
        Ok(self.with_state(|s| {
            s.native
                .get(&account)
                .copied()
                .unwrap_or_default()
        }))
    }

    async fn transaction_count(&self, _account: Address) -> Result<u64, ProtocolError> {
        Ok(self.with_state(|s| s.nonce))
    }

    async fn reconnect(&self) -> Result<(), ProtocolError> {
        self.with_state(|s| s.calls.push(Call::Reconnect));
        Ok(())
    }
}

#[async_trait]
impl Erc20Client for FakeProtocol {
    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, ProtocolError> {
        Ok(self.with_state(|s| {
            s.balances
                .get(&(token, owner))
                .copied()
                .unwrap_or_default()
        }))
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ProtocolError> {
        Ok(self.with_state(|s| {
            s.allowances
                .get(&(token, owner, spender))
                .copied()
                .unwrap_or_default()
        }))
    }

    async fn decimals(&self, _token: Address) -> Result<u8, ProtocolError> {
        Ok(18)
    }

    async fn symbol(&self, token: Address) -> Result<String, ProtocolError> {
        self.with_state(|s| {
            s.symbols
                .get(&token)
                .cloned()
                .ok_or_else(|| ProtocolError::Reverted("execution reverted".to_string()))
        })
    }

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, ProtocolError> {
        self.with_state(|s| {
            s.allowances
                .insert((token, self.account, spender), amount);
            s.calls
                .push(Call::Approve { token, spender, amount });
            Ok(Self::next_hash(s))
        })
    }

    async fn transfer(
        &self,
        token: Address,
        to: Address,
        amount: U256,
    ) -> Result<TxHash, ProtocolError> {
        self.with_state(|s| {
            Self::debit(s, token, self.account, amount)?;
            *s.balances.entry((token, to)).or_default() += amount;
            s.calls
                .push(Call::Transfer { token, to, amount });
            Ok(Self::next_hash(s))
        })
    }
}

#[async_trait]
impl WrappedNativeClient for FakeProtocol {
    async fn deposit(&self, token: Address, amount: U256) -> Result<TxHash, ProtocolError> {
        self.with_state(|s| {
            let native = s.native.entry(self.account).or_default();
            if *native < amount {
                return Err(ProtocolError::Reverted("insufficient funds for transfer".to_string()));
            }
            *native -= amount;
            *s.balances
                .entry((token, self.account))
                .or_default() += amount;
            s.calls
                .push(Call::Deposit { token, amount });
            Ok(Self::next_hash(s))
        })
    }

    async fn withdraw(&self, token: Address, amount: U256) -> Result<TxHash, ProtocolError> {
        self.with_state(|s| {
            Self::debit(s, token, self.account, amount)?;
            *s.native.entry(self.account).or_default() += amount;
            s.calls
                .push(Call::Withdraw { token, amount });
            Ok(Self::next_hash(s))
        })
    }
}

#[async_trait]
impl FactoryClient for FakeProtocol {
    async fn get_pair(&self, token_a: Address, token_b: Address) -> Result<Address, ProtocolError> {
        Ok(self.with_state(|s| {
            s.pairs
                .get(&sorted(token_a, token_b))
                .copied()
                .unwrap_or(Address::ZERO)
        }))
    }

    async fn create_pair(
        &self,
        token_a: Address,
        token_b: Address,
    ) -> Result<TxHash, ProtocolError> {
        self.with_state(|s| {
            if s.pairs.contains_key(&sorted(token_a, token_b)) {
                return Err(ProtocolError::Reverted("UniswapV2: PAIR_EXISTS".to_string()));
            }
            Self::insert_pool(s, token_a, token_b);
            s.calls
                .push(Call::CreatePair { token_a, token_b });
            Ok(Self::next_hash(s))
        })
    }
}

#[async_trait]
impl RouterClient for FakeProtocol {
    fn address(&self) -> Address {
        ROUTER
    }

    async fn get_amounts_out(
        &self,
        amount_in: U256,
        path: Vec<Address>,
    ) -> Result<Vec<U256>, ProtocolError> {
        self.with_state(|s| {
            if s.failing_quotes > 0 {
                s.failing_quotes -= 1;
                return Err(ProtocolError::Network("request timed out".to_string()));
            }
            Self::quote(s, amount_in, &path)
        })
    }

    async fn add_liquidity(&self, params: AddLiquidityParams) -> Result<TxHash, ProtocolError> {
        self.with_state(|s| {
            let pair = s
                .pairs
                .get(&sorted(params.token_a, params.token_b))
                .copied()
                .ok_or_else(|| ProtocolError::Reverted("pair does not exist".to_string()))?;
            Self::spend_allowance(s, params.token_a, self.account, params.amount_a_desired)?;
            Self::spend_allowance(s, params.token_b, self.account, params.amount_b_desired)?;
            Self::debit(s, params.token_a, self.account, params.amount_a_desired)?;
            Self::debit(s, params.token_b, self.account, params.amount_b_desired)?;
            let minted = s.lp_per_add;
            *s.lp_balances
                .entry((pair, params.to))
                .or_default() += minted;
            s.calls
                .push(Call::AddLiquidity(params));
            Ok(Self::next_hash(s))
        })
    }

    async fn swap_exact_tokens_for_tokens(
        &self,
        params: SwapParams,
    ) -> Result<TxHash, ProtocolError> {
        self.with_state(|s| {
            if params.nonce != s.nonce {
                return Err(ProtocolError::Reverted("nonce too low".to_string()));
            }
            let (Some(&token_in), Some(&token_out)) = (params.path.first(), params.path.last())
            else {
                return Err(ProtocolError::Reverted("UniswapV2Library: INVALID_PATH".to_string()));
            };
            let amounts = Self::quote(s, params.amount_in, &params.path)?;
            let amount_out = amounts
                .last()
                .copied()
                .unwrap_or_default();
            if amount_out < params.amount_out_min {
                return Err(ProtocolError::TransactionFailed { hash: Self::next_hash(s) });
            }
            Self::spend_allowance(s, token_in, self.account, params.amount_in)?;
            Self::debit(s, token_in, self.account, params.amount_in)?;
            *s.balances
                .entry((token_out, params.to))
                .or_default() += amount_out;
            s.nonce += 1;
            s.calls.push(Call::Swap(params));
            Ok(Self::next_hash(s))
        })
    }
}

#[async_trait]
impl PairClient for FakeProtocol {
    async fn get_reserves(&self, pair: Address) -> Result<Reserves, ProtocolError> {
        Ok(self.with_state(|s| {
            s.reserves
                .get(&pair)
                .copied()
                .unwrap_or(Reserves {
                    reserve0: U256::ZERO,
                    reserve1: U256::ZERO,
                    block_timestamp_last: 0,
                })
        }))
    }

    async fn token0(&self, pair: Address) -> Result<Address, ProtocolError> {
        self.with_state(|s| {
            s.pairs
                .iter()
                .find(|(_, address)| **address == pair)
                .map(|((token0, _), _)| *token0)
                .ok_or_else(|| ProtocolError::Decode("no contract at address".to_string()))
        })
    }

    async fn token1(&self, pair: Address) -> Result<Address, ProtocolError> {
        self.with_state(|s| {
            s.pairs
                .iter()
                .find(|(_, address)| **address == pair)
                .map(|((_, token1), _)| *token1)
                .ok_or_else(|| ProtocolError::Decode("no contract at address".to_string()))
        })
    }

    async fn balance_of(&self, pair: Address, owner: Address) -> Result<U256, ProtocolError> {
        Ok(self.with_state(|s| {
            s.lp_balances
                .get(&(pair, owner))
                .copied()
                .unwrap_or_default()
        }))
    }

    async fn decimals(&self, _pair: Address) -> Result<u8, ProtocolError> {
        Ok(18)
    }
}

#[async_trait]
impl LedgerClient for FakeProtocol {
    async fn add_blockchain(
        &self,
        pair_address: Address,
        liquidity_amount: U256,
    ) -> Result<TxHash, ProtocolError> {
        self.with_state(|s| {
            s.ledger.push((
                self.account,
                LiquidityRecord::new(pair_address, liquidity_amount),
            ));
            s.calls
                .push(Call::Record { pair: pair_address, amount: liquidity_amount });
            Ok(Self::next_hash(s))
        })
    }

    async fn get_transactions(
        &self,
        account: Address,
    ) -> Result<Vec<LiquidityRecord>, ProtocolError> {
        Ok(self.with_state(|s| {
            s.ledger
                .iter()
                .filter(|(owner, _)| *owner == account)
                .map(|(_, record)| record.clone())
                .collect()
        }))
    }
}
