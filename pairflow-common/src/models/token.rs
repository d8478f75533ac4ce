use std::hash::{Hash, Hasher};

use alloy_primitives::{address, Address, U256};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, Eq)]
pub struct Token {
    pub address: Address,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    /// Set on the token that is minted 1:1 by depositing the chain's native currency.
    #[serde(default)]
    pub wrapped_native: bool,
}

impl Token {
    pub fn new(address: Address, symbol: &str, name: &str, decimals: u8) -> Self {
        Self {
            address,
            symbol: symbol.to_string(),
            name: name.to_string(),
            decimals,
            wrapped_native: false,
        }
    }

    pub fn wrapped_native(address: Address, symbol: &str, name: &str) -> Self {
        Self { wrapped_native: true, ..Self::new(address, symbol, name, 18) }
    }

    /// One whole token in base units, `None` if `10^decimals` does not fit a U256.
    pub fn one(&self) -> Option<U256> {
        U256::from(10u8).checked_pow(U256::from(self.decimals))
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address.hash(state);
    }
}

pub const WETH_ADDRESS: Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
pub const USDT_ADDRESS: Address = address!("dAC17F958D2ee523a2206206994597C13D831ec7");

// (address, symbol, name, decimals) for every non-wrapped token listed on mainnet.
const MAINNET_TOKENS: [(Address, &str, &str, u8); 22] = [
    (USDT_ADDRESS, "USDT", "Tether USD", 6),
    (address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"), "USDC", "USD Coin", 6),
    (address!("6B175474E89094C44Da98b954EedeAC495271d0F"), "DAI", "Dai Stablecoin", 18),
    (address!("4Fabb145d64652a948d72533023f6E7A623C7C53"), "BUSD", "Binance USD", 18),
    (address!("1f9840a85d5aF5bf1D1762F925BDADdC4201F984"), "UNI", "Uniswap", 18),
    (address!("7Fc66500c84A76Ad7e9c93437bFc5Ac33E2DDaE9"), "AAVE", "Aave Token", 18),
    (address!("514910771AF9Ca656af840dff83E8264EcF986CA"), "LINK", "ChainLink Token", 18),
    (address!("D533a949740bb3306d119CC777fa900bA034cd52"), "CRV", "Curve DAO Token", 18),
    (address!("c00e94Cb662C3520282E6f5717214004A7f26888"), "COMP", "Compound", 18),
    (address!("7D1AfA7B718fb893dB30A3aBc0Cfc608AaCfeBB0"), "MATIC", "Polygon", 18),
    (address!("B50721BCf8d664c30412Cfbc6cf7a15145234ad1"), "ARB", "Arbitrum", 18),
    (address!("4200000000000000000000000000000000000042"), "OP", "Optimism", 18),
    (address!("3845badAde8e6dFF049820680d1F14bD3903a5d0"), "SAND", "The Sandbox", 18),
    (address!("0F5D2fB29fb7d3CFeE444a200298f468908cC942"), "MANA", "Decentraland", 18),
    (address!("95aD61b0a150d79219dCF64E1E6Cc01f0B64C4cE"), "SHIB", "Shiba Inu", 18),
    (address!("6982508145454Ce325dDbE47a25d4ec3d2311933"), "PEPE", "Pepe", 18),
    (address!("9f8F72aA9304c8B593d555F12eF6589cC3A579A2"), "MKR", "Maker", 18),
    (address!("C011a73ee8576Fb46F5E1c5751cA3B9Fe0af2a6F"), "SNX", "Synthetix Network Token", 18),
    (address!("c944E90C64B2c07662A292be6244BDf05Cda44a7"), "GRT", "The Graph", 18),
    (address!("5A98FcBEA516Cf06857215779Fd812CA3beF1B32"), "LDO", "Lido DAO Token", 18),
    (address!("D33526068D116cE69F19A9ee46F0bd304F21A51f"), "RPL", "Rocket Pool", 18),
    (address!("3432B6A60D23Ca0dFCa7761B7ab56459D9C964D0"), "FXS", "Frax Share", 18),
];

/// Static token list the user picks from. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRegistry {
    tokens: Vec<Token>,
}

impl TokenRegistry {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// Ethereum mainnet registry, with WETH as the wrapped-native token.
    pub fn mainnet() -> Self {
        let mut tokens = Vec::with_capacity(MAINNET_TOKENS.len() + 1);
        tokens.push(Token::wrapped_native(WETH_ADDRESS, "WETH", "Wrapped Ethereum"));
        tokens.extend(
            MAINNET_TOKENS
                .iter()
                .map(|(address, symbol, name, decimals)| {
                    Token::new(*address, symbol, name, *decimals)
                }),
        );
        Self { tokens }
    }

    /// Replaces the wrapped-native entry, e.g. when running against a fork or testnet.
    pub fn with_wrapped_native(mut self, address: Address) -> Self {
        self.tokens
            .retain(|token| !token.wrapped_native);
        self.tokens
            .insert(0, Token::wrapped_native(address, "WETH", "Wrapped Ethereum"));
        self
    }

    pub fn by_symbol(&self, symbol: &str) -> Option<&Token> {
        self.tokens
            .iter()
            .find(|token| token.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn by_address(&self, address: &Address) -> Option<&Token> {
        self.tokens
            .iter()
            .find(|token| &token.address == address)
    }

    pub fn wrapped_native(&self) -> Option<&Token> {
        self.tokens
            .iter()
            .find(|token| token.wrapped_native)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
