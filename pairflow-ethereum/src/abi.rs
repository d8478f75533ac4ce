//! Typed interfaces of the external contracts.
//!
//! Only the entry points the workflows call are declared.

use alloy::{primitives::U256, sol, sol_types::SolCall};
use pairflow_common::{
    errors::ProtocolError,
    models::{LiquidityRecord, Reserves},
};

sol! {
    // Copied from EIP-20: https://eips.ethereum.org/EIPS/eip-20
    #[sol(rpc)]
    interface IERC20 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 value) external returns (bool);
        function transfer(address to, uint256 value) external returns (bool);
    }

    #[sol(rpc)]
    interface IWETH9 {
        function deposit() external payable;
        function withdraw(uint256 wad) external;
    }

    #[sol(rpc)]
    interface IUniswapV2Factory {
        function getPair(address tokenA, address tokenB) external view returns (address pair);
        function createPair(address tokenA, address tokenB) external returns (address pair);
    }

    #[sol(rpc)]
    interface IUniswapV2Router02 {
        function getAmountsOut(uint256 amountIn, address[] calldata path)
            external view returns (uint256[] memory amounts);

        function addLiquidity(
            address tokenA,
            address tokenB,
            uint256 amountADesired,
            uint256 amountBDesired,
            uint256 amountAMin,
            uint256 amountBMin,
            address to,
            uint256 deadline
        ) external returns (uint256 amountA, uint256 amountB, uint256 liquidity);

        function swapExactTokensForTokens(
            uint256 amountIn,
            uint256 amountOutMin,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external returns (uint256[] memory amounts);
    }

    #[sol(rpc)]
    interface IUniswapV2Pair {
        function token0() external view returns (address);
        function token1() external view returns (address);
        function decimals() external view returns (uint8);
        function balanceOf(address owner) external view returns (uint256);
        function getReserves()
            external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
    }

    /// Append-only record of liquidity contributed per account.
    #[sol(rpc)]
    interface IUserStorageData {
        struct LiquidityTransaction {
            address pairAddress;
            uint256 liquidityAmount;
        }

        function addBlockchain(address pairAddress, uint256 liquidityAmount) external;
        function getTransactions(address user)
            external view returns (LiquidityTransaction[] memory);
    }
}

impl From<IUniswapV2Pair::getReservesReturn> for Reserves {
    fn from(value: IUniswapV2Pair::getReservesReturn) -> Self {
        Reserves {
            reserve0: U256::from(value.reserve0),
            reserve1: U256::from(value.reserve1),
            block_timestamp_last: value.blockTimestampLast,
        }
    }
}

impl From<IUserStorageData::LiquidityTransaction> for LiquidityRecord {
    fn from(value: IUserStorageData::LiquidityTransaction) -> Self {
        LiquidityRecord::new(value.pairAddress, value.liquidityAmount)
    }
}

/// Decodes the return data of a `decimals()` call. Words that do not fit a `uint8` are rejected
/// instead of being truncated.
pub(crate) fn decode_decimals(data: &[u8]) -> Result<u8, ProtocolError> {
    IERC20::decimalsCall::abi_decode_returns_validate(data)
        .map_err(|e| ProtocolError::Decode(format!("decimals: {e}")))
}
