//! Read-only contract interfaces used for classification and liquidity checks

use alloy::sol;

sol! {
    /// Minimal ERC-20-like surface. Only `name` and `symbol` are probed.
    interface IERC20Like {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function owner() external view returns (address);
    }

    interface IUniswapV2Factory {
        function getPair(address tokenA, address tokenB) external view returns (address);
    }

    /// Reserves are declared as full words; uint112/uint32 implementations
    /// encode identically.
    interface IUniswapV2Pair {
        function getReserves() external view returns (uint256 reserve0, uint256 reserve1, uint256 blockTimestampLast);
    }
}
