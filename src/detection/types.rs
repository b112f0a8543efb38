use alloy::primitives::{Address, U256};

/// Outcome of probing a deployed contract for the token interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Both `name()` and `symbol()` answered
    Token { name: String, symbol: String },

    /// The contract reverted or returned something that is not a string
    NotToken { reason: String },
}

/// State of the pair between a candidate and one reference token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairStatus {
    /// Factory returned the zero address
    NoPair,

    /// Pair deployed but holds none of the candidate
    Unfunded { pair: Address },

    Funded {
        pair: Address,
        token_reserve: U256,
        reference_reserve: U256,
    },
}
