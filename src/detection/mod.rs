//! Contract classification and liquidity detection
//!
//! Everything here talks to contracts through [`ChainReader::call`] with
//! ABI-encoded calls, and turns the answers into typed results: a contract
//! either is or is not token-like, a pair either does or does not hold the
//! candidate. Transport failures are kept separate from both.

pub mod interfaces;
pub mod pair_probe;
pub mod token_probe;
pub mod types;

use crate::monitor::chain::ChainReader;
use crate::monitor::error::{ChainError, ChainResult};
use alloy::primitives::Address;
use alloy::sol_types::SolCall;

pub use pair_probe::PairInspector;
pub use token_probe::TokenClassifier;
pub use types::{Classification, PairStatus};

/// Perform a read-only call and decode its return value
pub(crate) async fn read_call<C>(
    chain: &dyn ChainReader,
    to: Address,
    call: C,
) -> ChainResult<C::Return>
where
    C: SolCall + Send,
{
    let input = call.abi_encode();
    let output = chain.call(to, input.into()).await?;
    C::abi_decode_returns(&output).map_err(|e| ChainError::Decode(e.to_string()))
}
