use crate::detection::interfaces::IERC20Like;
use crate::detection::read_call;
use crate::detection::types::Classification;
use crate::monitor::chain::ChainReader;
use crate::monitor::error::{ChainError, ChainResult};
use alloy::primitives::Address;
use std::sync::Arc;
use tracing::debug;

/// Decides whether a freshly deployed contract looks like an ERC-20 token
#[derive(Clone)]
pub struct TokenClassifier {
    chain: Arc<dyn ChainReader>,
}

impl TokenClassifier {
    pub fn new(chain: Arc<dyn ChainReader>) -> Self {
        Self { chain }
    }

    /// Probe `name()` then `symbol()`.
    ///
    /// A revert or undecodable answer is a definitive [`Classification::NotToken`];
    /// RPC failures come back as `Err` so the caller can tell the two apart.
    pub async fn classify(&self, address: Address) -> ChainResult<Classification> {
        let name = match self.name(address).await {
            Ok(name) => name,
            Err(e) => return not_token(address, "name()", e),
        };

        let symbol = match self.symbol(address).await {
            Ok(symbol) => symbol,
            Err(e) => return not_token(address, "symbol()", e),
        };

        Ok(Classification::Token { name, symbol })
    }

    pub async fn name(&self, address: Address) -> ChainResult<String> {
        read_call(self.chain.as_ref(), address, IERC20Like::nameCall {}).await
    }

    pub async fn symbol(&self, address: Address) -> ChainResult<String> {
        read_call(self.chain.as_ref(), address, IERC20Like::symbolCall {}).await
    }
}

fn not_token(address: Address, function: &str, err: ChainError) -> ChainResult<Classification> {
    if err.is_transient() {
        return Err(err);
    }
    debug!("{} failed {}: {}", address, function, err);
    Ok(Classification::NotToken {
        reason: format!("{} {}", function, err),
    })
}
