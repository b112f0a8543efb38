use crate::detection::interfaces::{IUniswapV2Factory, IUniswapV2Pair};
use crate::detection::read_call;
use crate::detection::types::PairStatus;
use crate::monitor::chain::ChainReader;
use crate::monitor::error::ChainResult;
use alloy::primitives::{Address, U256};
use std::sync::Arc;
use tracing::debug;

/// Looks up a candidate's pair on the factory and reads its reserves
#[derive(Clone)]
pub struct PairInspector {
    chain: Arc<dyn ChainReader>,
    factory: Address,
}

impl PairInspector {
    pub fn new(chain: Arc<dyn ChainReader>, factory: Address) -> Self {
        Self { chain, factory }
    }

    pub fn factory(&self) -> Address {
        self.factory
    }

    pub async fn inspect(&self, token: Address, reference: Address) -> ChainResult<PairStatus> {
        let pair = read_call(
            self.chain.as_ref(),
            self.factory,
            IUniswapV2Factory::getPairCall {
                tokenA: token,
                tokenB: reference,
            },
        )
        .await?;

        if pair.is_zero() {
            return Ok(PairStatus::NoPair);
        }

        let reserves =
            read_call(self.chain.as_ref(), pair, IUniswapV2Pair::getReservesCall {}).await?;
        let (token_reserve, reference_reserve) =
            select_reserves(token, reference, reserves.reserve0, reserves.reserve1);

        debug!(
            "Pair {} for {}: token reserve {}, reference reserve {}",
            pair, token, token_reserve, reference_reserve
        );

        if token_reserve.is_zero() {
            return Ok(PairStatus::Unfunded { pair });
        }

        Ok(PairStatus::Funded {
            pair,
            token_reserve,
            reference_reserve,
        })
    }
}

/// Split pair reserves into (token, reference).
///
/// Pairs store the lower address as `token0`.
pub fn select_reserves(
    token: Address,
    reference: Address,
    reserve0: U256,
    reserve1: U256,
) -> (U256, U256) {
    if token < reference {
        (reserve0, reserve1)
    } else {
        (reserve1, reserve0)
    }
}
