//! Scripted in-memory chain for driving the workers without a node

#![allow(dead_code)]

use alloy::primitives::{Address, B256, Bytes, U256};
use alloy::sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use liquidity_watcher::detection::interfaces::{IERC20Like, IUniswapV2Factory, IUniswapV2Pair};
use liquidity_watcher::monitor::{BlockView, ChainError, ChainReader, ChainResult, TransactionView};
use liquidity_watcher::types::addresses;
use liquidity_watcher::MonitorConfig;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
struct MockToken {
    name: Option<String>,
    symbol: Option<String>,
}

#[derive(Default)]
struct State {
    head: u64,
    blocks: HashMap<u64, Vec<TransactionView>>,
    receipts: HashMap<B256, Address>,
    tokens: HashMap<Address, MockToken>,
    pairs: HashMap<(Address, Address), Address>,
    reserves: HashMap<Address, (U256, U256)>,
    rpc_down: bool,
    receipts_down: bool,
    calls: Vec<(Address, [u8; 4])>,
    next_hash: u64,
}

#[derive(Default)]
pub struct MockChain {
    state: Mutex<State>,
}

impl MockChain {
    pub fn new(head: u64) -> Self {
        let chain = Self::default();
        chain.state.lock().unwrap().head = head;
        chain
    }

    pub fn set_head(&self, head: u64) {
        self.state.lock().unwrap().head = head;
    }

    fn next_hash(state: &mut State) -> B256 {
        state.next_hash += 1;
        B256::left_padding_from(&state.next_hash.to_be_bytes())
    }

    /// Add a deployment transaction for `contract` to `block`
    pub fn deploy(&self, block: u64, contract: Address) -> B256 {
        let mut state = self.state.lock().unwrap();
        let hash = Self::next_hash(&mut state);
        state
            .blocks
            .entry(block)
            .or_default()
            .push(TransactionView { hash, to: None });
        state.receipts.insert(hash, contract);
        hash
    }

    /// Add a plain call transaction to `block`
    pub fn transfer(&self, block: u64, to: Address) -> B256 {
        let mut state = self.state.lock().unwrap();
        let hash = Self::next_hash(&mut state);
        state
            .blocks
            .entry(block)
            .or_default()
            .push(TransactionView { hash, to: Some(to) });
        hash
    }

    /// Give `contract` a token interface; `None` makes that getter revert
    pub fn token(&self, contract: Address, name: Option<&str>, symbol: Option<&str>) {
        self.state.lock().unwrap().tokens.insert(
            contract,
            MockToken {
                name: name.map(str::to_string),
                symbol: symbol.map(str::to_string),
            },
        );
    }

    /// Register a pair on the factory, with reserves in pair order
    pub fn list_pair(&self, a: Address, b: Address, pair: Address, reserve0: u64, reserve1: u64) {
        let mut state = self.state.lock().unwrap();
        state.pairs.insert((a, b), pair);
        state.pairs.insert((b, a), pair);
        state
            .reserves
            .insert(pair, (U256::from(reserve0), U256::from(reserve1)));
    }

    /// Register a pair whose `getReserves` reverts
    pub fn list_broken_pair(&self, a: Address, b: Address, pair: Address) {
        let mut state = self.state.lock().unwrap();
        state.pairs.insert((a, b), pair);
        state.pairs.insert((b, a), pair);
    }

    pub fn set_rpc_down(&self, down: bool) {
        self.state.lock().unwrap().rpc_down = down;
    }

    pub fn set_receipts_down(&self, down: bool) {
        self.state.lock().unwrap().receipts_down = down;
    }

    /// Number of calls made to `contract` with `selector`
    pub fn call_count(&self, contract: Address, selector: [u8; 4]) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|(to, s)| *to == contract && *s == selector)
            .count()
    }
}

fn reverted() -> ChainError {
    ChainError::Reverted("execution reverted".to_string())
}

fn node_down() -> ChainError {
    ChainError::Rpc("connection refused".to_string())
}

#[async_trait]
impl ChainReader for MockChain {
    async fn chain_id(&self) -> ChainResult<u64> {
        Ok(8453)
    }

    async fn block_number(&self) -> ChainResult<u64> {
        let state = self.state.lock().unwrap();
        if state.rpc_down {
            return Err(node_down());
        }
        Ok(state.head)
    }

    async fn block_with_transactions(&self, number: u64) -> ChainResult<Option<BlockView>> {
        let state = self.state.lock().unwrap();
        if state.rpc_down {
            return Err(node_down());
        }
        if number > state.head {
            return Ok(None);
        }
        Ok(Some(BlockView {
            number,
            transactions: state.blocks.get(&number).cloned().unwrap_or_default(),
        }))
    }

    async fn created_contract(&self, tx_hash: B256) -> ChainResult<Option<Address>> {
        let state = self.state.lock().unwrap();
        if state.rpc_down || state.receipts_down {
            return Err(node_down());
        }
        Ok(state.receipts.get(&tx_hash).copied())
    }

    async fn call(&self, to: Address, input: Bytes) -> ChainResult<Bytes> {
        let mut state = self.state.lock().unwrap();
        if state.rpc_down {
            return Err(node_down());
        }

        let selector: [u8; 4] = input
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(reverted)?;
        state.calls.push((to, selector));

        let output = if selector == IERC20Like::nameCall::SELECTOR {
            let name = state.tokens.get(&to).and_then(|t| t.name.clone());
            (name.ok_or_else(reverted)?,).abi_encode_params()
        } else if selector == IERC20Like::symbolCall::SELECTOR {
            let symbol = state.tokens.get(&to).and_then(|t| t.symbol.clone());
            (symbol.ok_or_else(reverted)?,).abi_encode_params()
        } else if selector == IUniswapV2Factory::getPairCall::SELECTOR {
            let call = IUniswapV2Factory::getPairCall::abi_decode(&input)
                .map_err(|e| ChainError::Decode(e.to_string()))?;
            let pair = state
                .pairs
                .get(&(call.tokenA, call.tokenB))
                .copied()
                .unwrap_or(Address::ZERO);
            (pair,).abi_encode_params()
        } else if selector == IUniswapV2Pair::getReservesCall::SELECTOR {
            let (reserve0, reserve1) = state.reserves.get(&to).copied().ok_or_else(reverted)?;
            (reserve0, reserve1, U256::ZERO).abi_encode_params()
        } else {
            return Err(reverted());
        };

        Ok(output.into())
    }
}

/// Candidate token addresses sort below both default reference tokens,
/// so the candidate is always `token0`
pub fn token_address(n: u8) -> Address {
    let mut bytes = [0x10u8; 20];
    bytes[19] = n;
    Address::from(bytes)
}

pub fn pair_address(n: u8) -> Address {
    let mut bytes = [0xa0u8; 20];
    bytes[19] = n;
    Address::from(bytes)
}

pub fn test_config() -> MonitorConfig {
    MonitorConfig {
        factory_address: addresses::FACTORY,
        reference_tokens: vec![addresses::WETH, addresses::USDT],
        poll_interval: Duration::from_millis(5),
        backoff_base: Duration::from_millis(5),
        backoff_max: Duration::from_millis(20),
        restart_delay: Duration::from_millis(5),
        ..MonitorConfig::default()
    }
}
