use crate::monitor::error::ChainResult;
use alloy::primitives::{Address, B256, Bytes};
use async_trait::async_trait;
use serde::Deserialize;

/// A transaction as seen inside a block, reduced to what discovery needs
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransactionView {
    pub hash: B256,

    /// Declared recipient; absent for contract deployments
    #[serde(default)]
    pub to: Option<Address>,
}

impl TransactionView {
    pub fn is_contract_creation(&self) -> bool {
        self.to.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockView {
    pub number: u64,
    pub transactions: Vec<TransactionView>,
}

impl BlockView {
    pub fn contract_creations(&self) -> impl Iterator<Item = &TransactionView> {
        self.transactions.iter().filter(|tx| tx.is_contract_creation())
    }
}

/// Read-only access to the chain.
///
/// Everything the workers know about the outside world goes through this
/// trait, which keeps them runnable against a scripted chain in tests.
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn chain_id(&self) -> ChainResult<u64>;

    /// Current head height
    async fn block_number(&self) -> ChainResult<u64>;

    /// Block with full transaction bodies, `None` if the node does not have it
    async fn block_with_transactions(&self, number: u64) -> ChainResult<Option<BlockView>>;

    /// Address created by a deployment, read from the transaction receipt
    async fn created_contract(&self, tx_hash: B256) -> ChainResult<Option<Address>>;

    /// Read-only contract call returning the raw ABI-encoded output
    async fn call(&self, to: Address, input: Bytes) -> ChainResult<Bytes>;
}
