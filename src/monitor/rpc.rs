use crate::monitor::chain::{BlockView, ChainReader, TransactionView};
use crate::monitor::error::{ChainError, ChainResult};
use alloy::eips::BlockNumberOrTag;
use alloy::primitives::{Address, B256, Bytes};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::TransportError;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

// Blocks and receipts are decoded into these minimal views instead of the
// typed alloy responses, so L2 transaction types (OP deposits on Base) are
// never a decoding failure.
#[derive(Debug, Deserialize)]
struct RawBlock {
    #[serde(default)]
    transactions: Vec<TransactionView>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    #[serde(default)]
    contract_address: Option<Address>,
}

/// Chain reader backed by an alloy HTTP provider
pub struct RpcChainReader {
    provider: DynProvider,
    endpoint: Url,
}

impl RpcChainReader {
    pub fn new(endpoint: Url) -> Self {
        info!("Using RPC endpoint: {}", endpoint);
        let provider = ProviderBuilder::new().connect_http(endpoint.clone()).erased();
        Self { provider, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ChainReader for RpcChainReader {
    async fn chain_id(&self) -> ChainResult<u64> {
        self.provider.get_chain_id().await.map_err(rpc_error)
    }

    async fn block_number(&self) -> ChainResult<u64> {
        self.provider.get_block_number().await.map_err(rpc_error)
    }

    async fn block_with_transactions(&self, number: u64) -> ChainResult<Option<BlockView>> {
        let block: Option<RawBlock> = self
            .provider
            .raw_request(
                "eth_getBlockByNumber".into(),
                (BlockNumberOrTag::Number(number), true),
            )
            .await
            .map_err(rpc_error)?;

        Ok(block.map(|raw| BlockView {
            number,
            transactions: raw.transactions,
        }))
    }

    async fn created_contract(&self, tx_hash: B256) -> ChainResult<Option<Address>> {
        let receipt: Option<RawReceipt> = self
            .provider
            .raw_request("eth_getTransactionReceipt".into(), (tx_hash,))
            .await
            .map_err(rpc_error)?;

        Ok(receipt.and_then(|r| r.contract_address))
    }

    async fn call(&self, to: Address, input: Bytes) -> ChainResult<Bytes> {
        let tx = TransactionRequest::default().to(to).input(input.into());
        self.provider.call(tx).await.map_err(call_error)
    }
}

fn rpc_error(err: TransportError) -> ChainError {
    ChainError::Rpc(err.to_string())
}

/// A node answering `eth_call` with code 3 or a revert message is reporting
/// on the contract, not on itself.
fn call_error(err: TransportError) -> ChainError {
    if let Some(payload) = err.as_error_resp() {
        if payload.code == 3 || payload.message.to_lowercase().contains("revert") {
            debug!("eth_call reverted: {}", payload.message);
            return ChainError::Reverted(payload.message.to_string());
        }
    }
    ChainError::Rpc(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::rpc::json_rpc::ErrorPayload;
    use alloy::transports::{RpcError, TransportErrorKind};

    fn error_response(code: i64, message: &'static str) -> TransportError {
        RpcError::ErrorResp(ErrorPayload {
            code,
            message: message.into(),
            data: None,
        })
    }

    #[test]
    fn test_revert_responses_are_reverts() {
        assert!(matches!(
            call_error(error_response(3, "execution reverted")),
            ChainError::Reverted(_)
        ));
        assert!(matches!(
            call_error(error_response(-32000, "execution reverted: not supported")),
            ChainError::Reverted(_)
        ));
    }

    #[test]
    fn test_node_failures_are_rpc_errors() {
        assert!(matches!(
            call_error(error_response(-32005, "limit exceeded")),
            ChainError::Rpc(_)
        ));
        assert!(matches!(
            call_error(TransportErrorKind::custom_str("connection refused")),
            ChainError::Rpc(_)
        ));
    }

    #[test]
    fn test_receipt_view_reads_contract_address() {
        let json = r#"{
            "transactionHash": "0x00000000000000000000000000000000000000000000000000000000000000aa",
            "contractAddress": "0x4200000000000000000000000000000000000006",
            "status": "0x1"
        }"#;
        let receipt: RawReceipt = serde_json::from_str(json).unwrap();
        assert_eq!(
            receipt.contract_address,
            Some("0x4200000000000000000000000000000000000006".parse().unwrap())
        );
    }

    #[test]
    fn test_block_view_ignores_unknown_transaction_fields() {
        let json = r#"{
            "number": "0x10",
            "transactions": [
                { "hash": "0x00000000000000000000000000000000000000000000000000000000000000aa",
                  "type": "0x7e", "to": "0x4200000000000000000000000000000000000015" },
                { "hash": "0x00000000000000000000000000000000000000000000000000000000000000bb",
                  "type": "0x2", "to": null }
            ]
        }"#;
        let block: RawBlock = serde_json::from_str(json).unwrap();
        assert_eq!(block.transactions.len(), 2);
        assert!(block.transactions[1].is_contract_creation());
    }
}
