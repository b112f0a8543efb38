pub mod backoff;
pub mod chain;
pub mod coordinator;
pub mod discovery;
pub mod error;
pub mod liquidity;
pub mod rpc;
pub mod watchlist;

pub use backoff::Backoff;
pub use chain::{BlockView, ChainReader, TransactionView};
pub use coordinator::Coordinator;
pub use discovery::{DiscoveryWorker, ScanSummary};
pub use error::{ChainError, ChainResult, MonitorError, MonitorResult};
pub use liquidity::{LiquidityPass, LiquidityWorker};
pub use rpc::RpcChainReader;
pub use watchlist::Watchlist;
