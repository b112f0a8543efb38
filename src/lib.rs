pub mod types;
pub mod monitor;
pub mod config;
pub mod detection;

pub use types::{LiquidityReport, MonitorConfig, ReportFormat, TokenCandidate};
pub use monitor::{ChainReader, Coordinator, MonitorError, MonitorResult, Watchlist};
pub use crate::config::{load_config, create_default_config, parse_config};
pub use detection::{Classification, PairInspector, PairStatus, TokenClassifier};
