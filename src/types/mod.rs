use crate::monitor::error::MonitorResult;
use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// A freshly deployed contract that answered the token probe and is waiting
/// for liquidity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCandidate {
    /// Deployed contract address
    pub address: Address,
    /// Height of the block the deployment was seen in
    pub discovered_at_block: u64,
    /// `name()` as returned by the probe
    pub name: String,
    /// `symbol()` as returned by the probe
    pub symbol: String,
}

impl TokenCandidate {
    /// EIP-55 checksummed address
    pub fn checksum_address(&self) -> String {
        self.address.to_checksum(None)
    }
}

impl fmt::Display for TokenCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) at {}",
            self.name,
            self.symbol,
            self.checksum_address()
        )
    }
}

/// Emitted once per candidate when a funded pair is found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityReport {
    pub token_name: String,
    pub token: Address,
    pub reference: Address,
    pub pair: Address,
    pub token_reserve: U256,
    pub reference_reserve: U256,
    pub discovered_at_block: u64,
}

impl LiquidityReport {
    /// Render as a single output line
    pub fn render(&self, format: ReportFormat) -> MonitorResult<String> {
        match format {
            ReportFormat::Text => Ok(self.to_string()),
            ReportFormat::Json => Ok(serde_json::to_string(self)?),
        }
    }
}

impl fmt::Display for LiquidityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Liquidity found for token '{}' — CA: {}",
            self.token_name,
            self.token.to_checksum(None)
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("unknown report format '{}'", other)),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

pub mod addresses {
    use alloy::primitives::{Address, address};

    pub const BASE_RPC_ENDPOINT: &str = "https://mainnet.base.org";

    /// Uniswap V2 style factory on Base
    pub const FACTORY: Address = address!("8909Dc15e40173Ff4699343b6eB8132c65e18eC6");

    /// Wrapped ether predeploy on Base
    pub const WETH: Address = address!("4200000000000000000000000000000000000006");

    pub const USDT: Address = address!("dAC17F958D2ee523a2206206994597C13D831ec7");
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// JSON-RPC HTTP endpoint
    pub rpc_endpoint: Url,

    /// DEX factory queried with `getPair`
    pub factory_address: Address,

    /// Counterparties checked for each candidate, in order
    pub reference_tokens: Vec<Address>,

    /// Blocks behind the head re-scanned on every pass
    pub rescan_depth: u64,

    pub poll_interval: Duration,

    pub backoff_base: Duration,

    pub backoff_max: Duration,

    /// Pause before a crashed worker is started again
    pub restart_delay: Duration,

    /// Remember classified deployment transactions across overlapping windows
    pub skip_seen_creations: bool,

    pub report_format: ReportFormat,

    pub log_level: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            rpc_endpoint: Url::parse(addresses::BASE_RPC_ENDPOINT)
                .expect("Invalid default RPC endpoint"),
            factory_address: addresses::FACTORY,
            reference_tokens: vec![addresses::WETH, addresses::USDT],
            rescan_depth: 5,
            poll_interval: Duration::from_millis(500),
            backoff_base: Duration::from_millis(500),
            backoff_max: Duration::from_secs(30),
            restart_delay: Duration::from_secs(2),
            skip_seen_creations: false,
            report_format: ReportFormat::Text,
            log_level: "info".to_string(),
        }
    }
}
