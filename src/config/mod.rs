use crate::monitor::error::{MonitorError, MonitorResult};
use crate::types::{MonitorConfig, ReportFormat, addresses};
use alloy::primitives::Address;
use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;
use url::Url;

#[derive(Debug, Default, Deserialize, Serialize)]
struct RawConfig {
    monitor: RawMonitorConfig,
    #[serde(default)]
    report: ReportConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize)]
struct RawMonitorConfig {
    rpc_endpoint: String,
    factory_address: String,
    reference_tokens: Vec<String>,
    rescan_depth: Option<u64>,
    poll_interval_ms: Option<u64>,
    backoff_base_ms: Option<u64>,
    backoff_max_ms: Option<u64>,
    restart_delay_ms: Option<u64>,
    skip_seen_creations: Option<bool>,
}

impl Default for RawMonitorConfig {
    fn default() -> Self {
        let defaults = MonitorConfig::default();
        Self {
            rpc_endpoint: addresses::BASE_RPC_ENDPOINT.to_string(),
            factory_address: addresses::FACTORY.to_checksum(None),
            reference_tokens: defaults
                .reference_tokens
                .iter()
                .map(|a| a.to_checksum(None))
                .collect(),
            rescan_depth: Some(defaults.rescan_depth),
            poll_interval_ms: Some(defaults.poll_interval.as_millis() as u64),
            backoff_base_ms: Some(defaults.backoff_base.as_millis() as u64),
            backoff_max_ms: Some(defaults.backoff_max.as_millis() as u64),
            restart_delay_ms: Some(defaults.restart_delay.as_millis() as u64),
            skip_seen_creations: Some(defaults.skip_seen_creations),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct ReportConfig {
    format: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
struct LoggingConfig {
    level: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Some("info".to_string()),
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> MonitorResult<MonitorConfig> {
    let config = Config::builder()
        .add_source(File::from(path.as_ref()))
        .build()
        .map_err(|e| MonitorError::ConfigError(format!("Failed to load config: {}", e)))?;

    parse_raw(config)
}

/// Load configuration from TOML text
pub fn parse_config(toml: &str) -> MonitorResult<MonitorConfig> {
    let config = Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()
        .map_err(|e| MonitorError::ConfigError(format!("Failed to load config: {}", e)))?;

    parse_raw(config)
}

fn parse_raw(config: Config) -> MonitorResult<MonitorConfig> {
    let raw: RawConfig = config
        .try_deserialize()
        .map_err(|e| MonitorError::ConfigError(format!("Failed to parse config: {}", e)))?;

    validate(raw)
}

fn parse_address(field: &str, value: &str) -> MonitorResult<Address> {
    Address::from_str(value.trim())
        .map_err(|e| MonitorError::ConfigError(format!("Invalid {} '{}': {}", field, value, e)))
}

fn validate(raw: RawConfig) -> MonitorResult<MonitorConfig> {
    let defaults = MonitorConfig::default();
    let monitor = raw.monitor;

    if !monitor.rpc_endpoint.starts_with("http://") && !monitor.rpc_endpoint.starts_with("https://")
    {
        return Err(MonitorError::ConfigError(format!(
            "Invalid RPC endpoint (must start with http:// or https://): {}",
            monitor.rpc_endpoint
        )));
    }
    let rpc_endpoint = Url::parse(&monitor.rpc_endpoint)
        .map_err(|e| MonitorError::ConfigError(format!("Invalid RPC endpoint: {}", e)))?;

    let factory_address = parse_address("factory address", &monitor.factory_address)?;

    if monitor.reference_tokens.is_empty() {
        return Err(MonitorError::ConfigError(
            "At least one reference token is required".to_string(),
        ));
    }
    let reference_tokens = monitor
        .reference_tokens
        .iter()
        .map(|t| parse_address("reference token", t))
        .collect::<MonitorResult<Vec<_>>>()?;

    let backoff_base = monitor
        .backoff_base_ms
        .map(Duration::from_millis)
        .unwrap_or(defaults.backoff_base);
    let backoff_max = monitor
        .backoff_max_ms
        .map(Duration::from_millis)
        .unwrap_or(defaults.backoff_max);
    if backoff_base.is_zero() {
        return Err(MonitorError::ConfigError(
            "backoff_base_ms must be greater than zero".to_string(),
        ));
    }
    if backoff_base > backoff_max {
        return Err(MonitorError::ConfigError(format!(
            "backoff_base_ms ({:?}) exceeds backoff_max_ms ({:?})",
            backoff_base, backoff_max
        )));
    }

    let report_format = match raw.report.format {
        Some(format) => ReportFormat::from_str(&format).map_err(MonitorError::ConfigError)?,
        None => defaults.report_format,
    };

    let log_level = raw.logging.level.unwrap_or(defaults.log_level);
    tracing::Level::from_str(&log_level)
        .map_err(|_| MonitorError::ConfigError(format!("Invalid logging level: {}", log_level)))?;

    Ok(MonitorConfig {
        rpc_endpoint,
        factory_address,
        reference_tokens,
        rescan_depth: monitor.rescan_depth.unwrap_or(defaults.rescan_depth),
        poll_interval: monitor
            .poll_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_interval),
        backoff_base,
        backoff_max,
        restart_delay: monitor
            .restart_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.restart_delay),
        skip_seen_creations: monitor
            .skip_seen_creations
            .unwrap_or(defaults.skip_seen_creations),
        report_format,
        log_level,
    })
}

/// Create a default configuration file
pub fn create_default_config<P: AsRef<Path>>(path: P) -> MonitorResult<()> {
    let body = toml::to_string_pretty(&RawConfig::default())
        .map_err(|e| MonitorError::ConfigError(format!("Failed to render default config: {}", e)))?;
    let contents = format!(
        "# Token liquidity watcher configuration\n\
         # report.format: text | json\n\
         # logging.level: trace | debug | info | warn | error\n\
         # monitor.skip_seen_creations: true stops re-probing deployments the\n\
         # overlapping rescan window has already classified\n\n{}",
        body
    );

    std::fs::write(path.as_ref(), contents)
        .map_err(|e| MonitorError::ConfigError(format!("Failed to write config file: {}", e)))?;

    info!("Created default config file at {:?}", path.as_ref());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[monitor]
rpc_endpoint = "https://mainnet.base.org"
factory_address = "0x8909Dc15e40173Ff4699343b6eB8132c65e18eC6"
reference_tokens = ["0x4200000000000000000000000000000000000006"]
"#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse_config(MINIMAL).unwrap();
        assert_eq!(config.factory_address, addresses::FACTORY);
        assert_eq!(config.reference_tokens, vec![addresses::WETH]);
        assert_eq!(config.rescan_depth, 5);
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.report_format, ReportFormat::Text);
        assert_eq!(config.log_level, "info");
        assert!(!config.skip_seen_creations);
    }

    #[test]
    fn test_overrides_are_applied() {
        let toml = format!(
            "{}rescan_depth = 2\npoll_interval_ms = 50\nskip_seen_creations = true\n\n[report]\nformat = \"json\"\n\n[logging]\nlevel = \"debug\"\n",
            MINIMAL
        );
        let config = parse_config(&toml).unwrap();
        assert_eq!(config.rescan_depth, 2);
        assert_eq!(config.poll_interval, Duration::from_millis(50));
        assert!(config.skip_seen_creations);
        assert_eq!(config.report_format, ReportFormat::Json);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_config_validation() {
        let mut raw = RawConfig::default();
        raw.monitor.reference_tokens.clear();
        assert!(matches!(validate(raw), Err(MonitorError::ConfigError(_))));

        let mut raw = RawConfig::default();
        raw.monitor.rpc_endpoint = "wss://mainnet.base.org".to_string();
        assert!(validate(raw).is_err());

        let mut raw = RawConfig::default();
        raw.monitor.factory_address = "0x1234".to_string();
        assert!(validate(raw).is_err());

        let mut raw = RawConfig::default();
        raw.monitor.backoff_base_ms = Some(10_000);
        raw.monitor.backoff_max_ms = Some(1_000);
        assert!(validate(raw).is_err());

        let mut raw = RawConfig::default();
        raw.logging.level = Some("loud".to_string());
        assert!(validate(raw).is_err());
    }

    #[test]
    fn test_default_config_round_trips() {
        let dir = std::env::temp_dir().join(format!("liquidity-watcher-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        create_default_config(&path).unwrap();
        let config = load_config(&path).unwrap();

        assert_eq!(config.reference_tokens, MonitorConfig::default().reference_tokens);
        assert_eq!(config.backoff_max, Duration::from_secs(30));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
