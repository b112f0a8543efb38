use liquidity_watcher::{Coordinator, create_default_config, load_config};
use std::env;
use std::str::FromStr;
use tracing::{Level, error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let loaded = load_config(&config_path);

    // Reports own stdout; logs go to stderr
    let level = loaded
        .as_ref()
        .ok()
        .and_then(|cfg| Level::from_str(&cfg.log_level).ok())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting token liquidity watcher");

    let config = match loaded {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load config: {}", e);
            if !std::path::Path::new(&config_path).exists() {
                info!("Creating default config file...");
                create_default_config(&config_path)?;
                info!("Please review {} and start again", config_path);
                return Ok(());
            }
            return Err(e.into());
        }
    };

    info!("RPC endpoint: {}", config.rpc_endpoint);
    info!("Factory: {}", config.factory_address);
    info!("Reference tokens: {:?}", config.reference_tokens);

    let coordinator = match Coordinator::connect(config).await {
        Ok(coordinator) => coordinator,
        Err(e) => {
            error!("Failed to connect: {}", e);
            return Err(e.into());
        }
    };

    coordinator
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    info!("Monitoring stopped.");
    Ok(())
}
