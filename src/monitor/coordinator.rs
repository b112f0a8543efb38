use crate::monitor::chain::ChainReader;
use crate::monitor::discovery::DiscoveryWorker;
use crate::monitor::error::{MonitorError, MonitorResult};
use crate::monitor::liquidity::LiquidityWorker;
use crate::monitor::rpc::RpcChainReader;
use crate::monitor::watchlist::Watchlist;
use crate::types::{LiquidityReport, MonitorConfig, ReportFormat};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info};

const REPORT_DRAIN: Duration = Duration::from_millis(200);

/// Starts both workers and keeps them alive until shutdown
pub struct Coordinator {
    config: MonitorConfig,
    chain: Arc<dyn ChainReader>,
    watchlist: Watchlist,
}

impl Coordinator {
    pub fn new(config: MonitorConfig, chain: Arc<dyn ChainReader>) -> Self {
        Self {
            config,
            chain,
            watchlist: Watchlist::new(),
        }
    }

    /// Build the RPC reader and make sure the node answers before anything
    /// else starts
    pub async fn connect(config: MonitorConfig) -> MonitorResult<Self> {
        let chain = RpcChainReader::new(config.rpc_endpoint.clone());
        let chain_id = chain.chain_id().await.map_err(|e| {
            MonitorError::ConnectionFailed(format!("{} did not answer: {}", chain.endpoint(), e))
        })?;
        info!("Connected to chain {} via {}", chain_id, chain.endpoint());

        Ok(Self::new(config, Arc::new(chain)))
    }

    pub fn watchlist(&self) -> &Watchlist {
        &self.watchlist
    }

    /// Run until `shutdown` resolves. Reports go to stdout.
    pub async fn run<F>(self, shutdown: F) -> MonitorResult<()>
    where
        F: Future<Output = ()>,
    {
        let (report_sender, report_receiver) = mpsc::unbounded_channel();
        let reporter = tokio::spawn(print_reports(report_receiver, self.config.report_format));
        self.run_with_reports(report_sender, shutdown).await;
        finish_reporter(reporter, REPORT_DRAIN).await
    }

    /// Run until `shutdown` resolves, sending reports to `report_sender`
    pub async fn run_with_reports<F>(
        self,
        report_sender: mpsc::UnboundedSender<LiquidityReport>,
        shutdown: F,
    ) where
        F: Future<Output = ()>,
    {
        let restart_delay = self.config.restart_delay;

        let discovery = {
            let config = self.config.clone();
            let chain = Arc::clone(&self.chain);
            let watchlist = self.watchlist.clone();
            tokio::spawn(supervise("discovery", restart_delay, move || {
                DiscoveryWorker::new(&config, Arc::clone(&chain), watchlist.clone())
                    .run()
                    .boxed()
            }))
        };

        let liquidity = {
            let config = self.config.clone();
            let chain = Arc::clone(&self.chain);
            let watchlist = self.watchlist.clone();
            tokio::spawn(supervise("liquidity", restart_delay, move || {
                LiquidityWorker::new(
                    &config,
                    Arc::clone(&chain),
                    watchlist.clone(),
                    report_sender.clone(),
                )
                .run()
                .boxed()
            }))
        };

        info!("Monitoring running. Press Ctrl+C to stop.");
        wait_for_shutdown(discovery, liquidity, shutdown).await;
        info!(
            "Monitoring stopped with {} candidate(s) still on the watchlist",
            self.watchlist.len()
        );
    }
}

async fn wait_for_shutdown<F>(discovery: JoinHandle<()>, liquidity: JoinHandle<()>, shutdown: F)
where
    F: Future<Output = ()>,
{
    let discovery_abort = discovery.abort_handle();
    let liquidity_abort = liquidity.abort_handle();

    tokio::select! {
        _ = shutdown => {
            info!("Received shutdown signal");
        }
        _ = async { let _ = tokio::join!(discovery, liquidity); } => {
            info!("Both workers ended");
        }
    }

    // In-flight RPC calls are dropped with their tasks
    discovery_abort.abort();
    liquidity_abort.abort();
}

/// Give the reporter `drain` to flush what the workers already sent. The
/// channel closes once the aborted workers drop their senders.
async fn finish_reporter(mut reporter: JoinHandle<()>, drain: Duration) -> MonitorResult<()> {
    match timeout(drain, &mut reporter).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(MonitorError::Unknown(format!("Report writer failed: {}", e))),
        Err(_) => {
            debug!("Reporter still busy after {:?}; dropping it", drain);
            reporter.abort();
            Ok(())
        }
    }
}

/// Aborts the wrapped task when dropped, so cancelling the supervisor also
/// stops the worker it is waiting on.
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Run a worker in its own task, restarting it after errors or panics.
/// A worker returning `Ok` ends supervision.
async fn supervise<F>(name: &'static str, restart_delay: Duration, mut start: F)
where
    F: FnMut() -> BoxFuture<'static, MonitorResult<()>>,
{
    loop {
        let worker = tokio::spawn(start());
        let _guard = AbortOnDrop(worker.abort_handle());
        match worker.await {
            Ok(Ok(())) => {
                info!("{} worker finished", name);
                return;
            }
            Ok(Err(e)) => {
                error!("{} worker crashed: {} - restarting in {:?}", name, e, restart_delay);
            }
            Err(e) if e.is_panic() => {
                error!("{} worker panicked - restarting in {:?}", name, restart_delay);
            }
            Err(_) => {
                info!("{} worker cancelled", name);
                return;
            }
        }
        sleep(restart_delay).await;
    }
}

async fn print_reports(mut receiver: mpsc::UnboundedReceiver<LiquidityReport>, format: ReportFormat) {
    while let Some(report) = receiver.recv().await {
        match report.render(format) {
            Ok(line) => {
                let mut stdout = std::io::stdout().lock();
                if let Err(e) = writeln!(stdout, "{}", line).and_then(|_| stdout.flush()) {
                    error!("Failed to write report: {}", e);
                }
            }
            Err(e) => error!("Failed to render report for {}: {}", report.token, e),
        }
    }
}
