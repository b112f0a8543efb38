use crate::detection::{Classification, TokenClassifier};
use crate::monitor::backoff::Backoff;
use crate::monitor::chain::{ChainReader, TransactionView};
use crate::monitor::error::MonitorResult;
use crate::monitor::watchlist::Watchlist;
use crate::types::{MonitorConfig, TokenCandidate};
use alloy::primitives::B256;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

const SEEN_CACHE_SIZE: usize = 10_000;

/// Counters for one pass over the trailing block window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub head: u64,
    pub blocks_scanned: usize,
    pub creations_seen: usize,
    pub candidates_added: usize,
}

/// Scans recent blocks for contract deployments and adds token-like ones to
/// the watchlist
pub struct DiscoveryWorker {
    chain: Arc<dyn ChainReader>,
    classifier: TokenClassifier,
    watchlist: Watchlist,
    rescan_depth: u64,
    poll_interval: Duration,
    backoff: Backoff,
    skip_seen: bool,
    seen_creations: HashSet<B256>,
    seen_order: VecDeque<B256>,
}

impl DiscoveryWorker {
    pub fn new(config: &MonitorConfig, chain: Arc<dyn ChainReader>, watchlist: Watchlist) -> Self {
        Self {
            classifier: TokenClassifier::new(Arc::clone(&chain)),
            chain,
            watchlist,
            rescan_depth: config.rescan_depth,
            poll_interval: config.poll_interval,
            backoff: Backoff::new(config.backoff_base, config.backoff_max),
            skip_seen: config.skip_seen_creations,
            seen_creations: HashSet::new(),
            seen_order: VecDeque::new(),
        }
    }

    /// Scan forever. Only non-transient errors end the loop.
    pub async fn run(mut self) -> MonitorResult<()> {
        info!(
            "Discovery worker started (rescanning {} blocks behind head)",
            self.rescan_depth
        );

        loop {
            match self.scan_once().await {
                Ok(summary) => {
                    if summary.candidates_added > 0 {
                        info!(
                            "Head {}: {} new candidate(s), watchlist size {}",
                            summary.head,
                            summary.candidates_added,
                            self.watchlist.len()
                        );
                    } else {
                        debug!("Scan pass complete: {:?}", summary);
                    }
                    self.backoff.reset();
                    sleep(self.poll_interval).await;
                }
                Err(e) if e.is_transient() => {
                    let delay = self.backoff.next_delay();
                    warn!(
                        "Scan pass failed (attempt {}): {} - retrying in {:?}",
                        self.backoff.failures(),
                        e,
                        delay
                    );
                    sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One pass over `[head - rescan_depth, head]`
    pub async fn scan_once(&mut self) -> MonitorResult<ScanSummary> {
        let head = self.chain.block_number().await?;
        let mut summary = ScanSummary {
            head,
            ..ScanSummary::default()
        };

        for number in head.saturating_sub(self.rescan_depth)..=head {
            let Some(block) = self.chain.block_with_transactions(number).await? else {
                debug!("Block {} not available yet", number);
                continue;
            };
            summary.blocks_scanned += 1;

            for tx in block.contract_creations() {
                summary.creations_seen += 1;
                if self.inspect_creation(tx, number).await {
                    summary.candidates_added += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Classify one deployment; returns whether a candidate was added.
    /// Failures are logged and the transaction skipped.
    async fn inspect_creation(&mut self, tx: &TransactionView, block: u64) -> bool {
        if self.skip_seen && self.seen_creations.contains(&tx.hash) {
            return false;
        }

        let address = match self.chain.created_contract(tx.hash).await {
            Ok(Some(address)) => address,
            Ok(None) => {
                debug!("No contract address in receipt for {}", tx.hash);
                return false;
            }
            Err(e) => {
                warn!("Failed to fetch receipt for {}: {}", tx.hash, e);
                return false;
            }
        };

        let classification = match self.classifier.classify(address).await {
            Ok(classification) => classification,
            Err(e) => {
                warn!("Could not probe {} (tx {}): {}", address, tx.hash, e);
                return false;
            }
        };
        self.remember(tx.hash);

        match classification {
            Classification::Token { name, symbol } => {
                let candidate = TokenCandidate {
                    address,
                    discovered_at_block: block,
                    name,
                    symbol,
                };
                info!("🆕 New token detected: {}", candidate);
                let added = self.watchlist.push(candidate);
                if !added {
                    debug!("{} already has confirmed liquidity", address);
                }
                added
            }
            Classification::NotToken { reason } => {
                debug!("Skipping {} deployed in {}: {}", address, tx.hash, reason);
                false
            }
        }
    }

    /// Record a definitively classified deployment
    fn remember(&mut self, hash: B256) {
        if !self.skip_seen {
            return;
        }

        if !self.seen_creations.insert(hash) {
            return;
        }
        self.seen_order.push_back(hash);

        // Evict the oldest ~10% when full; overlapping windows only need recent hashes
        if self.seen_order.len() > SEEN_CACHE_SIZE {
            for old in self.seen_order.drain(..SEEN_CACHE_SIZE / 10) {
                self.seen_creations.remove(&old);
            }
        }
    }
}
