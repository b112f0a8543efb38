use crate::detection::{PairInspector, PairStatus, TokenClassifier};
use crate::monitor::backoff::Backoff;
use crate::monitor::chain::ChainReader;
use crate::monitor::error::{MonitorError, MonitorResult};
use crate::monitor::watchlist::Watchlist;
use crate::types::{LiquidityReport, MonitorConfig, TokenCandidate};
use alloy::primitives::Address;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Counters for one pass over the watchlist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiquidityPass {
    pub candidates_checked: usize,
    pub pair_queries: usize,
    pub failed_queries: usize,
    pub confirmed: usize,
}

impl LiquidityPass {
    /// Every query failed, which points at the node rather than the tokens
    pub fn all_failed(&self) -> bool {
        self.pair_queries > 0 && self.failed_queries == self.pair_queries
    }
}

/// Polls the factory for pairs between watched candidates and the reference
/// tokens, reporting and dropping candidates once a pair holds them
pub struct LiquidityWorker {
    inspector: PairInspector,
    classifier: TokenClassifier,
    watchlist: Watchlist,
    reference_tokens: Vec<Address>,
    poll_interval: Duration,
    backoff: Backoff,
    report_sender: mpsc::UnboundedSender<LiquidityReport>,
}

impl LiquidityWorker {
    pub fn new(
        config: &MonitorConfig,
        chain: Arc<dyn ChainReader>,
        watchlist: Watchlist,
        report_sender: mpsc::UnboundedSender<LiquidityReport>,
    ) -> Self {
        Self {
            inspector: PairInspector::new(Arc::clone(&chain), config.factory_address),
            classifier: TokenClassifier::new(chain),
            watchlist,
            reference_tokens: config.reference_tokens.clone(),
            poll_interval: config.poll_interval,
            backoff: Backoff::new(config.backoff_base, config.backoff_max),
            report_sender,
        }
    }

    pub async fn run(mut self) -> MonitorResult<()> {
        info!(
            "Liquidity worker started (factory {}, {} reference token(s))",
            self.inspector.factory(),
            self.reference_tokens.len()
        );

        loop {
            if self.watchlist.is_empty() {
                sleep(self.poll_interval).await;
                continue;
            }

            let pass = self.check_once().await?;
            if pass.all_failed() {
                let delay = self.backoff.next_delay();
                warn!(
                    "All {} pair queries failed (attempt {}) - retrying in {:?}",
                    pass.pair_queries,
                    self.backoff.failures(),
                    delay
                );
                sleep(delay).await;
            } else {
                debug!("Liquidity pass complete: {:?}", pass);
                self.backoff.reset();
                sleep(self.poll_interval).await;
            }
        }
    }

    /// Check every watched candidate once
    pub async fn check_once(&self) -> MonitorResult<LiquidityPass> {
        let mut pass = LiquidityPass::default();

        for candidate in self.watchlist.snapshot() {
            pass.candidates_checked += 1;
            if self.check_candidate(&candidate, &mut pass).await? {
                pass.confirmed += 1;
            }
        }

        Ok(pass)
    }

    /// Returns whether this call confirmed and reported the candidate
    async fn check_candidate(
        &self,
        candidate: &TokenCandidate,
        pass: &mut LiquidityPass,
    ) -> MonitorResult<bool> {
        let token = candidate.address;

        for &reference in &self.reference_tokens {
            if reference == token {
                continue;
            }

            pass.pair_queries += 1;
            let (pair, token_reserve, reference_reserve) =
                match self.inspector.inspect(token, reference).await {
                    Ok(PairStatus::Funded {
                        pair,
                        token_reserve,
                        reference_reserve,
                    }) => (pair, token_reserve, reference_reserve),
                    Ok(status) => {
                        debug!("{} / {}: {:?}", candidate.checksum_address(), reference, status);
                        continue;
                    }
                    Err(e) => {
                        pass.failed_queries += 1;
                        warn!(
                            "Pair query failed for {} / {}: {}",
                            candidate.checksum_address(),
                            reference,
                            e
                        );
                        continue;
                    }
                };

            let token_name = match self.classifier.name(token).await {
                Ok(name) => name,
                Err(e) => {
                    warn!("Failed to re-read name of {}: {}", candidate.checksum_address(), e);
                    continue;
                }
            };

            // Another pass may have confirmed it while we were querying
            if self.watchlist.confirm(token) == 0 {
                debug!("{} already confirmed", candidate.checksum_address());
                return Ok(false);
            }

            let report = LiquidityReport {
                token_name,
                token,
                reference,
                pair,
                token_reserve,
                reference_reserve,
                discovered_at_block: candidate.discovered_at_block,
            };
            if self.report_sender.send(report).is_err() {
                // Nobody heard about it, so it is not confirmed yet
                self.watchlist.reinstate(candidate.clone());
                return Err(MonitorError::ChannelError);
            }
            info!(
                "🎯 Liquidity confirmed for {} via pair {} (reserves {} / {})",
                candidate, pair, token_reserve, reference_reserve
            );
            return Ok(true);
        }

        Ok(false)
    }
}
