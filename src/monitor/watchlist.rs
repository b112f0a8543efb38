use crate::types::TokenCandidate;
use alloy::primitives::Address;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::error;

/// Candidates awaiting liquidity, shared between the discovery and liquidity
/// workers.
///
/// Entries form a list: the same address may be appended more than once when
/// overlapping scan windows see a deployment again. Readers always work on a
/// [`snapshot`](Watchlist::snapshot), and [`confirm`](Watchlist::confirm)
/// drops every entry for an address at once and keeps it from coming back, so
/// a token is reported a single time.
#[derive(Debug, Clone, Default)]
pub struct Watchlist {
    inner: Arc<Mutex<Entries>>,
}

#[derive(Debug, Default)]
struct Entries {
    candidates: Vec<TokenCandidate>,
    confirmed: HashSet<Address>,
}

impl Watchlist {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("Watchlist lock poisoned; recovering guard state");
                poisoned.into_inner()
            }
        }
    }

    /// Append a candidate. Returns `false` if its liquidity was already
    /// confirmed.
    pub fn push(&self, candidate: TokenCandidate) -> bool {
        let mut entries = self.lock();
        if entries.confirmed.contains(&candidate.address) {
            return false;
        }
        entries.candidates.push(candidate);
        true
    }

    /// Copy of the current entries with one entry per address, in the order
    /// addresses were first appended
    pub fn snapshot(&self) -> Vec<TokenCandidate> {
        let entries = self.lock();
        let mut seen = HashSet::with_capacity(entries.candidates.len());
        entries
            .candidates
            .iter()
            .filter(|c| seen.insert(c.address))
            .cloned()
            .collect()
    }

    /// Drop every entry for `address` and mark it confirmed, returning how
    /// many entries were removed. Zero means another pass got there first.
    pub fn confirm(&self, address: Address) -> usize {
        let mut entries = self.lock();
        let before = entries.candidates.len();
        entries.candidates.retain(|c| c.address != address);
        let removed = before - entries.candidates.len();
        if removed > 0 {
            entries.confirmed.insert(address);
        }
        removed
    }

    /// Undo a confirmation whose report never went out
    pub fn reinstate(&self, candidate: TokenCandidate) {
        let mut entries = self.lock();
        entries.confirmed.remove(&candidate.address);
        entries.candidates.push(candidate);
    }

    pub fn contains(&self, address: Address) -> bool {
        self.lock().candidates.iter().any(|c| c.address == address)
    }

    pub fn is_confirmed(&self, address: Address) -> bool {
        self.lock().confirmed.contains(&address)
    }

    /// Number of entries, duplicates included
    pub fn len(&self) -> usize {
        self.lock().candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().candidates.is_empty()
    }
}
