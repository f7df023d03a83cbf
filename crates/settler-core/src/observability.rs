//! Counters for the scheduler. Exposed as a serializable snapshot.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementCounts {
    pub firings: u64,
    pub rearms: u64,
    pub rearm_failures: u64,
    pub aborted: u64,
    pub unauthorized: u64,
    pub settlements_broadcast: u64,
    pub fallbacks_broadcast: u64,
    pub broadcast_failures: u64,
}

/// Lock-free tallies behind [`SettlementCounts`].
#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub firings: AtomicU64,
    pub rearms: AtomicU64,
    pub rearm_failures: AtomicU64,
    pub aborted: AtomicU64,
    pub unauthorized: AtomicU64,
    pub settlements_broadcast: AtomicU64,
    pub fallbacks_broadcast: AtomicU64,
    pub broadcast_failures: AtomicU64,
}

impl Counters {
    pub fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SettlementCounts {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        SettlementCounts {
            firings: load(&self.firings),
            rearms: load(&self.rearms),
            rearm_failures: load(&self.rearm_failures),
            aborted: load(&self.aborted),
            unauthorized: load(&self.unauthorized),
            settlements_broadcast: load(&self.settlements_broadcast),
            fallbacks_broadcast: load(&self.fallbacks_broadcast),
            broadcast_failures: load(&self.broadcast_failures),
        }
    }
}
