//! Progress counters reported by aggregators.
//!
//! The counters are purely informational: nothing in the counting or merging
//! logic reads them back.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters maintained by [`LocalAggregator`](crate::LocalAggregator).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TokenCounter {
    /// Distinct tokens emitted, one per flushed record.
    NumTokens,
    /// Sum of all flushed counts, i.e. token occurrences.
    CountSum,
}

impl TokenCounter {
    pub const ALL: [TokenCounter; 2] = [TokenCounter::NumTokens, TokenCounter::CountSum];

    pub fn name(self) -> &'static str {
        match self {
            TokenCounter::NumTokens => "NUM_TOKENS",
            TokenCounter::CountSum => "COUNT_SUM",
        }
    }
}

impl fmt::Display for TokenCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Receives counter increments.
pub trait MetricsSink: Send + Sync {
    fn increment(&self, counter: TokenCounter, by: u64);
}

/// Discards every increment.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn increment(&self, _counter: TokenCounter, _by: u64) {}
}

/// Job-wide counters, safe to share between partitions running in parallel.
#[derive(Debug, Default)]
pub struct Counters {
    num_tokens: AtomicU64,
    count_sum: AtomicU64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, counter: TokenCounter) -> &AtomicU64 {
        match counter {
            TokenCounter::NumTokens => &self.num_tokens,
            TokenCounter::CountSum => &self.count_sum,
        }
    }

    /// Current value of `counter`.
    pub fn get(&self, counter: TokenCounter) -> u64 {
        self.slot(counter).load(Ordering::Relaxed)
    }

    /// All counters with their current values.
    pub fn snapshot(&self) -> Vec<(TokenCounter, u64)> {
        TokenCounter::ALL
            .iter()
            .map(|&counter| (counter, self.get(counter)))
            .collect()
    }
}

impl MetricsSink for Counters {
    fn increment(&self, counter: TokenCounter, by: u64) {
        // Saturates at u64::MAX.
        let _ = self
            .slot(counter)
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
                Some(v.saturating_add(by))
            });
    }
}
