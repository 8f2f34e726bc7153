//! Per-partition token counting.
//!
//! A [`LocalAggregator`] owns the frequency multiset of exactly one
//! partition. Records are tokenized and counted in memory, so a flush emits
//! at most one [`PartialCount`] per distinct token instead of one record per
//! occurrence.

use fnv::FnvHashMap;
use tracing::trace;

use crate::metrics::{MetricsSink, TokenCounter};
use crate::tokenizer::Tokenizer;
use crate::{Error, PartialCount, Result, Token};

/// Counts tokens for a single partition.
///
/// [`flush`](LocalAggregator::flush) consumes the aggregator, so a multiset
/// can never leak into the next partition. Dropping an aggregator without
/// flushing it discards everything counted so far.
pub struct LocalAggregator<'a> {
    tokenizer: &'a dyn Tokenizer,
    metrics: &'a dyn MetricsSink,
    counts: FnvHashMap<Token, u64>,
    total: u64,
}

impl<'a> LocalAggregator<'a> {
    pub fn new(tokenizer: &'a dyn Tokenizer, metrics: &'a dyn MetricsSink) -> Self {
        Self {
            tokenizer,
            metrics,
            counts: FnvHashMap::default(),
            total: 0,
        }
    }

    /// Tokenizes `record` and counts every token once.
    pub fn ingest(&mut self, record: &str) -> Result<()> {
        for token in self.tokenizer.tokenize(record) {
            self.total = self
                .total
                .checked_add(1)
                .ok_or_else(|| Error::CountOverflow(token.clone()))?;
            match self.counts.get_mut(token.as_str()) {
                Some(count) => {
                    *count = count
                        .checked_add(1)
                        .ok_or_else(|| Error::CountOverflow(token.clone()))?;
                }
                None => {
                    self.counts.insert(token, 1);
                }
            }
        }
        Ok(())
    }

    /// Emits one partial count per distinct token and reports the
    /// [`TokenCounter`]s for this partition.
    pub fn flush(self) -> Result<Vec<PartialCount>> {
        let distinct = self.counts.len() as u64;
        self.metrics.increment(TokenCounter::CountSum, self.total);

        let partials: Vec<PartialCount> = self
            .counts
            .into_iter()
            .map(|(token, count)| PartialCount { token, count })
            .collect();
        self.metrics.increment(TokenCounter::NumTokens, distinct);

        trace!(distinct, total = self.total, "flushed partition");
        Ok(partials)
    }

    /// Occurrences of `token` counted so far; zero if never seen.
    pub fn count(&self, token: &str) -> u64 {
        self.counts.get(token).copied().unwrap_or(0)
    }

    /// Number of distinct tokens held.
    pub fn distinct_tokens(&self) -> usize {
        self.counts.len()
    }

    /// Number of token occurrences counted, across all tokens.
    pub fn total_occurrences(&self) -> u64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{Counters, NoopMetrics};
    use crate::tokenizer::{StandardTokenizer, WhitespaceTokenizer, WordsTokenizer};
    use std::collections::{BTreeMap, HashSet};

    fn as_map(partials: &[PartialCount]) -> BTreeMap<&str, u64> {
        partials.iter().map(|p| (p.token(), p.count)).collect()
    }

    #[test]
    fn counts_the_cat_sentence() {
        let counters = Counters::new();
        let mut agg = LocalAggregator::new(&WhitespaceTokenizer, &counters);
        agg.ingest("the cat sat on the mat the cat ran").unwrap();

        assert_eq!(3, agg.count("the"));
        assert_eq!(0, agg.count("dog"));
        assert_eq!(6, agg.distinct_tokens());
        assert_eq!(9, agg.total_occurrences());

        let partials = agg.flush().unwrap();
        let expected: BTreeMap<&str, u64> = [
            ("the", 3),
            ("cat", 2),
            ("sat", 1),
            ("on", 1),
            ("mat", 1),
            ("ran", 1),
        ]
        .into_iter()
        .collect();
        assert_eq!(6, partials.len());
        assert_eq!(expected, as_map(&partials));
        assert_eq!(9, partials.iter().map(|p| p.count).sum::<u64>());

        assert_eq!(6, counters.get(TokenCounter::NumTokens));
        assert_eq!(9, counters.get(TokenCounter::CountSum));
    }

    #[test]
    fn counts_accumulate_across_records() {
        let mut agg = LocalAggregator::new(&WhitespaceTokenizer, &NoopMetrics);
        agg.ingest("the cat").unwrap();
        agg.ingest("the the dog").unwrap();

        let partials = agg.flush().unwrap();
        let map = as_map(&partials);
        assert_eq!(Some(&3), map.get("the"));
        assert_eq!(Some(&1), map.get("cat"));
        assert_eq!(Some(&1), map.get("dog"));
    }

    #[test]
    fn flush_never_repeats_a_token() {
        let mut agg = LocalAggregator::new(&StandardTokenizer, &NoopMetrics);
        for _ in 0..50 {
            agg.ingest("a b, a; c a. b").unwrap();
        }
        let partials = agg.flush().unwrap();
        let distinct: HashSet<&str> = partials.iter().map(|p| p.token()).collect();
        assert_eq!(partials.len(), distinct.len());
        assert!(partials.iter().all(|p| p.count >= 1));
    }

    #[test]
    fn conservation_holds_for_every_tokenizer() {
        let records = [
            "It's a truth universally acknowledged,",
            "that a single man in possession of a good fortune,",
            "must be in want of a wife.  IT'S",
        ];
        let tokenizers: [&dyn Tokenizer; 3] =
            [&StandardTokenizer, &WhitespaceTokenizer, &WordsTokenizer];

        let mut outputs = Vec::new();
        for tokenizer in tokenizers {
            let produced: usize = records.iter().map(|r| tokenizer.tokenize(r).len()).sum();

            let counters = Counters::new();
            let mut agg = LocalAggregator::new(tokenizer, &counters);
            for record in records {
                agg.ingest(record).unwrap();
            }
            let partials = agg.flush().unwrap();

            let sum: u64 = partials.iter().map(|p| p.count).sum();
            assert_eq!(produced as u64, sum);
            assert_eq!(sum, counters.get(TokenCounter::CountSum));
            assert_eq!(partials.len() as u64, counters.get(TokenCounter::NumTokens));
            let owned: BTreeMap<String, u64> = partials
                .iter()
                .map(|p| (p.token.clone(), p.count))
                .collect();
            outputs.push(owned);
        }

        // Same text, different token boundaries.
        assert_ne!(outputs[0], outputs[1]);
        assert_ne!(outputs[0], outputs[2]);
        assert_ne!(outputs[1], outputs[2]);
    }

    #[test]
    fn empty_partition_flushes_nothing() {
        let counters = Counters::new();
        let agg = LocalAggregator::new(&StandardTokenizer, &counters);
        assert!(agg.is_empty());

        let partials = agg.flush().unwrap();
        assert!(partials.is_empty());
        assert_eq!(0, counters.get(TokenCounter::NumTokens));
        assert_eq!(0, counters.get(TokenCounter::CountSum));
    }

    #[test]
    fn separator_only_records_count_nothing() {
        let mut agg = LocalAggregator::new(&StandardTokenizer, &NoopMetrics);
        agg.ingest("").unwrap();
        agg.ingest(" ... ").unwrap();
        assert!(agg.is_empty());
        assert_eq!(0, agg.total_occurrences());
    }

    #[test]
    fn dropped_aggregator_reports_nothing() {
        let counters = Counters::new();
        {
            let mut agg = LocalAggregator::new(&WhitespaceTokenizer, &counters);
            agg.ingest("abandoned partition").unwrap();
        }
        assert_eq!(0, counters.get(TokenCounter::CountSum));
    }

    #[test]
    fn tokens_are_case_sensitive() {
        let mut agg = LocalAggregator::new(&WhitespaceTokenizer, &NoopMetrics);
        agg.ingest("The the THE").unwrap();
        assert_eq!(3, agg.distinct_tokens());
    }
}
