//! Summing partial counts.
//!
//! One reduction serves two roles: as the combiner, shrinking map output
//! before the shuffle, and as the reducer producing the final totals. Since
//! addition is associative and commutative, merging any subset first and then
//! merging the results gives the same total as merging everything at once.

use itertools::Itertools;

use crate::{Error, FinalCount, PartialCount, Result, Token};

/// Sums `counts` in a 64-bit accumulator. Overflow is an error, never a wrap.
pub fn sum_counts<I>(token: &str, counts: I) -> Result<u64>
where
    I: IntoIterator<Item = u64>,
{
    counts.into_iter().try_fold(0u64, |acc, count| {
        acc.checked_add(count)
            .ok_or_else(|| Error::CountOverflow(token.to_string()))
    })
}

/// Merges all partial counts of `token` into its final count.
pub fn merge<I>(token: impl Into<Token>, partial_counts: I) -> Result<FinalCount>
where
    I: IntoIterator<Item = u64>,
{
    let token = token.into();
    let count = sum_counts(&token, partial_counts)?;
    Ok(FinalCount { token, count })
}

/// Groups records that are already sorted by token and merges each group.
///
/// Each token is copied once per group, not once per record.
pub fn merge_sorted(sorted: &[PartialCount]) -> Result<Vec<FinalCount>> {
    let mut merged = Vec::new();
    for (token, group) in &sorted.iter().chunk_by(|&p| p.token.as_str()) {
        merged.push(merge(token, group.map(|p| p.count))?);
    }
    Ok(merged)
}

/// The combiner: merges any mix of partial counts into one record per token.
///
/// The output is valid combiner input again.
pub fn combine<I>(partials: I) -> Result<Vec<PartialCount>>
where
    I: IntoIterator<Item = PartialCount>,
{
    let mut partials: Vec<PartialCount> = partials.into_iter().collect();
    partials.sort_unstable_by(|a, b| a.token.cmp(&b.token));
    Ok(merge_sorted(&partials)?
        .into_iter()
        .map(PartialCount::from)
        .collect())
}

impl From<FinalCount> for PartialCount {
    fn from(total: FinalCount) -> Self {
        PartialCount {
            token: total.token,
            count: total.count,
        }
    }
}
