use super::stats::normalized_entropy;
use crate::types::activity::ActivitySet;
use crate::types::config::EntropyConfig;
use crate::types::report::{MetricKind, MetricResult};
use chrono::Duration;
use std::collections::BTreeMap;

pub const TIME_ENTROPY: &str = "time_entropy";
pub const AUTHOR_ENTROPY: &str = "author_entropy";

pub fn entropy_score(set: &ActivitySet, config: &EntropyConfig) -> MetricResult {
    if set.commits.is_empty() {
        return MetricResult::new(MetricKind::Entropy, 0.0)
            .with_detail(TIME_ENTROPY, 0.0)
            .with_detail(AUTHOR_ENTROPY, 0.0)
            .with_note("no commits in the activity window");
    }

    let buckets = time_buckets(set, config.bucket_days);
    let authors = author_counts(set);
    let time = normalized_entropy(&buckets);
    let author = normalized_entropy(&authors);
    let value = config.time_weight * time + config.author_weight * author;

    MetricResult::new(MetricKind::Entropy, value)
        .with_detail(TIME_ENTROPY, time)
        .with_detail(AUTHOR_ENTROPY, author)
        .with_detail("buckets", buckets.len() as f64)
        .with_detail("authors", authors.len() as f64)
}

/// Commit counts per fixed-width bucket from the first delivery to the
/// window end, empty buckets included.
fn time_buckets(set: &ActivitySet, bucket_days: u32) -> Vec<u64> {
    let width = Duration::days(i64::from(bucket_days.max(1))).num_seconds();
    let start = set.delivery_start();
    let span = (set.window_end - start).num_seconds().max(0);
    let bucket_count = ((span + width - 1) / width).max(1) as usize;

    let mut counts = vec![0u64; bucket_count];
    for commit in &set.commits {
        let offset = (commit.date - start).num_seconds().clamp(0, span);
        let index = ((offset / width) as usize).min(bucket_count - 1);
        counts[index] += 1;
    }
    counts
}

fn author_counts(set: &ActivitySet) -> Vec<u64> {
    let mut per_author = BTreeMap::<&str, u64>::new();
    for commit in &set.commits {
        *per_author.entry(commit.actor()).or_default() += 1;
    }
    per_author.into_values().collect()
}
