pub mod anti_patterns;
pub mod collaboration;
pub mod entropy;
pub mod recommend;
pub mod scorer;
pub mod stats;
pub mod velocity;

use crate::error::{HealthError, Result};
use crate::types::activity::ActivitySet;
use crate::types::config::EngineConfig;
use crate::types::report::{MetricKind, MetricResult};
use crate::types::scoring::ScoreCard;
use std::thread::{self, ScopedJoinHandle};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct MetricSet {
    pub entropy: MetricResult,
    pub velocity: MetricResult,
    pub collaboration: MetricResult,
    pub anti_patterns: MetricResult,
}

impl MetricSet {
    /// Low-confidence defaults used when the snapshot is too thin to measure.
    pub fn neutral() -> Self {
        const NOTE: &str = "insufficient activity history; neutral default";
        Self {
            entropy: MetricResult::new(MetricKind::Entropy, 0.0)
                .as_fallback()
                .with_note(NOTE),
            velocity: MetricResult::new(MetricKind::Velocity, 0.5)
                .as_fallback()
                .with_note(NOTE),
            collaboration: MetricResult::new(MetricKind::Collaboration, 0.5)
                .as_fallback()
                .with_note(NOTE),
            anti_patterns: MetricResult::new(MetricKind::AntiPatterns, 0.0)
                .as_fallback()
                .with_note(NOTE),
        }
    }

    pub fn get(&self, kind: MetricKind) -> &MetricResult {
        match kind {
            MetricKind::Entropy => &self.entropy,
            MetricKind::Velocity => &self.velocity,
            MetricKind::Collaboration => &self.collaboration,
            MetricKind::AntiPatterns => &self.anti_patterns,
        }
    }

    pub fn card(&self) -> ScoreCard {
        ScoreCard::new(
            self.entropy.value,
            self.velocity.value,
            self.collaboration.value,
            self.anti_patterns.value,
        )
    }
}

/// Runs the four extractors concurrently over the same read-only snapshot
/// and waits for all of them.
pub fn extract_metrics(set: &ActivitySet, config: &EngineConfig) -> Result<MetricSet> {
    if set.insufficient_data {
        debug!(repository = %set.repository, "using neutral metrics");
        return Ok(MetricSet::neutral());
    }

    thread::scope(|scope| {
        let entropy = scope.spawn(|| entropy::entropy_score(set, &config.entropy));
        let velocity = scope.spawn(|| velocity::velocity_score(set, &config.velocity));
        let collaboration =
            scope.spawn(|| collaboration::collaboration_score(set, &config.collaboration));
        let anti_patterns =
            scope.spawn(|| anti_patterns::anti_pattern_score(set, &config.anti_patterns));

        let entropy = join(entropy, MetricKind::Entropy);
        let velocity = join(velocity, MetricKind::Velocity);
        let collaboration = join(collaboration, MetricKind::Collaboration);
        let anti_patterns = join(anti_patterns, MetricKind::AntiPatterns);

        Ok(MetricSet {
            entropy: entropy?,
            velocity: velocity?,
            collaboration: collaboration?,
            anti_patterns: anti_patterns?,
        })
    })
}

fn join(handle: ScopedJoinHandle<'_, MetricResult>, kind: MetricKind) -> Result<MetricResult> {
    let result = handle
        .join()
        .map_err(|_| HealthError::ExtractorFailed(kind))?;
    debug!(metric = kind.symbol(), value = result.value, "extractor finished");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::activity::{Commit, RepoMetadata};
    use chrono::{Duration, TimeZone, Utc};

    fn activity(insufficient_data: bool) -> ActivitySet {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let commits = (0..40)
            .map(|i| Commit {
                sha: format!("{i:04}"),
                author: ["ann", "bob"][i % 2].to_string(),
                author_login: None,
                date: start + Duration::days(i as i64 * 3),
                message: String::new(),
                files_changed: 1,
                additions: 20,
                deletions: 4,
            })
            .collect::<Vec<_>>();
        ActivitySet {
            repository: "acme/widgets".to_string(),
            metadata: RepoMetadata::default(),
            window_start: start,
            window_end: start + Duration::days(120),
            commits,
            pull_requests: Vec::new(),
            issues: Vec::new(),
            contributors: Vec::new(),
            branches: Vec::new(),
            dropped_count: 0,
            insufficient_data,
        }
    }

    #[test]
    fn parallel_extraction_matches_sequential_extraction() {
        let set = activity(false);
        let config = EngineConfig::default();
        let parallel = extract_metrics(&set, &config).expect("extraction should succeed");

        assert_eq!(parallel.entropy, entropy::entropy_score(&set, &config.entropy));
        assert_eq!(parallel.velocity, velocity::velocity_score(&set, &config.velocity));
        assert_eq!(
            parallel.collaboration,
            collaboration::collaboration_score(&set, &config.collaboration)
        );
        assert_eq!(
            parallel.anti_patterns,
            anti_patterns::anti_pattern_score(&set, &config.anti_patterns)
        );
    }

    #[test]
    fn insufficient_data_short_circuits_to_neutral_values() {
        let metrics = extract_metrics(&activity(true), &EngineConfig::default())
            .expect("extraction should succeed");
        assert_eq!(metrics, MetricSet::neutral());
        assert_eq!(metrics.entropy.value, 0.0);
        assert!(metrics.collaboration.fallback);
    }

    #[test]
    fn every_metric_is_in_unit_range() {
        let metrics = extract_metrics(&activity(false), &EngineConfig::default())
            .expect("extraction should succeed");
        for kind in MetricKind::ALL {
            let value = metrics.get(kind).value;
            assert!((0.0..=1.0).contains(&value), "{kind} out of range: {value}");
        }
    }
}
