use crate::error::HealthError;
use crate::types::scoring::{Score, WeightSet};
use serde::Deserialize;

/// Every knob of one analysis run. Values are plain data; callers override a
/// field by building a different config, never by mutating shared state.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scoring: ScoringConfig,
    pub normalizer: NormalizerConfig,
    pub entropy: EntropyConfig,
    pub velocity: VelocityConfig,
    pub collaboration: CollaborationConfig,
    pub anti_patterns: AntiPatternConfig,
    pub recommendations: RecommendationConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub threshold: Score,
    pub weights: WeightSet,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            threshold: 0.7,
            weights: WeightSet::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    pub min_commits: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self { min_commits: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EntropyConfig {
    pub bucket_days: u32,
    pub time_weight: Score,
    pub author_weight: Score,
}

impl Default for EntropyConfig {
    fn default() -> Self {
        Self {
            bucket_days: 7,
            time_weight: 0.5,
            author_weight: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VelocityConfig {
    pub window_weeks: u32,
    pub pace_weight: Score,
    pub trend_weight: Score,
    pub trend_gain: Score,
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            window_weeks: 26,
            pace_weight: 0.6,
            trend_weight: 0.4,
            trend_gain: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CollaborationConfig {
    pub concentration_weight: Score,
    pub review_weight: Score,
    pub fallback_penalty: Score,
}

impl Default for CollaborationConfig {
    fn default() -> Self {
        Self {
            concentration_weight: 0.5,
            review_weight: 0.5,
            fallback_penalty: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AntiPatternConfig {
    pub stale_branch_days: i64,
    pub stale_issue_days: i64,
    pub mega_commit_percentile: Score,
    pub mega_commit_min_lines: u64,
}

impl Default for AntiPatternConfig {
    fn default() -> Self {
        Self {
            stale_branch_days: 90,
            stale_issue_days: 180,
            mega_commit_percentile: 0.95,
            mega_commit_min_lines: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    pub entropy_min: Score,
    pub velocity_min: Score,
    pub collaboration_min: Score,
    pub anti_patterns_max: Score,
    pub max_count: usize,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            entropy_min: 0.6,
            velocity_min: 0.5,
            collaboration_min: 0.5,
            anti_patterns_max: 0.3,
            max_count: 5,
        }
    }
}

const WEIGHT_TOLERANCE: Score = 1e-6;

/// Upper bound for any day-based threshold: one hundred years.
pub const MAX_SPAN_DAYS: i64 = 36_500;

impl EngineConfig {
    pub fn with_threshold(mut self, threshold: Score) -> Self {
        self.scoring.threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<(), HealthError> {
        let threshold = self.scoring.threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(HealthError::Configuration(format!(
                "scoring.threshold must be in (0.0, 1.0] (found {threshold})"
            )));
        }

        let weights = &self.scoring.weights;
        if weights.version.trim().is_empty() {
            return Err(HealthError::Configuration(
                "scoring.weights.version must be non-empty".to_string(),
            ));
        }
        if weights
            .as_array()
            .iter()
            .any(|weight| !(0.0..=1.0).contains(weight))
        {
            return Err(HealthError::Configuration(
                "scoring.weights values must be between 0.0 and 1.0".to_string(),
            ));
        }
        let weight_sum = weights.sum();
        if (weight_sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(HealthError::Configuration(format!(
                "scoring.weights must sum to 1.0 (found {:.3})",
                weight_sum
            )));
        }

        validate_pair(
            "entropy.time_weight",
            self.entropy.time_weight,
            "entropy.author_weight",
            self.entropy.author_weight,
        )?;
        validate_pair(
            "velocity.pace_weight",
            self.velocity.pace_weight,
            "velocity.trend_weight",
            self.velocity.trend_weight,
        )?;
        validate_pair(
            "collaboration.concentration_weight",
            self.collaboration.concentration_weight,
            "collaboration.review_weight",
            self.collaboration.review_weight,
        )?;

        if self.normalizer.min_commits == 0 {
            return Err(HealthError::Configuration(
                "normalizer.min_commits must be greater than 0".to_string(),
            ));
        }
        if !(1..=MAX_SPAN_DAYS).contains(&i64::from(self.entropy.bucket_days)) {
            return Err(HealthError::Configuration(format!(
                "entropy.bucket_days must be between 1 and {MAX_SPAN_DAYS}"
            )));
        }
        if self.velocity.window_weeks == 0 {
            return Err(HealthError::Configuration(
                "velocity.window_weeks must be greater than 0".to_string(),
            ));
        }
        if !(self.velocity.trend_gain.is_finite() && self.velocity.trend_gain > 0.0) {
            return Err(HealthError::Configuration(
                "velocity.trend_gain must be a positive number".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.collaboration.fallback_penalty) {
            return Err(HealthError::Configuration(
                "collaboration.fallback_penalty must be between 0.0 and 1.0".to_string(),
            ));
        }

        let anti = &self.anti_patterns;
        for (name, days) in [
            ("anti_patterns.stale_branch_days", anti.stale_branch_days),
            ("anti_patterns.stale_issue_days", anti.stale_issue_days),
        ] {
            if !(1..=MAX_SPAN_DAYS).contains(&days) {
                return Err(HealthError::Configuration(format!(
                    "{name} must be between 1 and {MAX_SPAN_DAYS} (found {days})"
                )));
            }
        }
        if !(anti.mega_commit_percentile > 0.0 && anti.mega_commit_percentile <= 1.0) {
            return Err(HealthError::Configuration(
                "anti_patterns.mega_commit_percentile must be in (0.0, 1.0]".to_string(),
            ));
        }

        let bands = &self.recommendations;
        for (name, value) in [
            ("recommendations.entropy_min", bands.entropy_min),
            ("recommendations.velocity_min", bands.velocity_min),
            ("recommendations.collaboration_min", bands.collaboration_min),
            ("recommendations.anti_patterns_max", bands.anti_patterns_max),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(HealthError::Configuration(format!(
                    "{name} must be between 0.0 and 1.0"
                )));
            }
        }
        if bands.max_count == 0 {
            return Err(HealthError::Configuration(
                "recommendations.max_count must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_pair(
    left_name: &str,
    left: Score,
    right_name: &str,
    right: Score,
) -> Result<(), HealthError> {
    if !(0.0..=1.0).contains(&left) || !(0.0..=1.0).contains(&right) {
        return Err(HealthError::Configuration(format!(
            "{left_name} and {right_name} must be between 0.0 and 1.0"
        )));
    }
    if (left + right - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(HealthError::Configuration(format!(
            "{left_name} and {right_name} must sum to 1.0 (found {:.3})",
            left + right
        )));
    }
    Ok(())
}
