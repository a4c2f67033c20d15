//! Engine facade: normalize, extract, score, advise.
//!
//! An [`Engine`] holds a validated [`EngineConfig`] and nothing else, so one
//! instance can serve any number of concurrent `analyze` calls.

use crate::analyze::{self, recommend, scorer};
use crate::error::Result;
use crate::normalize;
use crate::types::activity::ActivitySet;
use crate::types::bundle::RawBundle;
use crate::types::config::EngineConfig;
use crate::types::report::{Confidence, MetricKind, ScoreResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

pub const ENGINE_NAME: &str = "repo-health";

#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
}

/// Static description of what this build can compute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub weights_version: String,
    pub threshold: f64,
    pub metrics: Vec<MetricInfo>,
    pub capabilities: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricInfo {
    pub symbol: &'static str,
    pub name: &'static str,
    pub weight: f64,
}

impl Engine {
    /// Rejects invalid configuration before any analysis can run.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn analyze(&self, bundle: &RawBundle, now: DateTime<Utc>) -> Result<ScoreResult> {
        let set = normalize::normalize(bundle, &self.config.normalizer, now)?;
        self.analyze_activity(&set)
    }

    pub fn analyze_activity(&self, set: &ActivitySet) -> Result<ScoreResult> {
        let metrics = analyze::extract_metrics(set, &self.config)?;
        let composite = scorer::composite(&metrics, &self.config.scoring);
        let recommendations =
            recommend::recommend(&metrics, set.insufficient_data, &self.config);

        let confidence = if set.insufficient_data {
            warn!(
                repository = %set.repository,
                "insufficient activity; reporting low-confidence result"
            );
            Confidence::Low
        } else {
            Confidence::Full
        };

        info!(
            repository = %set.repository,
            score = composite.score,
            classification = %composite.classification,
            recommendations = recommendations.len(),
            "analysis complete"
        );

        Ok(ScoreResult {
            repository: set.repository.clone(),
            classification: composite.classification,
            score: composite.score,
            threshold: self.config.scoring.threshold,
            entropy: metrics.entropy,
            velocity: metrics.velocity,
            collaboration: metrics.collaboration,
            anti_patterns: metrics.anti_patterns,
            recommendations,
            demo_mode: set.insufficient_data,
            confidence,
            weights_version: self.config.scoring.weights.version.clone(),
            dropped_records: set.dropped_count,
        })
    }

    pub fn info(&self) -> EngineInfo {
        let weights = self.config.scoring.weights.as_array();
        EngineInfo {
            name: ENGINE_NAME,
            version: env!("CARGO_PKG_VERSION"),
            weights_version: self.config.scoring.weights.version.clone(),
            threshold: self.config.scoring.threshold,
            metrics: MetricKind::ALL
                .iter()
                .zip(weights)
                .map(|(kind, weight)| MetricInfo {
                    symbol: kind.symbol(),
                    name: kind.label(),
                    weight,
                })
                .collect(),
            capabilities: vec![
                "commit_entropy",
                "delivery_velocity",
                "collaboration_density",
                "anti_pattern_detection",
                "recommendations",
                "degraded_mode",
            ],
        }
    }
}
