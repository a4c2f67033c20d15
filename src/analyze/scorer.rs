use super::MetricSet;
use crate::types::config::ScoringConfig;
use crate::types::report::Classification;
use crate::types::scoring::Score;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Composite {
    pub score: Score,
    pub classification: Classification,
}

pub fn composite(metrics: &MetricSet, config: &ScoringConfig) -> Composite {
    let score = metrics.card().composite(&config.weights);
    Composite {
        score,
        classification: classify(score, config.threshold),
    }
}

pub fn classify(score: Score, threshold: Score) -> Classification {
    if score >= threshold {
        Classification::Healthy
    } else {
        Classification::NeedsAttention
    }
}
