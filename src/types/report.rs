use crate::types::scoring::Score;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricKind {
    Entropy,
    Velocity,
    Collaboration,
    AntiPatterns,
}

impl MetricKind {
    pub const ALL: [MetricKind; 4] = [
        MetricKind::Entropy,
        MetricKind::Velocity,
        MetricKind::Collaboration,
        MetricKind::AntiPatterns,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            MetricKind::Entropy => "H",
            MetricKind::Velocity => "V",
            MetricKind::Collaboration => "C",
            MetricKind::AntiPatterns => "A",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MetricKind::Entropy => "Commit Entropy",
            MetricKind::Velocity => "Velocity",
            MetricKind::Collaboration => "Collaboration",
            MetricKind::AntiPatterns => "Anti-patterns",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.symbol())
    }
}

/// A named scalar in [0, 1] plus the sub-signals that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricResult {
    #[serde(skip)]
    pub kind: MetricKind,
    pub value: Score,
    pub breakdown: BTreeMap<String, Score>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    pub fallback: bool,
}

impl MetricResult {
    pub fn new(kind: MetricKind, value: Score) -> Self {
        Self {
            kind,
            value: clamp_unit(value),
            breakdown: BTreeMap::new(),
            notes: Vec::new(),
            fallback: false,
        }
    }

    pub fn with_detail(mut self, name: &str, value: Score) -> Self {
        let value = if value.is_finite() { value } else { 0.0 };
        self.breakdown.insert(name.to_string(), value);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn as_fallback(mut self) -> Self {
        self.fallback = true;
        self
    }

    pub fn detail(&self, name: &str) -> Option<Score> {
        self.breakdown.get(name).copied()
    }
}

/// Clamps into [0, 1]; NaN collapses to 0.
pub fn clamp_unit(value: Score) -> Score {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    Healthy,
    NeedsAttention,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Healthy => write!(f, "HEALTHY"),
            Classification::NeedsAttention => write!(f, "NEEDS_ATTENTION"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Full,
    Low,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub metric: Option<MetricKind>,
    pub message: String,
    pub gap: Score,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    pub repository: String,
    pub classification: Classification,
    pub score: Score,
    pub threshold: Score,
    pub entropy: MetricResult,
    pub velocity: MetricResult,
    pub collaboration: MetricResult,
    pub anti_patterns: MetricResult,
    pub recommendations: Vec<Recommendation>,
    pub demo_mode: bool,
    pub confidence: Confidence,
    pub weights_version: String,
    pub dropped_records: usize,
}

impl ScoreResult {
    pub fn metrics(&self) -> [&MetricResult; 4] {
        [
            &self.entropy,
            &self.velocity,
            &self.collaboration,
            &self.anti_patterns,
        ]
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self.classification, Classification::Healthy)
    }

    pub fn recommendation_messages(&self) -> Vec<&str> {
        self.recommendations
            .iter()
            .map(|recommendation| recommendation.message.as_str())
            .collect()
    }
}
