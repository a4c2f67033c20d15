use crate::engine::EngineInfo;
use crate::types::report::{Classification, Confidence, MetricResult, ScoreResult};
use crate::types::scoring::Score;
use serde::Serialize;

/// Wire shape of one analysis result. Key names are part of the output
/// contract consumed by dashboards and CI gates.
#[derive(Debug, Serialize)]
pub struct ResultDocument<'a> {
    pub repository: &'a str,
    pub classification: Classification,
    #[serde(rename = "M_score")]
    pub m_score: Score,
    pub threshold: Score,
    pub metrics: PerMetric<Score>,
    pub recommendations: Vec<&'a str>,
    pub demo_mode: bool,
    pub confidence: Confidence,
    pub weights_version: &'a str,
    pub dropped_records: usize,
    pub details: PerMetric<&'a MetricResult>,
}

#[derive(Debug, Serialize)]
pub struct PerMetric<T> {
    #[serde(rename = "H")]
    pub entropy: T,
    #[serde(rename = "V")]
    pub velocity: T,
    #[serde(rename = "C")]
    pub collaboration: T,
    #[serde(rename = "A")]
    pub anti_patterns: T,
}

impl<'a> From<&'a ScoreResult> for ResultDocument<'a> {
    fn from(result: &'a ScoreResult) -> Self {
        Self {
            repository: &result.repository,
            classification: result.classification,
            m_score: result.score,
            threshold: result.threshold,
            metrics: PerMetric {
                entropy: result.entropy.value,
                velocity: result.velocity.value,
                collaboration: result.collaboration.value,
                anti_patterns: result.anti_patterns.value,
            },
            recommendations: result.recommendation_messages(),
            demo_mode: result.demo_mode,
            confidence: result.confidence,
            weights_version: &result.weights_version,
            dropped_records: result.dropped_records,
            details: PerMetric {
                entropy: &result.entropy,
                velocity: &result.velocity,
                collaboration: &result.collaboration,
                anti_patterns: &result.anti_patterns,
            },
        }
    }
}

pub fn to_json(result: &ScoreResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&ResultDocument::from(result))
}

pub fn batch_to_json(results: &[ScoreResult]) -> Result<String, serde_json::Error> {
    let documents = results.iter().map(ResultDocument::from).collect::<Vec<_>>();
    serde_json::to_string_pretty(&documents)
}

pub fn info_to_json(info: &EngineInfo) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::report::{MetricKind, Recommendation};
    use serde_json::Value;

    fn result() -> ScoreResult {
        ScoreResult {
            repository: "acme/widgets".to_string(),
            classification: Classification::NeedsAttention,
            score: 0.55,
            threshold: 0.7,
            entropy: MetricResult::new(MetricKind::Entropy, 0.8).with_detail("time_entropy", 0.9),
            velocity: MetricResult::new(MetricKind::Velocity, 0.5),
            collaboration: MetricResult::new(MetricKind::Collaboration, 0.2).as_fallback(),
            anti_patterns: MetricResult::new(MetricKind::AntiPatterns, 0.4),
            recommendations: vec![Recommendation {
                metric: Some(MetricKind::Collaboration),
                message: "Increase PR review coverage".to_string(),
                gap: 0.3,
            }],
            demo_mode: false,
            confidence: Confidence::Full,
            weights_version: "v1".to_string(),
            dropped_records: 2,
        }
    }

    #[test]
    fn json_document_uses_contract_keys() {
        let rendered = to_json(&result()).expect("json should serialize");
        let value: Value = serde_json::from_str(&rendered).expect("output should be json");

        assert_eq!(value["repository"], "acme/widgets");
        assert_eq!(value["classification"], "NEEDS_ATTENTION");
        assert_eq!(value["M_score"], 0.55);
        assert_eq!(value["threshold"], 0.7);
        assert_eq!(value["metrics"]["H"], 0.8);
        assert_eq!(value["metrics"]["A"], 0.4);
        assert_eq!(value["recommendations"][0], "Increase PR review coverage");
        assert_eq!(value["demo_mode"], false);
        assert_eq!(value["confidence"], "full");
        assert_eq!(value["weights_version"], "v1");
        assert_eq!(value["dropped_records"], 2);
    }

    #[test]
    fn details_carry_breakdown_and_fallback_flag() {
        let rendered = to_json(&result()).expect("json should serialize");
        let value: Value = serde_json::from_str(&rendered).expect("output should be json");

        assert_eq!(value["details"]["H"]["breakdown"]["time_entropy"], 0.9);
        assert_eq!(value["details"]["C"]["fallback"], true);
        assert!(value["details"]["V"].get("notes").is_none());
    }
}
