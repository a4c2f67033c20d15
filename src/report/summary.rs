use crate::engine::EngineInfo;
use crate::types::report::ScoreResult;

const RULE: &str = "============================================================";

pub fn to_summary(result: &ScoreResult) -> String {
    let mut output = String::new();
    output.push_str(RULE);
    output.push('\n');
    output.push_str("REPOSITORY HEALTH ANALYSIS\n");
    output.push_str(RULE);
    output.push_str("\n\n");

    output.push_str(&format!("Repository: {}\n", result.repository));
    output.push_str(&format!("Classification: {}", result.classification));
    if result.demo_mode {
        output.push_str(" (LOW CONFIDENCE: insufficient activity data)");
    }
    output.push('\n');
    output.push_str(&format!(
        "Health Score (M): {:.3} (threshold {:.2})\n\n",
        result.score, result.threshold
    ));

    output.push_str("Metrics:\n");
    for metric in result.metrics() {
        output.push_str(&format!("  {:<28} {:.3}", metric.kind.to_string(), metric.value));
        if metric.fallback {
            output.push_str("  [fallback]");
        }
        output.push('\n');
    }
    output.push('\n');

    output.push_str("Recommendations:\n");
    if result.recommendations.is_empty() {
        output.push_str("  - none\n");
    } else {
        for (index, recommendation) in result.recommendations.iter().enumerate() {
            output.push_str(&format!("  {}. {}\n", index + 1, recommendation.message));
        }
    }

    if result.dropped_records > 0 {
        output.push_str(&format!(
            "\nNote: {} malformed record(s) were skipped\n",
            result.dropped_records
        ));
    }
    output.push_str(&format!("Weights: {}\n", result.weights_version));
    output
}

pub fn batch_to_summary(results: &[ScoreResult]) -> String {
    let mut output = results
        .iter()
        .map(to_summary)
        .collect::<Vec<_>>()
        .join("\n");
    output.push('\n');
    output.push_str(RULE);
    output.push('\n');
    output.push_str(&format!("BATCH SUMMARY ({} repositories)\n", results.len()));
    output.push_str(RULE);
    output.push('\n');
    for result in results {
        let marker = if result.demo_mode { " (low confidence)" } else { "" };
        output.push_str(&format!(
            "  {:<16} {:.3}  {}{}\n",
            result.classification.to_string(),
            result.score,
            result.repository,
            marker
        ));
    }
    output
}

pub fn info_to_summary(info: &EngineInfo) -> String {
    let mut output = format!("{} {}\n", info.name, info.version);
    output.push_str(&format!(
        "weights {} (threshold {:.2})\n",
        info.weights_version, info.threshold
    ));
    for metric in &info.metrics {
        output.push_str(&format!(
            "  {} {:<16} weight {:.2}\n",
            metric.symbol, metric.name, metric.weight
        ));
    }
    output.push_str(&format!("capabilities: {}\n", info.capabilities.join(", ")));
    output
}
