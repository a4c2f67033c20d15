pub mod json;
pub mod summary;

use crate::engine::EngineInfo;
use crate::error::HealthError;
use crate::types::report::ScoreResult;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Summary,
}

pub fn render(result: &ScoreResult, format: OutputFormat) -> Result<String, HealthError> {
    match format {
        OutputFormat::Json => json::to_json(result).map_err(HealthError::Json),
        OutputFormat::Summary => Ok(summary::to_summary(result)),
    }
}

/// A single result keeps the single-document shape. Several results render
/// as a JSON array, or as consecutive summaries followed by a batch table.
pub fn render_batch(
    results: &[ScoreResult],
    format: OutputFormat,
) -> Result<String, HealthError> {
    match (results, format) {
        ([result], _) => render(result, format),
        (_, OutputFormat::Json) => json::batch_to_json(results).map_err(HealthError::Json),
        (_, OutputFormat::Summary) => Ok(summary::batch_to_summary(results)),
    }
}

pub fn render_info(info: &EngineInfo, format: OutputFormat) -> Result<String, HealthError> {
    match format {
        OutputFormat::Json => json::info_to_json(info).map_err(HealthError::Json),
        OutputFormat::Summary => Ok(summary::info_to_summary(info)),
    }
}
