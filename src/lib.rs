//! Repository health scoring from pre-fetched activity data.
//!
//! A [`RawBundle`] goes through the normalizer, four metric extractors
//! (commit entropy H, velocity V, collaboration C, anti-patterns A), the
//! composite scorer and the recommendation generator. [`Engine`] wires the
//! stages together.

pub mod analyze;
pub mod config;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod report;
pub mod types;

pub use engine::{Engine, EngineInfo};
pub use error::{HealthError, Result};
pub use types::bundle::RawBundle;
pub use types::config::EngineConfig;
pub use types::report::{Classification, Confidence, MetricKind, MetricResult, ScoreResult};
