use super::stats::{least_squares_slope, logistic};
use crate::types::activity::ActivitySet;
use crate::types::config::VelocityConfig;
use crate::types::report::{clamp_unit, MetricKind, MetricResult};
use chrono::{DateTime, Duration, Utc};

pub const PACE: &str = "pace";
pub const TREND: &str = "trend";

pub fn velocity_score(set: &ActivitySet, config: &VelocityConfig) -> MetricResult {
    let events = delivery_events(set);
    if events.is_empty() {
        return MetricResult::new(MetricKind::Velocity, 0.0)
            .with_detail(PACE, 0.0)
            .with_note("no commits or merged pull requests to measure");
    }

    let series = weekly_series(set, &events);
    let total_weeks = series.len();
    let trailing = (config.window_weeks as usize).clamp(1, total_weeks);
    let recent = &series[total_weeks - trailing..];

    let historical_avg = events.len() as f64 / total_weeks as f64;
    let recent_avg = recent.iter().sum::<f64>() / trailing as f64;
    let relative = recent_avg / historical_avg;
    let pace = relative / (1.0 + relative);

    let result = MetricResult::new(MetricKind::Velocity, pace)
        .with_detail(PACE, pace)
        .with_detail("recent_weekly_avg", recent_avg)
        .with_detail("historical_weekly_avg", historical_avg)
        .with_detail("weeks", trailing as f64);

    if recent.len() < 2 {
        return result.with_note("fewer than two weeks of history; trend omitted");
    }

    let slope = least_squares_slope(recent);
    let trend = if recent_avg > 0.0 {
        logistic(config.trend_gain * slope / recent_avg)
    } else {
        0.0
    };
    let value = config.pace_weight * pace + config.trend_weight * trend;

    MetricResult {
        value: clamp_unit(value),
        ..result
    }
    .with_detail(TREND, trend)
    .with_detail("slope", slope)
}

fn delivery_events(set: &ActivitySet) -> Vec<DateTime<Utc>> {
    set.commits
        .iter()
        .map(|commit| commit.date)
        .chain(set.merged_pull_requests().filter_map(|pr| pr.merged_at))
        .collect()
}

/// Weekly event counts, oldest first, with weeks counted back from the
/// window end so the newest week is always complete.
fn weekly_series(set: &ActivitySet, events: &[DateTime<Utc>]) -> Vec<f64> {
    let week = Duration::weeks(1).num_seconds();
    let span = (set.window_end - set.delivery_start()).num_seconds().max(0);
    let total_weeks = ((span + week - 1) / week).max(1) as usize;

    let mut series = vec![0.0; total_weeks];
    for event in events {
        let back = (set.window_end - *event).num_seconds().clamp(0, span) / week;
        let back = (back as usize).min(total_weeks - 1);
        series[total_weeks - 1 - back] += 1.0;
    }
    series
}
