use super::anti_patterns::AntiPattern;
use super::collaboration::{CONCENTRATION, REVIEW_COVERAGE, TOP_SHARE};
use super::entropy::{AUTHOR_ENTROPY, TIME_ENTROPY};
use super::velocity::{PACE, TREND};
use super::MetricSet;
use crate::types::config::EngineConfig;
use crate::types::report::{MetricKind, MetricResult, Recommendation};
use crate::types::scoring::Score;

/// One advisory per out-of-band metric, largest gap first, capped at
/// `recommendations.max_count`. Degraded runs lead with a data advisory.
pub fn recommend(
    metrics: &MetricSet,
    insufficient_data: bool,
    config: &EngineConfig,
) -> Vec<Recommendation> {
    let mut recommendations = MetricKind::ALL
        .iter()
        .filter_map(|kind| {
            let metric = metrics.get(*kind);
            let gap = band_gap(metric, config);
            (gap > 0.0).then(|| Recommendation {
                metric: Some(*kind),
                message: advise(metric, config),
                gap,
            })
        })
        .collect::<Vec<_>>();
    recommendations.sort_by(|left, right| right.gap.total_cmp(&left.gap));

    if insufficient_data {
        recommendations.insert(
            0,
            Recommendation {
                metric: None,
                message: format!(
                    "Collect more activity history before relying on this score; fewer than {} commit(s) were available, so metrics use low-confidence defaults",
                    config.normalizer.min_commits
                ),
                gap: 1.0,
            },
        );
    }

    recommendations.truncate(config.recommendations.max_count);
    recommendations
}

fn band_gap(metric: &MetricResult, config: &EngineConfig) -> Score {
    let bands = &config.recommendations;
    match metric.kind {
        MetricKind::Entropy => bands.entropy_min - metric.value,
        MetricKind::Velocity => bands.velocity_min - metric.value,
        MetricKind::Collaboration => bands.collaboration_min - metric.value,
        MetricKind::AntiPatterns => metric.value - bands.anti_patterns_max,
    }
}

fn advise(metric: &MetricResult, config: &EngineConfig) -> String {
    match metric.kind {
        MetricKind::Entropy => advise_entropy(metric),
        MetricKind::Velocity => advise_velocity(metric),
        MetricKind::Collaboration => advise_collaboration(metric),
        MetricKind::AntiPatterns => advise_anti_patterns(metric, config),
    }
}

fn advise_entropy(metric: &MetricResult) -> String {
    if metric.fallback {
        return "Build up commit history before judging how activity is spread; too few commits were available to measure entropy"
            .to_string();
    }
    if metric.detail("buckets").is_none() {
        return "Establish a regular commit history; no commits were found in the activity window"
            .to_string();
    }
    let time = metric.detail(TIME_ENTROPY).unwrap_or(0.0);
    let author = metric.detail(AUTHOR_ENTROPY).unwrap_or(0.0);
    if time <= author {
        format!(
            "Spread commits more evenly over time; activity is concentrated in a few bursts (time entropy {time:.2})"
        )
    } else {
        format!(
            "Distribute commit ownership across more authors to reduce single-author risk (author entropy {author:.2})"
        )
    }
}

fn advise_velocity(metric: &MetricResult) -> String {
    let pace = metric.detail(PACE).unwrap_or(0.0);
    match metric.detail(TREND) {
        _ if metric.value == 0.0 && pace == 0.0 => {
            "Resume delivery; no commits or merged pull requests were found in the trailing window"
                .to_string()
        }
        Some(trend) if trend < pace => format!(
            "Delivery pace is trending down; review blockers and release cadence (trend {trend:.2})"
        ),
        _ => format!(
            "Recent delivery pace is below the repository's historical average; plan smaller, more frequent merges (pace {pace:.2})"
        ),
    }
}

fn advise_collaboration(metric: &MetricResult) -> String {
    let top_share = metric.detail(TOP_SHARE).unwrap_or(1.0);
    if metric.fallback {
        return format!(
            "Improve collaboration by routing changes through reviewed pull requests; no merged pull requests were found and the top contributor holds {:.0}% of contributions",
            top_share * 100.0
        );
    }
    let spread = 1.0 - metric.detail(CONCENTRATION).unwrap_or(1.0);
    let coverage = metric.detail(REVIEW_COVERAGE).unwrap_or(0.0);
    if coverage <= spread {
        format!(
            "Increase PR review coverage to strengthen collaboration; only {:.0}% of merged pull requests had an independent review",
            coverage * 100.0
        )
    } else {
        format!(
            "Improve collaboration by broadening the contributor base; the top contributor holds {:.0}% of contributions",
            top_share * 100.0
        )
    }
}

fn advise_anti_patterns(metric: &MetricResult, config: &EngineConfig) -> String {
    let dominant = AntiPattern::ALL
        .iter()
        .copied()
        .map(|pattern| (pattern, metric.detail(pattern.key()).unwrap_or(0.0)))
        .fold(None::<(AntiPattern, Score)>, |best, candidate| match best {
            Some(best) if best.1 >= candidate.1 => Some(best),
            _ => Some(candidate),
        })
        .map(|(pattern, _)| pattern)
        .unwrap_or(AntiPattern::StaleBranches);
    let count = metric.detail(&dominant.count_key()).unwrap_or(0.0) as u64;
    let thresholds = &config.anti_patterns;

    match dominant {
        AntiPattern::StaleBranches => format!(
            "Clean up {count} stale branch(es) with no commits in over {} days; merge or delete them",
            thresholds.stale_branch_days
        ),
        AntiPattern::ForcePushes => format!(
            "Protect shared branches against force pushes; {count} branch(es) show rewritten history"
        ),
        AntiPattern::UnreviewedMerges => format!(
            "Require at least one review before merging; {count} pull request(s) were merged without review"
        ),
        AntiPattern::StaleIssues => format!(
            "Triage {count} stale issue(s) open for over {} days without activity",
            thresholds.stale_issue_days
        ),
        AntiPattern::MegaCommits => format!(
            "Split large changes into smaller commits; {count} oversized commit(s) carry {:.0}% of changed lines",
            metric.detail(AntiPattern::MegaCommits.key()).unwrap_or(0.0) * 100.0
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(h: MetricResult, v: MetricResult, c: MetricResult, a: MetricResult) -> MetricSet {
        MetricSet {
            entropy: h,
            velocity: v,
            collaboration: c,
            anti_patterns: a,
        }
    }

    fn healthy() -> MetricSet {
        metrics(
            MetricResult::new(MetricKind::Entropy, 0.9)
                .with_detail(TIME_ENTROPY, 0.9)
                .with_detail(AUTHOR_ENTROPY, 0.9)
                .with_detail("buckets", 10.0),
            MetricResult::new(MetricKind::Velocity, 0.6).with_detail(PACE, 0.6),
            MetricResult::new(MetricKind::Collaboration, 0.8)
                .with_detail(CONCENTRATION, 0.1)
                .with_detail(REVIEW_COVERAGE, 0.7),
            MetricResult::new(MetricKind::AntiPatterns, 0.05),
        )
    }

    #[test]
    fn all_metrics_in_band_yield_no_recommendations() {
        let recommendations = recommend(&healthy(), false, &EngineConfig::default());
        assert!(recommendations.is_empty());
    }

    #[test]
    fn recommendations_are_ordered_by_gap() {
        let mut set = healthy();
        set.velocity = MetricResult::new(MetricKind::Velocity, 0.45).with_detail(PACE, 0.45);
        set.anti_patterns = MetricResult::new(MetricKind::AntiPatterns, 0.7)
            .with_detail("stale_branches", 1.0)
            .with_detail("stale_branches_count", 4.0)
            .with_detail("mega_commits", 0.9);

        let recommendations = recommend(&set, false, &EngineConfig::default());
        assert_eq!(recommendations.len(), 2);
        assert_eq!(recommendations[0].metric, Some(MetricKind::AntiPatterns));
        assert!(recommendations[0].message.contains("4 stale branch"));
        assert_eq!(recommendations[1].metric, Some(MetricKind::Velocity));
    }

    #[test]
    fn low_review_coverage_recommends_reviews() {
        let mut set = healthy();
        set.collaboration = MetricResult::new(MetricKind::Collaboration, 0.35)
            .with_detail(CONCENTRATION, 0.3)
            .with_detail(REVIEW_COVERAGE, 0.0)
            .with_detail(TOP_SHARE, 0.4);
        let recommendations = recommend(&set, false, &EngineConfig::default());
        assert_eq!(recommendations.len(), 1);
        assert!(recommendations[0].message.contains("review coverage"));
    }

    #[test]
    fn insufficient_data_leads_with_advisory_and_respects_cap() {
        let set = metrics(
            MetricResult::new(MetricKind::Entropy, 0.0),
            MetricResult::new(MetricKind::Velocity, 0.0),
            MetricResult::new(MetricKind::Collaboration, 0.0).as_fallback(),
            MetricResult::new(MetricKind::AntiPatterns, 0.9),
        );
        let mut config = EngineConfig::default();
        config.recommendations.max_count = 3;

        let recommendations = recommend(&set, true, &config);
        assert_eq!(recommendations.len(), 3);
        assert_eq!(recommendations[0].metric, None);
        assert!(recommendations[0].message.contains("more activity history"));
    }

    #[test]
    fn degraded_entropy_advice_does_not_claim_an_empty_history() {
        let recommendations = recommend(&MetricSet::neutral(), true, &EngineConfig::default());
        let entropy = recommendations
            .iter()
            .find(|recommendation| recommendation.metric == Some(MetricKind::Entropy))
            .expect("neutral entropy is below its band");
        assert!(!entropy.message.contains("no commits"), "got: {}", entropy.message);
        assert!(entropy.message.contains("too few commits"));
    }
}
