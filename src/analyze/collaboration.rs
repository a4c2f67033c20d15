use super::stats::{gini, ratio};
use crate::types::activity::ActivitySet;
use crate::types::config::CollaborationConfig;
use crate::types::report::{MetricKind, MetricResult};
use std::collections::BTreeMap;

pub const CONCENTRATION: &str = "concentration";
pub const REVIEW_COVERAGE: &str = "review_coverage";
pub const TOP_SHARE: &str = "top_contributor_share";

const NEUTRAL_CONCENTRATION: f64 = 0.5;
const REPORTED_SHARES: usize = 5;

pub fn collaboration_score(set: &ActivitySet, config: &CollaborationConfig) -> MetricResult {
    let contributions = contribution_counts(set);
    let counts = contributions
        .iter()
        .map(|(_, count)| *count)
        .collect::<Vec<_>>();
    let total: u64 = counts.iter().sum();

    let mut notes = Vec::new();
    let concentration = match concentration(&counts) {
        Some(value) => value,
        None => {
            notes.push("no contributor data; concentration treated as neutral".to_string());
            NEUTRAL_CONCENTRATION
        }
    };
    let spread = 1.0 - concentration;

    let merged = set.merged_pull_requests().collect::<Vec<_>>();
    let mut result = if merged.is_empty() {
        MetricResult::new(MetricKind::Collaboration, spread * config.fallback_penalty)
            .as_fallback()
            .with_note("no merged pull requests; score uses contributor concentration only")
    } else {
        let reviewed = merged
            .iter()
            .filter(|pr| pr.has_independent_review())
            .count();
        let coverage = ratio(reviewed, merged.len());
        MetricResult::new(
            MetricKind::Collaboration,
            config.concentration_weight * spread + config.review_weight * coverage,
        )
        .with_detail(REVIEW_COVERAGE, coverage)
        .with_detail("merged_pull_requests", merged.len() as f64)
    };

    result = result
        .with_detail(CONCENTRATION, concentration)
        .with_detail("contributors", counts.len() as f64);
    if total > 0 {
        result = result.with_detail(TOP_SHARE, counts[0] as f64 / total as f64);
        for (login, count) in contributions.iter().take(REPORTED_SHARES) {
            result = result.with_detail(&format!("share.{login}"), *count as f64 / total as f64);
        }
    }
    for note in notes {
        result = result.with_note(note);
    }
    result
}

/// Per-contributor counts, largest first. Contributor records win over
/// commit authorship when the collector supplied them.
fn contribution_counts(set: &ActivitySet) -> Vec<(String, u64)> {
    let mut per_login = BTreeMap::<String, u64>::new();
    if set.contributors.iter().any(|c| c.contributions > 0) {
        for contributor in &set.contributors {
            *per_login.entry(contributor.login.clone()).or_default() += contributor.contributions;
        }
    } else {
        for commit in &set.commits {
            *per_login.entry(commit.actor().to_string()).or_default() += 1;
        }
    }

    let mut counts = per_login
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .collect::<Vec<_>>();
    counts.sort_by(|left, right| right.1.cmp(&left.1).then_with(|| left.0.cmp(&right.0)));
    counts
}

/// 0.4 Gini + 0.4 top-1 share + 0.2 top-3 share beyond its fair portion.
/// Expects counts sorted descending; `None` when there is nothing to measure.
fn concentration(counts: &[u64]) -> Option<f64> {
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return None;
    }
    if counts.len() == 1 {
        return Some(1.0);
    }

    let n = counts.len() as f64;
    let total = total as f64;
    let top1 = counts[0] as f64 / total;
    let top3 = counts.iter().take(3).sum::<u64>() as f64 / total;
    let top3_excess = if counts.len() > 3 {
        let fair = 3.0 / n;
        ((top3 - fair) / (1.0 - fair)).max(0.0)
    } else {
        0.0
    };

    Some((0.4 * gini(counts) + 0.4 * top1 + 0.2 * top3_excess).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::activity::{Commit, Contributor, PullRequest, RepoMetadata};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn commit(index: usize, author: &str) -> Commit {
        Commit {
            sha: format!("{index:06}"),
            author: author.to_string(),
            author_login: None,
            date: start() + Duration::hours(index as i64),
            message: String::new(),
            files_changed: 1,
            additions: 1,
            deletions: 1,
        }
    }

    fn merged_pr(number: u64, author: &str, reviewers: &[&str]) -> PullRequest {
        PullRequest {
            number,
            title: format!("change {number}"),
            state: "closed".to_string(),
            author: Some(author.to_string()),
            created_at: start(),
            closed_at: Some(start() + Duration::days(1)),
            merged_at: Some(start() + Duration::days(1)),
            reviews: reviewers.len() as u64,
            reviewers: Some(reviewers.iter().map(|r| r.to_string()).collect()),
            comments: 0,
            additions: 10,
            deletions: 0,
            changed_files: 1,
        }
    }

    fn activity(commits: Vec<Commit>, pull_requests: Vec<PullRequest>) -> ActivitySet {
        ActivitySet {
            repository: "acme/widgets".to_string(),
            metadata: RepoMetadata::default(),
            commits,
            pull_requests,
            issues: Vec::new(),
            contributors: Vec::new(),
            branches: Vec::new(),
            window_start: start(),
            window_end: start() + Duration::days(30),
            dropped_count: 0,
            insufficient_data: false,
        }
    }

    fn three_authors() -> Vec<Commit> {
        let authors = ["ann", "bob", "cyd"];
        (0..30).map(|i| commit(i, authors[i % 3])).collect()
    }

    fn prs_with_coverage(reviewed: usize, total: usize) -> Vec<PullRequest> {
        (0..total)
            .map(|i| {
                if i < reviewed {
                    merged_pr(i as u64 + 1, "ann", &["bob"])
                } else {
                    merged_pr(i as u64 + 1, "ann", &[])
                }
            })
            .collect()
    }

    #[test]
    fn balanced_team_with_reviews_scores_high() {
        let result = collaboration_score(
            &activity(three_authors(), prs_with_coverage(8, 10)),
            &CollaborationConfig::default(),
        );
        assert!(result.value > 0.7, "collaboration was {}", result.value);
        assert!(!result.fallback);
        assert_eq!(result.detail(REVIEW_COVERAGE), Some(0.8));
        assert!(result.detail("share.ann").is_some());
    }

    #[test]
    fn self_reviews_do_not_count_as_coverage() {
        let prs = vec![merged_pr(1, "ann", &["ann"]), merged_pr(2, "bob", &["ann"])];
        let result = collaboration_score(
            &activity(three_authors(), prs),
            &CollaborationConfig::default(),
        );
        assert_eq!(result.detail(REVIEW_COVERAGE), Some(0.5));
    }

    #[test]
    fn review_coverage_is_monotonic() {
        let config = CollaborationConfig::default();
        let mut previous = 0.0;
        for reviewed in 0..=10 {
            let value = collaboration_score(
                &activity(three_authors(), prs_with_coverage(reviewed, 10)),
                &config,
            )
            .value;
            assert!(value >= previous, "coverage {reviewed} dropped C to {value}");
            previous = value;
        }
    }

    #[test]
    fn missing_pull_requests_fall_back_with_penalty() {
        let result = collaboration_score(
            &activity(three_authors(), Vec::new()),
            &CollaborationConfig::default(),
        );
        assert!(result.fallback);
        let spread = 1.0 - result.detail(CONCENTRATION).unwrap_or(1.0);
        assert!((result.value - spread * 0.7).abs() < 1e-12);
    }

    #[test]
    fn single_author_is_fully_concentrated() {
        let commits = (0..10).map(|i| commit(i, "solo")).collect::<Vec<_>>();
        let result = collaboration_score(&activity(commits, Vec::new()), &CollaborationConfig::default());
        assert_eq!(result.detail(CONCENTRATION), Some(1.0));
        assert_eq!(result.value, 0.0);
    }

    #[test]
    fn contributor_records_take_precedence_over_commit_authors() {
        let mut set = activity(three_authors(), Vec::new());
        set.contributors = vec![
            Contributor {
                login: "maintainer".to_string(),
                contributions: 990,
                kind: "User".to_string(),
            },
            Contributor {
                login: "drive-by".to_string(),
                contributions: 10,
                kind: "User".to_string(),
            },
        ];
        let result = collaboration_score(&set, &CollaborationConfig::default());
        assert_eq!(result.detail(TOP_SHARE), Some(0.99));
        assert!(result.detail("share.maintainer").is_some());
    }

    #[test]
    fn concentration_penalizes_top_heavy_teams() {
        let even = concentration(&[10, 10, 10, 10, 10]).unwrap_or(1.0);
        let skewed = concentration(&[80, 5, 5, 5, 5]).unwrap_or(0.0);
        assert!(even < 0.2, "even concentration was {even}");
        assert!(skewed > even);
        assert_eq!(concentration(&[]), None);
    }
}
