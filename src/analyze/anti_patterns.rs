use super::stats::{percentile, ratio};
use crate::types::activity::{ActivitySet, Branch};
use crate::types::config::AntiPatternConfig;
use crate::types::report::{MetricKind, MetricResult};
use chrono::{DateTime, Duration, Utc};

/// Risk signals folded into A. Each contributes a sub-score in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AntiPattern {
    StaleBranches,
    ForcePushes,
    UnreviewedMerges,
    StaleIssues,
    MegaCommits,
}

impl AntiPattern {
    pub const ALL: [AntiPattern; 5] = [
        AntiPattern::StaleBranches,
        AntiPattern::ForcePushes,
        AntiPattern::UnreviewedMerges,
        AntiPattern::StaleIssues,
        AntiPattern::MegaCommits,
    ];

    pub fn key(self) -> &'static str {
        match self {
            AntiPattern::StaleBranches => "stale_branches",
            AntiPattern::ForcePushes => "force_pushes",
            AntiPattern::UnreviewedMerges => "unreviewed_merges",
            AntiPattern::StaleIssues => "stale_issues",
            AntiPattern::MegaCommits => "mega_commits",
        }
    }

    pub fn count_key(self) -> String {
        format!("{}_count", self.key())
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Signal {
    score: f64,
    count: usize,
}

pub fn anti_pattern_score(set: &ActivitySet, config: &AntiPatternConfig) -> MetricResult {
    let branch_cutoff = cutoff(set.window_end, config.stale_branch_days);
    let signals = AntiPattern::ALL.map(|pattern| {
        let signal = match pattern {
            AntiPattern::StaleBranches => stale_branches(set, branch_cutoff),
            AntiPattern::ForcePushes => force_pushes(set, branch_cutoff),
            AntiPattern::UnreviewedMerges => unreviewed_merges(set),
            AntiPattern::StaleIssues => stale_issues(set, config),
            AntiPattern::MegaCommits => mega_commits(set, config),
        };
        (pattern, signal)
    });

    let value = signals.iter().map(|(_, signal)| signal.score).sum::<f64>() / signals.len() as f64;
    let mut result = MetricResult::new(MetricKind::AntiPatterns, value);
    for (pattern, signal) in signals {
        result = result
            .with_detail(pattern.key(), signal.score)
            .with_detail(&pattern.count_key(), signal.count as f64);
    }
    if set.metadata.archived {
        result = result.with_note("repository is archived");
    }
    result
}

/// `None` when the threshold reaches past the representable range, in which
/// case nothing is old enough to count.
fn cutoff(end: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    Duration::try_days(days).and_then(|span| end.checked_sub_signed(span))
}

fn is_stale_branch(set: &ActivitySet, branch: &Branch, cutoff: Option<DateTime<Utc>>) -> bool {
    !branch.protected
        && !branch.merged
        && !set.is_default_branch(branch)
        && matches!((branch.last_commit_at, cutoff), (Some(at), Some(cutoff)) if at < cutoff)
}

/// Unmerged, unprotected, non-default branches idle past the threshold,
/// as a share of the branches that could be stale at all.
fn stale_branches(set: &ActivitySet, cutoff: Option<DateTime<Utc>>) -> Signal {
    let candidates = set
        .branches
        .iter()
        .filter(|branch| !branch.protected && !set.is_default_branch(branch))
        .count();
    let stale = set
        .branches
        .iter()
        .filter(|branch| is_stale_branch(set, branch, cutoff))
        .count();
    Signal {
        score: ratio(stale, candidates),
        count: stale,
    }
}

/// Share of rewritten branches among the live ones. Idle branches only enter
/// the population when they were themselves force pushed, so abandoning a
/// branch never dilutes this signal.
fn force_pushes(set: &ActivitySet, cutoff: Option<DateTime<Utc>>) -> Signal {
    let population = set
        .branches
        .iter()
        .filter(|branch| branch.force_pushed || !is_stale_branch(set, branch, cutoff))
        .collect::<Vec<_>>();
    let forced = population
        .iter()
        .filter(|branch| branch.force_pushed)
        .count();
    Signal {
        score: ratio(forced, population.len()),
        count: forced,
    }
}

fn unreviewed_merges(set: &ActivitySet) -> Signal {
    let merged = set.merged_pull_requests().collect::<Vec<_>>();
    let unreviewed = merged.iter().filter(|pr| !pr.has_any_review()).count();
    Signal {
        score: ratio(unreviewed, merged.len()),
        count: unreviewed,
    }
}

fn stale_issues(set: &ActivitySet, config: &AntiPatternConfig) -> Signal {
    let Some(cutoff) = cutoff(set.window_end, config.stale_issue_days) else {
        return Signal::default();
    };
    let stale = set
        .issues
        .iter()
        .filter(|issue| issue.is_open() && issue.comments == 0)
        .filter(|issue| issue.last_activity() < cutoff)
        .count();
    Signal {
        score: ratio(stale, set.issues.len()),
        count: stale,
    }
}

/// Share of all changed lines carried by commits above the repository's own
/// high-percentile size (never below the configured floor).
fn mega_commits(set: &ActivitySet, config: &AntiPatternConfig) -> Signal {
    let mut sizes = set
        .commits
        .iter()
        .map(|commit| commit.lines_changed())
        .collect::<Vec<_>>();
    sizes.sort_unstable();
    let total_lines: u64 = sizes.iter().sum();
    let Some(cutoff) = percentile(&sizes, config.mega_commit_percentile) else {
        return Signal::default();
    };
    if total_lines == 0 {
        return Signal::default();
    }

    let threshold = cutoff.max(config.mega_commit_min_lines);
    let oversized = sizes
        .iter()
        .filter(|size| **size > threshold)
        .copied()
        .collect::<Vec<_>>();
    Signal {
        score: (oversized.iter().sum::<u64>() as f64 / total_lines as f64).clamp(0.0, 1.0),
        count: oversized.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::activity::{Branch, Commit, Issue, PullRequest, RepoMetadata};
    use chrono::{DateTime, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn empty() -> ActivitySet {
        ActivitySet {
            repository: "acme/widgets".to_string(),
            metadata: RepoMetadata::default(),
            commits: Vec::new(),
            pull_requests: Vec::new(),
            issues: Vec::new(),
            contributors: Vec::new(),
            branches: Vec::new(),
            window_start: now() - Duration::days(365),
            window_end: now(),
            dropped_count: 0,
            insufficient_data: false,
        }
    }

    fn branch(name: &str, idle_days: i64) -> Branch {
        Branch {
            name: name.to_string(),
            protected: false,
            commit_sha: None,
            last_commit_at: Some(now() - Duration::days(idle_days)),
            merged: false,
            force_pushed: false,
        }
    }

    fn commit(index: usize, lines: u64) -> Commit {
        Commit {
            sha: format!("{index:06}"),
            author: "ann".to_string(),
            author_login: None,
            date: now() - Duration::hours(index as i64),
            message: String::new(),
            files_changed: 1,
            additions: lines,
            deletions: 0,
        }
    }

    #[test]
    fn clean_repository_scores_zero() {
        let mut set = empty();
        set.branches = vec![branch("main", 400), branch("feature/fresh", 3)];
        set.commits = (0..50).map(|i| commit(i, 40)).collect();
        let result = anti_pattern_score(&set, &AntiPatternConfig::default());
        assert_eq!(result.value, 0.0);
    }

    #[test]
    fn stale_branches_are_counted_except_default_and_protected() {
        let mut set = empty();
        let mut release = branch("release/1.0", 300);
        release.protected = true;
        set.branches = vec![
            branch("main", 300),
            release,
            branch("feature/old", 200),
            branch("feature/new", 10),
        ];
        let result = anti_pattern_score(&set, &AntiPatternConfig::default());
        assert_eq!(result.detail("stale_branches"), Some(0.5));
        assert_eq!(result.detail("stale_branches_count"), Some(1.0));
    }

    #[test]
    fn adding_stale_branches_never_lowers_score() {
        let mut set = empty();
        set.branches = vec![branch("feature/a", 5), branch("feature/b", 6)];
        let mut previous = anti_pattern_score(&set, &AntiPatternConfig::default()).value;
        for i in 0..6 {
            set.branches.push(branch(&format!("stale/{i}"), 120 + i));
            let value = anti_pattern_score(&set, &AntiPatternConfig::default()).value;
            assert!(value >= previous);
            previous = value;
        }
        assert!(previous > 0.0);
    }

    #[test]
    fn merged_branches_are_not_stale() {
        let mut set = empty();
        let mut done = branch("feature/done", 200);
        done.merged = true;
        set.branches = vec![done];
        let result = anti_pattern_score(&set, &AntiPatternConfig::default());
        assert_eq!(result.detail("stale_branches"), Some(0.0));
    }

    #[test]
    fn unreviewed_merges_and_stale_issues_are_detected() {
        let mut set = empty();
        set.pull_requests = vec![PullRequest {
            number: 1,
            title: "hotfix".to_string(),
            state: "closed".to_string(),
            author: Some("ann".to_string()),
            created_at: now() - Duration::days(3),
            closed_at: Some(now() - Duration::days(2)),
            merged_at: Some(now() - Duration::days(2)),
            reviews: 0,
            reviewers: None,
            comments: 0,
            additions: 5,
            deletions: 1,
            changed_files: 1,
        }];
        set.issues = vec![
            Issue {
                number: 10,
                title: "forgotten".to_string(),
                state: "open".to_string(),
                created_at: now() - Duration::days(400),
                closed_at: None,
                updated_at: None,
                labels: Vec::new(),
                comments: 0,
            },
            Issue {
                number: 11,
                title: "discussed".to_string(),
                state: "open".to_string(),
                created_at: now() - Duration::days(400),
                closed_at: None,
                updated_at: Some(now() - Duration::days(5)),
                labels: vec!["bug".to_string()],
                comments: 3,
            },
        ];
        let result = anti_pattern_score(&set, &AntiPatternConfig::default());
        assert_eq!(result.detail("unreviewed_merges"), Some(1.0));
        assert_eq!(result.detail("stale_issues"), Some(0.5));
        assert!((result.value - 0.3).abs() < 1e-12);
    }

    #[test]
    fn mega_commits_measure_share_of_changed_lines() {
        let mut set = empty();
        set.commits = (0..95).map(|i| commit(i, 10)).collect();
        set.commits.extend((95..100).map(|i| commit(i, 5_000)));
        let result = anti_pattern_score(&set, &AntiPatternConfig::default());
        let expected = 25_000.0 / 25_950.0;
        assert!((result.detail("mega_commits").unwrap_or(0.0) - expected).abs() < 1e-12);
        assert_eq!(result.detail("mega_commits_count"), Some(5.0));
    }

    #[test]
    fn uniform_large_commits_are_not_mega() {
        let mut set = empty();
        set.commits = (0..20).map(|i| commit(i, 4_000)).collect();
        let result = anti_pattern_score(&set, &AntiPatternConfig::default());
        assert_eq!(result.detail("mega_commits"), Some(0.0));
    }

    #[test]
    fn force_pushed_branches_raise_score() {
        let mut set = empty();
        let mut rewritten = branch("feature/rebased", 1);
        rewritten.force_pushed = true;
        set.branches = vec![rewritten, branch("feature/clean", 1)];
        let result = anti_pattern_score(&set, &AntiPatternConfig::default());
        assert_eq!(result.detail("force_pushes"), Some(0.5));
    }

    #[test]
    fn idle_branches_do_not_dilute_force_pushes() {
        let mut set = empty();
        let mut main = branch("main", 1);
        main.force_pushed = true;
        set.branches = vec![main, branch("feature/fresh", 2)];
        let mut previous = anti_pattern_score(&set, &AntiPatternConfig::default());
        assert_eq!(previous.detail("force_pushes"), Some(0.5));

        for i in 0..4 {
            set.branches.push(branch(&format!("feature/idle-{i}"), 200));
            let result = anti_pattern_score(&set, &AntiPatternConfig::default());
            assert_eq!(result.detail("force_pushes"), Some(0.5));
            assert!(result.value >= previous.value);
            previous = result;
        }
    }

    #[test]
    fn force_pushed_idle_branch_still_counts() {
        let mut set = empty();
        let mut idle = branch("feature/rewritten", 200);
        idle.force_pushed = true;
        set.branches = vec![idle, branch("feature/fresh", 2)];
        let result = anti_pattern_score(&set, &AntiPatternConfig::default());
        assert_eq!(result.detail("force_pushes"), Some(0.5));
        assert_eq!(result.detail("stale_branches"), Some(0.5));
    }

    #[test]
    fn thresholds_beyond_calendar_range_mark_nothing_stale() {
        let mut set = empty();
        set.branches = vec![branch("feature/old", 400)];
        let config = AntiPatternConfig {
            stale_branch_days: i64::MAX,
            stale_issue_days: 1_000_000_000,
            ..AntiPatternConfig::default()
        };
        let result = anti_pattern_score(&set, &config);
        assert_eq!(result.detail("stale_branches"), Some(0.0));
        assert_eq!(result.detail("stale_issues"), Some(0.0));
    }
}
