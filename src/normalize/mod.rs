//! Turns a loosely typed [`RawBundle`] into an immutable [`ActivitySet`].
//!
//! Records without a usable timestamp or identity are dropped and counted.
//! Values that cannot be coerced at all (a count of `"many"`, a commit that is
//! a bare string) abort normalization with [`HealthError::Input`](crate::error::HealthError::Input).

pub mod fields;

use crate::error::Result;
use crate::types::activity::{
    ActivitySet, Branch, Commit, Contributor, Issue, PullRequest, RepoMetadata,
};
use crate::types::bundle::RawBundle;
use crate::types::config::NormalizerConfig;
use chrono::{DateTime, Utc};
use fields::Record;
use std::collections::HashSet;
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct Tally {
    dropped: usize,
    duplicates: usize,
}

pub fn normalize(
    bundle: &RawBundle,
    config: &NormalizerConfig,
    now: DateTime<Utc>,
) -> Result<ActivitySet> {
    let mut tally = Tally::default();

    let metadata = normalize_metadata(bundle)?;
    let commits = normalize_commits(bundle, &mut tally)?;
    let pull_requests = normalize_pull_requests(bundle, &mut tally)?;
    let issues = normalize_issues(bundle, &mut tally)?;
    let contributors = normalize_contributors(bundle, &mut tally)?;
    let branches = normalize_branches(bundle, &mut tally)?;

    let insufficient_data = commits.len() < config.min_commits;
    let repository = bundle.repository_name();

    let mut set = ActivitySet {
        repository,
        metadata,
        commits,
        pull_requests,
        issues,
        contributors,
        branches,
        window_start: now,
        window_end: now,
        dropped_count: tally.dropped,
        insufficient_data,
    };

    let (start, end) = {
        let timeline = set.timeline();
        let first = timeline.first().and_then(|record| record.timestamp());
        let last = timeline.last().and_then(|record| record.timestamp());
        (first.unwrap_or(now), last.map_or(now, |last| last.max(now)))
    };
    set.window_start = start.min(end);
    set.window_end = end;

    debug!(
        repository = %set.repository,
        commits = set.commits.len(),
        pull_requests = set.pull_requests.len(),
        issues = set.issues.len(),
        contributors = set.contributors.len(),
        branches = set.branches.len(),
        age_days = set.age_days(),
        dropped = tally.dropped,
        duplicates = tally.duplicates,
        "normalized activity bundle"
    );
    if insufficient_data {
        warn!(
            repository = %set.repository,
            commits = set.commits.len(),
            min_commits = config.min_commits,
            "insufficient commit history; metrics fall back to neutral values"
        );
    }

    Ok(set)
}

fn normalize_metadata(bundle: &RawBundle) -> Result<RepoMetadata> {
    let basic = fields::optional_mapping(&bundle.basic_info, "basic_info")?;
    let stats = fields::optional_mapping(&bundle.repository_stats, "repository_stats")?;

    let mut metadata = RepoMetadata::default();
    if let Some(basic) = basic {
        metadata.size = fields::count(basic, "size")?;
        metadata.created_at = fields::timestamp(basic, "created_at");
        metadata.archived = fields::flag(basic, "archived")?;
        metadata.default_branch = fields::text(basic, "default_branch")?;
    }
    if let Some(stats) = stats {
        metadata.archived = metadata.archived || fields::flag(stats, "archived")?;
        if let Some(default_branch) = fields::text(stats, "default_branch")? {
            metadata.default_branch = Some(default_branch);
        }
    }
    Ok(metadata)
}

fn records<'a>(value: &'a serde_json::Value, name: &str) -> Result<Vec<&'a Record>> {
    fields::sequence(value, name)?
        .iter()
        .enumerate()
        .map(|(index, item)| fields::record(item, name, index))
        .collect()
}

fn normalize_commits(bundle: &RawBundle, tally: &mut Tally) -> Result<Vec<Commit>> {
    let mut seen = HashSet::new();
    let mut commits = Vec::new();
    for record in records(&bundle.commits, "commits")? {
        let (Some(sha), Some(date)) = (
            fields::text(record, "sha")?,
            fields::timestamp(record, "date"),
        ) else {
            tally.dropped += 1;
            continue;
        };
        let commit = Commit {
            author: fields::text(record, "author")?.unwrap_or_else(|| "Unknown".to_string()),
            author_login: fields::text(record, "author_login")?,
            date,
            message: fields::text(record, "message")?.unwrap_or_default(),
            files_changed: fields::count(record, "files_changed")?,
            additions: fields::count(record, "additions")?,
            deletions: fields::count(record, "deletions")?,
            sha,
        };
        if !seen.insert(commit.sha.clone()) {
            tally.duplicates += 1;
            continue;
        }
        commits.push(commit);
    }
    commits.sort_by(|left, right| {
        left.date
            .cmp(&right.date)
            .then_with(|| left.sha.cmp(&right.sha))
    });
    Ok(commits)
}

fn normalize_pull_requests(bundle: &RawBundle, tally: &mut Tally) -> Result<Vec<PullRequest>> {
    let mut seen = HashSet::new();
    let mut pull_requests = Vec::new();
    for record in records(&bundle.pull_requests, "pull_requests")? {
        let (Some(number), Some(created_at)) = (
            fields::optional_count(record, "number")?,
            fields::timestamp(record, "created_at"),
        ) else {
            tally.dropped += 1;
            continue;
        };
        let pr = PullRequest {
            number,
            title: fields::text(record, "title")?.unwrap_or_default(),
            state: fields::text(record, "state")?.unwrap_or_default(),
            author: fields::text(record, "author")?,
            created_at,
            closed_at: fields::timestamp(record, "closed_at"),
            merged_at: fields::timestamp(record, "merged_at"),
            reviews: fields::count(record, "reviews")?,
            reviewers: fields::string_list(record, "reviewers")?,
            comments: fields::count(record, "comments")?,
            additions: fields::count(record, "additions")?,
            deletions: fields::count(record, "deletions")?,
            changed_files: fields::count(record, "changed_files")?,
        };
        if !seen.insert(pr.number) {
            tally.duplicates += 1;
            continue;
        }
        pull_requests.push(pr);
    }
    pull_requests.sort_by(|left, right| {
        left.created_at
            .cmp(&right.created_at)
            .then_with(|| left.number.cmp(&right.number))
    });
    Ok(pull_requests)
}

fn normalize_issues(bundle: &RawBundle, tally: &mut Tally) -> Result<Vec<Issue>> {
    let mut seen = HashSet::new();
    let mut issues = Vec::new();
    for record in records(&bundle.issues, "issues")? {
        let (Some(number), Some(created_at)) = (
            fields::optional_count(record, "number")?,
            fields::timestamp(record, "created_at"),
        ) else {
            tally.dropped += 1;
            continue;
        };
        let issue = Issue {
            number,
            title: fields::text(record, "title")?.unwrap_or_default(),
            state: fields::text(record, "state")?.unwrap_or_default(),
            created_at,
            closed_at: fields::timestamp(record, "closed_at"),
            updated_at: fields::timestamp(record, "updated_at"),
            labels: fields::string_list(record, "labels")?.unwrap_or_default(),
            comments: fields::count(record, "comments")?,
        };
        if !seen.insert(issue.number) {
            tally.duplicates += 1;
            continue;
        }
        issues.push(issue);
    }
    issues.sort_by(|left, right| {
        left.created_at
            .cmp(&right.created_at)
            .then_with(|| left.number.cmp(&right.number))
    });
    Ok(issues)
}

fn normalize_contributors(bundle: &RawBundle, tally: &mut Tally) -> Result<Vec<Contributor>> {
    let mut seen = HashSet::new();
    let mut contributors = Vec::new();
    for record in records(&bundle.contributors, "contributors")? {
        let Some(login) = fields::text(record, "login")? else {
            tally.dropped += 1;
            continue;
        };
        let contributor = Contributor {
            contributions: fields::count(record, "contributions")?,
            kind: fields::text(record, "type")?.unwrap_or_else(|| "User".to_string()),
            login,
        };
        if !seen.insert(contributor.login.clone()) {
            tally.duplicates += 1;
            continue;
        }
        contributors.push(contributor);
    }
    contributors.sort_by(|left, right| left.login.cmp(&right.login));
    Ok(contributors)
}

fn normalize_branches(bundle: &RawBundle, tally: &mut Tally) -> Result<Vec<Branch>> {
    let mut seen = HashSet::new();
    let mut branches = Vec::new();
    for record in records(&bundle.branches, "branches")? {
        let Some(name) = fields::text(record, "name")? else {
            tally.dropped += 1;
            continue;
        };
        let branch = Branch {
            protected: fields::flag(record, "protected")?,
            commit_sha: fields::text(record, "commit_sha")?,
            last_commit_at: fields::timestamp(record, "last_commit_at"),
            merged: fields::flag(record, "merged")?,
            force_pushed: fields::flag(record, "force_pushed")?,
            name,
        };
        if !seen.insert(branch.name.clone()) {
            tally.duplicates += 1;
            continue;
        }
        branches.push(branch);
    }
    branches.sort_by(|left, right| {
        left.last_commit_at
            .cmp(&right.last_commit_at)
            .then_with(|| left.name.cmp(&right.name))
    });
    Ok(branches)
}
