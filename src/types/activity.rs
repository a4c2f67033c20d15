use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    pub sha: String,
    pub author: String,
    pub author_login: Option<String>,
    pub date: DateTime<Utc>,
    pub message: String,
    pub files_changed: u64,
    pub additions: u64,
    pub deletions: u64,
}

impl Commit {
    /// Login when the hosting provider resolved one, otherwise the git author name.
    pub fn actor(&self) -> &str {
        self.author_login.as_deref().unwrap_or(&self.author)
    }

    pub fn lines_changed(&self) -> u64 {
        self.additions.saturating_add(self.deletions)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
    pub reviews: u64,
    pub reviewers: Option<Vec<String>>,
    pub comments: u64,
    pub additions: u64,
    pub deletions: u64,
    pub changed_files: u64,
}

impl PullRequest {
    pub fn is_merged(&self) -> bool {
        self.merged_at.is_some()
    }

    /// At least one review by someone other than the author. Without a reviewer
    /// list the review count is taken at face value.
    pub fn has_independent_review(&self) -> bool {
        match &self.reviewers {
            Some(reviewers) => reviewers
                .iter()
                .any(|reviewer| Some(reviewer.as_str()) != self.author.as_deref()),
            None => self.reviews > 0,
        }
    }

    pub fn has_any_review(&self) -> bool {
        self.reviews > 0
            || self
                .reviewers
                .as_ref()
                .map(|reviewers| !reviewers.is_empty())
                .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub labels: Vec<String>,
    pub comments: u64,
}

impl Issue {
    pub fn is_open(&self) -> bool {
        self.closed_at.is_none() && !self.state.eq_ignore_ascii_case("closed")
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.updated_at
            .unwrap_or(self.created_at)
            .max(self.created_at)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Contributor {
    pub login: String,
    pub contributions: u64,
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub name: String,
    pub protected: bool,
    pub commit_sha: Option<String>,
    pub last_commit_at: Option<DateTime<Utc>>,
    pub merged: bool,
    pub force_pushed: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RepoMetadata {
    pub size: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub default_branch: Option<String>,
    pub archived: bool,
}

/// Borrowed view of any normalized record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActivityRecord<'a> {
    Commit(&'a Commit),
    PullRequest(&'a PullRequest),
    Issue(&'a Issue),
    Contributor(&'a Contributor),
    Branch(&'a Branch),
}

impl<'a> ActivityRecord<'a> {
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            ActivityRecord::Commit(commit) => Some(commit.date),
            ActivityRecord::PullRequest(pr) => Some(pr.created_at),
            ActivityRecord::Issue(issue) => Some(issue.created_at),
            ActivityRecord::Contributor(_) => None,
            ActivityRecord::Branch(branch) => branch.last_commit_at,
        }
    }

    pub fn identity(&self) -> String {
        match self {
            ActivityRecord::Commit(commit) => commit.sha.clone(),
            ActivityRecord::PullRequest(pr) => format!("pr#{}", pr.number),
            ActivityRecord::Issue(issue) => format!("issue#{}", issue.number),
            ActivityRecord::Contributor(contributor) => contributor.login.clone(),
            ActivityRecord::Branch(branch) => branch.name.clone(),
        }
    }
}

/// Normalized snapshot of one repository. Built once by the normalizer and
/// only read afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivitySet {
    pub repository: String,
    pub metadata: RepoMetadata,
    pub commits: Vec<Commit>,
    pub pull_requests: Vec<PullRequest>,
    pub issues: Vec<Issue>,
    pub contributors: Vec<Contributor>,
    pub branches: Vec<Branch>,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub dropped_count: usize,
    pub insufficient_data: bool,
}

impl ActivitySet {
    /// Every timestamped record, ascending by time then identity.
    pub fn timeline(&self) -> Vec<ActivityRecord<'_>> {
        let mut records = self
            .commits
            .iter()
            .map(ActivityRecord::Commit)
            .chain(self.pull_requests.iter().map(ActivityRecord::PullRequest))
            .chain(self.issues.iter().map(ActivityRecord::Issue))
            .chain(self.branches.iter().map(ActivityRecord::Branch))
            .filter(|record| record.timestamp().is_some())
            .collect::<Vec<_>>();
        records.sort_by(|left, right| {
            left.timestamp()
                .cmp(&right.timestamp())
                .then_with(|| left.identity().cmp(&right.identity()))
        });
        records
    }

    /// Start of the delivery history: the earliest commit or merge, never past
    /// the window end. Issues and branch tips do not widen it, so H and V
    /// measure the span in which work was actually delivered.
    pub fn delivery_start(&self) -> DateTime<Utc> {
        self.commits
            .iter()
            .map(|commit| commit.date)
            .chain(self.merged_pull_requests().filter_map(|pr| pr.merged_at))
            .min()
            .unwrap_or(self.window_start)
            .min(self.window_end)
    }

    pub fn merged_pull_requests(&self) -> impl Iterator<Item = &PullRequest> {
        self.pull_requests.iter().filter(|pr| pr.is_merged())
    }

    pub fn is_default_branch(&self, branch: &Branch) -> bool {
        match self.metadata.default_branch.as_deref() {
            Some(default) => branch.name == default,
            None => matches!(branch.name.as_str(), "main" | "master"),
        }
    }

    pub fn age_days(&self) -> i64 {
        let origin = self
            .metadata
            .created_at
            .unwrap_or(self.window_start)
            .min(self.window_start);
        (self.window_end - origin).num_days().max(0)
    }
}
