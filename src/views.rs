//! The slices of the dataset each route renders.

use crate::store::{Dataset, RepoEntry};
use chrono::{DateTime, Local, Utc};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct RepoSummary {
    pub owner: String,
    pub name: String,
    pub description: Option<String>,
    pub watchers: u64,
}

impl RepoSummary {
    fn from_entry(username: &str, name: &str, entry: &RepoEntry) -> Self {
        let owner = entry
            .field("owner")
            .and_then(|o| o.get("login"))
            .and_then(Value::as_str)
            .unwrap_or(username);
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
            description: entry.str_field("description").map(str::to_string),
            watchers: entry
                .field("watchers_count")
                .and_then(Value::as_u64)
                .unwrap_or(0),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Every repository cached for `username`, in insertion order.
pub fn repository_list(state: &Dataset, username: &str) -> Vec<RepoSummary> {
    state
        .user(username)
        .map(|user| {
            user.repos()
                .map(|(name, entry)| RepoSummary::from_entry(username, name, entry))
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommitSummary {
    pub sha: String,
    pub author: String,
    pub message: String,
    pub date: Option<DateTime<Utc>>,
}

impl CommitSummary {
    fn from_value(commit: &Value) -> Self {
        let detail = &commit["commit"];
        Self {
            sha: commit["sha"].as_str().unwrap_or_default().to_string(),
            author: detail["author"]["name"]
                .as_str()
                .unwrap_or("unknown")
                .to_string(),
            message: detail["message"]
                .as_str()
                .and_then(|m| m.lines().next())
                .unwrap_or("")
                .to_string(),
            date: detail["author"]["date"]
                .as_str()
                .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
                .map(|d| d.with_timezone(&Utc)),
        }
    }
}

/// The loaded commit history, empty until it arrives or when it is not a list.
pub fn commit_list(state: &Dataset, username: &str, repo: &str) -> Vec<CommitSummary> {
    state
        .repo(username, repo)
        .and_then(RepoEntry::commits)
        .and_then(Value::as_array)
        .map(|commits| commits.iter().map(CommitSummary::from_value).collect())
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    pub filename: String,
    /// Absent for binary files.
    pub patch: Option<String>,
}

pub fn diff_files(state: &Dataset, username: &str, repo: &str, sha: &str) -> Vec<FileEntry> {
    state
        .diff(username, repo, sha)
        .and_then(|diff| diff["files"].as_array())
        .map(|files| {
            files
                .iter()
                .map(|f| FileEntry {
                    filename: f["filename"].as_str().unwrap_or("").to_string(),
                    patch: f["patch"].as_str().map(str::to_string),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Commit time in the local zone, followed by how long ago it was.
pub fn format_commit_time(time: &DateTime<Utc>, now: DateTime<Utc>) -> String {
    format!(
        "{} ({})",
        time.with_timezone(&Local).format("%a %b %e %H:%M:%S"),
        format_time_ago(time, now)
    )
}

pub fn format_time_ago(time: &DateTime<Utc>, now: DateTime<Utc>) -> String {
    let dur = now.signed_duration_since(*time);
    let (val, unit) = if dur.num_seconds() < 60 {
        (dur.num_seconds().max(0), "s")
    } else if dur.num_minutes() < 60 {
        (dur.num_minutes(), "m")
    } else if dur.num_hours() < 24 {
        (dur.num_hours(), "h")
    } else if dur.num_days() < 30 {
        (dur.num_days(), "d")
    } else if dur.num_days() < 365 {
        (dur.num_days() / 30, "mo")
    } else {
        (dur.num_days() / 365, "y")
    };
    format!("{val}{unit} ago")
}
