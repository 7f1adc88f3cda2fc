//! The cached GitHub data: username → repository → metadata, commits and diffs.
//!
//! Every level is held behind an [`Arc`] so a reduction can copy only the path
//! it touches. A `Dataset` handed out by the store is therefore a stable
//! snapshot, and subtrees a reduction did not touch stay pointer-equal.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Dataset {
    users: IndexMap<String, Arc<UserEntry>>,
}

impl Dataset {
    pub fn user(&self, username: &str) -> Option<&UserEntry> {
        self.users.get(username).map(Arc::as_ref)
    }

    pub fn user_arc(&self, username: &str) -> Option<&Arc<UserEntry>> {
        self.users.get(username)
    }

    pub fn repo(&self, username: &str, repo: &str) -> Option<&RepoEntry> {
        self.user(username)?.repo(repo)
    }

    pub fn diff(&self, username: &str, repo: &str, sha: &str) -> Option<&Value> {
        self.repo(username, repo)?.diff(sha)
    }

    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.users.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub(crate) fn user_entry(&mut self, username: &str) -> Option<&mut UserEntry> {
        self.users.get_mut(username).map(Arc::make_mut)
    }

    pub(crate) fn ensure_user(&mut self, username: &str) -> &mut UserEntry {
        let entry = self.users.entry(username.to_string()).or_default();
        Arc::make_mut(entry)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UserEntry {
    repos: IndexMap<String, Arc<RepoEntry>>,
}

impl UserEntry {
    pub fn repo(&self, name: &str) -> Option<&RepoEntry> {
        self.repos.get(name).map(Arc::as_ref)
    }

    pub fn repo_arc(&self, name: &str) -> Option<&Arc<RepoEntry>> {
        self.repos.get(name)
    }

    /// Repositories in the order they were first added.
    pub fn repos(&self) -> impl Iterator<Item = (&str, &RepoEntry)> {
        self.repos.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    pub(crate) fn repo_entry(&mut self, name: &str) -> Option<&mut RepoEntry> {
        self.repos.get_mut(name).map(Arc::make_mut)
    }

    pub(crate) fn ensure_repo(&mut self, name: &str) {
        self.repos.entry(name.to_string()).or_default();
    }

    pub(crate) fn replace_repo(&mut self, name: &str, entry: RepoEntry) {
        self.repos.insert(name.to_string(), Arc::new(entry));
    }
}

/// A repository as returned by the upstream API, plus what was loaded under it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepoEntry {
    #[serde(flatten)]
    record: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    commits: Option<Arc<Value>>,
    /// Keyed by commit SHA, serialized beside the record fields.
    #[serde(flatten)]
    diffs: IndexMap<String, Arc<Value>>,
}

impl Default for RepoEntry {
    fn default() -> Self {
        Self::from_record(Map::new())
    }
}

impl RepoEntry {
    pub fn from_record(record: Map<String, Value>) -> Self {
        Self {
            record,
            commits: None,
            diffs: IndexMap::new(),
        }
    }

    /// The repository record fields, verbatim from the API.
    pub fn record(&self) -> &Map<String, Value> {
        &self.record
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.record.get(name)
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.record.get(name).and_then(Value::as_str)
    }

    /// The commit list, absent until LOAD_REPOSITORY has been reduced.
    pub fn commits(&self) -> Option<&Value> {
        self.commits.as_deref()
    }

    pub fn diff(&self, sha: &str) -> Option<&Value> {
        self.diffs.get(sha).map(Arc::as_ref)
    }

    pub fn diff_arc(&self, sha: &str) -> Option<&Arc<Value>> {
        self.diffs.get(sha)
    }

    pub fn shas(&self) -> impl Iterator<Item = &str> {
        self.diffs.keys().map(String::as_str)
    }

    pub(crate) fn set_commits(&mut self, commits: Value) {
        self.commits = Some(Arc::new(commits));
    }

    pub(crate) fn set_diff(&mut self, sha: &str, diff: Value) {
        self.diffs.insert(sha.to_string(), Arc::new(diff));
    }
}
