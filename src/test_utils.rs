#![cfg(test)]

use crate::error::{OctoviewError, Result};
use crate::github::client::ResourceClient;
use crate::store::Action;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub fn add_user(username: &str, repo: Option<&str>) -> Action {
    Action::AddUser {
        username: username.to_string(),
        repo: repo.map(str::to_string),
    }
}

pub fn load_user(username: &str, repositories: Value) -> Action {
    Action::LoadUser {
        username: username.to_string(),
        repositories,
    }
}

pub fn load_repository(username: &str, repo: &str, commits: Value) -> Action {
    Action::LoadRepository {
        username: username.to_string(),
        repo: repo.to_string(),
        commits,
    }
}

pub fn load_diff(username: &str, repo: &str, sha: &str, diff: Value) -> Action {
    Action::LoadDiff {
        username: username.to_string(),
        repo: repo.to_string(),
        sha: sha.to_string(),
        diff,
    }
}

pub fn repo_record(owner: &str, name: &str) -> Value {
    json!({
        "name": name,
        "full_name": format!("{owner}/{name}"),
        "owner": {"login": owner},
        "description": format!("the {name} repository"),
        "watchers_count": 3,
    })
}

pub fn commit_summary(sha: &str, author: &str, message: &str) -> Value {
    json!({
        "sha": sha,
        "author": {"login": author, "avatar_url": "https://example.invalid/a.png"},
        "commit": {
            "author": {"name": author, "date": "2016-03-01T12:00:00Z"},
            "message": message,
        },
    })
}

/// Serves canned bodies by path; unknown paths fail like a transport error.
#[derive(Clone, Default)]
pub struct FakeClient {
    bodies: Arc<Mutex<HashMap<String, Value>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, path: &str, body: Value) -> Self {
        self.bodies
            .lock()
            .expect("fake client lock")
            .insert(path.to_string(), body);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("fake client lock").clone()
    }
}

#[async_trait]
impl ResourceClient for FakeClient {
    async fn get(&self, path: &str) -> Result<Value> {
        self.requests
            .lock()
            .expect("fake client lock")
            .push(path.to_string());
        self.bodies
            .lock()
            .expect("fake client lock")
            .get(path)
            .cloned()
            .ok_or_else(|| OctoviewError::GitHub(format!("connection refused: {path}")))
    }
}
