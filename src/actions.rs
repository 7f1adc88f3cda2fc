//! Action factory: descriptors and the procedures that fetch what they carry.
//!
//! Each procedure makes exactly one request and dispatches exactly one
//! action. A failed request is not retried and does not stop the dispatch:
//! the action carries `null` and the reducer decides what that means.

use crate::github::client::ResourceClient;
use crate::github::routes;
use crate::store::{Action, Thunk};
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct ActionFactory {
    client: Arc<dyn ResourceClient>,
}

impl ActionFactory {
    pub fn new(client: Arc<dyn ResourceClient>) -> Self {
        Self { client }
    }

    pub fn add_user(username: &str, repo: Option<&str>) -> Action {
        Action::AddUser {
            username: username.to_string(),
            repo: repo.map(str::to_string),
        }
    }

    pub fn load_user(&self, username: &str) -> Thunk {
        let client = Arc::clone(&self.client);
        let username = username.to_string();
        Thunk::new("load_user", move |dispatch| async move {
            let repositories = fetch(client.as_ref(), &routes::user_repos(&username)).await;
            dispatch.dispatch(Action::LoadUser {
                username,
                repositories,
            });
        })
    }

    pub fn load_repository(&self, username: &str, repo: &str) -> Thunk {
        let client = Arc::clone(&self.client);
        let (username, repo) = (username.to_string(), repo.to_string());
        Thunk::new("load_repository", move |dispatch| async move {
            let commits = fetch(client.as_ref(), &routes::repo_commits(&username, &repo)).await;
            dispatch.dispatch(Action::LoadRepository {
                username,
                repo,
                commits,
            });
        })
    }

    pub fn load_diff(&self, username: &str, repo: &str, sha: &str) -> Thunk {
        let client = Arc::clone(&self.client);
        let (username, repo, sha) = (username.to_string(), repo.to_string(), sha.to_string());
        Thunk::new("load_diff", move |dispatch| async move {
            let diff = fetch(client.as_ref(), &routes::commit(&username, &repo, &sha)).await;
            dispatch.dispatch(Action::LoadDiff {
                username,
                repo,
                sha,
                diff,
            });
        })
    }
}

async fn fetch(client: &dyn ResourceClient, path: &str) -> Value {
    match client.get(path).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(path, error = %e, "request failed, dispatching empty body");
            Value::Null
        }
    }
}
