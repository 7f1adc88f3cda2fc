use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A synchronous state transition, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    AddUser {
        username: String,
        #[serde(default)]
        repo: Option<String>,
    },
    LoadUser {
        username: String,
        repositories: Value,
    },
    LoadRepository {
        username: String,
        repo: String,
        commits: Value,
    },
    LoadDiff {
        username: String,
        repo: String,
        sha: String,
        diff: Value,
    },
    /// Any tag this build does not know; reduces to the unchanged state.
    #[serde(other)]
    Unknown,
}

impl Action {
    pub fn tag(&self) -> &'static str {
        match self {
            Action::AddUser { .. } => "ADD_USER",
            Action::LoadUser { .. } => "LOAD_USER",
            Action::LoadRepository { .. } => "LOAD_REPOSITORY",
            Action::LoadDiff { .. } => "LOAD_DIFF",
            Action::Unknown => "UNKNOWN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_tagged_descriptor() {
        let action: Action = serde_json::from_value(json!({
            "type": "LOAD_REPOSITORY",
            "username": "octo",
            "repo": "demo",
            "commits": [{"sha": "abc"}],
        }))
        .unwrap();
        assert_eq!(
            action,
            Action::LoadRepository {
                username: "octo".into(),
                repo: "demo".into(),
                commits: json!([{"sha": "abc"}]),
            }
        );
    }

    #[test]
    fn add_user_repo_is_optional() {
        let action: Action =
            serde_json::from_value(json!({"type": "ADD_USER", "username": "octo"})).unwrap();
        assert_eq!(
            action,
            Action::AddUser {
                username: "octo".into(),
                repo: None
            }
        );
    }

    #[test]
    fn unknown_tag_is_tolerated() {
        let action: Action =
            serde_json::from_value(json!({"type": "@@INIT", "junk": 1})).unwrap();
        assert_eq!(action, Action::Unknown);
        assert_eq!(action.tag(), "UNKNOWN");
    }
}
