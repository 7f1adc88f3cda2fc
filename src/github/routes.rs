//! Upstream API paths, relative to the configured base.

pub fn user_repos(username: &str) -> String {
    format!("users/{username}/repos")
}

pub fn repo_commits(username: &str, repo: &str) -> String {
    format!("repos/{username}/{repo}/commits")
}

pub fn commit(username: &str, repo: &str, sha: &str) -> String {
    format!("repos/{username}/{repo}/commits/{sha}")
}
