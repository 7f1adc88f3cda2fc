use crate::error::{OctoviewError, Result};
use std::fmt;
use std::str::FromStr;

/// Browser-style location: `/`, `/user`, `/user/repo` or `/user/repo/sha`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Home,
    User {
        username: String,
    },
    Repository {
        username: String,
        repo: String,
    },
    Commit {
        username: String,
        repo: String,
        sha: String,
    },
}

impl Route {
    pub fn user(username: &str) -> Self {
        Route::User {
            username: username.to_string(),
        }
    }

    pub fn repository(username: &str, repo: &str) -> Self {
        Route::Repository {
            username: username.to_string(),
            repo: repo.to_string(),
        }
    }

    pub fn commit(username: &str, repo: &str, sha: &str) -> Self {
        Route::Commit {
            username: username.to_string(),
            repo: repo.to_string(),
            sha: sha.to_string(),
        }
    }

    /// The route one level up.
    pub fn parent(&self) -> Route {
        match self {
            Route::Home | Route::User { .. } => Route::Home,
            Route::Repository { username, .. } => Route::user(username),
            Route::Commit { username, repo, .. } => Route::repository(username, repo),
        }
    }
}

impl FromStr for Route {
    type Err = OctoviewError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim_matches('/').split('/').collect();
        if parts.iter().any(|p| p.contains(char::is_whitespace)) {
            return Err(OctoviewError::Route(s.to_string()));
        }
        match parts.as_slice() {
            [""] => Ok(Route::Home),
            [username] => Ok(Route::user(username)),
            [username, repo] if !repo.is_empty() && !username.is_empty() => {
                Ok(Route::repository(username, repo))
            }
            [username, repo, sha] if [username, repo, sha].iter().all(|p| !p.is_empty()) => {
                Ok(Route::commit(username, repo, sha))
            }
            _ => Err(OctoviewError::Route(s.to_string())),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => write!(f, "/"),
            Route::User { username } => write!(f, "/{username}"),
            Route::Repository { username, repo } => write!(f, "/{username}/{repo}"),
            Route::Commit {
                username,
                repo,
                sha,
            } => write!(f, "/{username}/{repo}/{sha}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_depth() {
        assert_eq!("".parse::<Route>().unwrap(), Route::Home);
        assert_eq!("/".parse::<Route>().unwrap(), Route::Home);
        assert_eq!("octo".parse::<Route>().unwrap(), Route::user("octo"));
        assert_eq!(
            "/octo/demo/".parse::<Route>().unwrap(),
            Route::repository("octo", "demo")
        );
        assert_eq!(
            "octo/demo/abc".parse::<Route>().unwrap(),
            Route::commit("octo", "demo", "abc")
        );
    }

    #[test]
    fn rejects_malformed() {
        for bad in ["a/b/c/d", "a//c", "octo cat"] {
            assert!(matches!(bad.parse::<Route>(), Err(OctoviewError::Route(_))), "{bad}");
        }
    }

    #[test]
    fn display_round_trips_and_parent_walks_up() {
        let route = Route::commit("octo", "demo", "abc");
        assert_eq!(route.to_string().parse::<Route>().unwrap(), route);
        assert_eq!(route.parent(), Route::repository("octo", "demo"));
        assert_eq!(route.parent().parent(), Route::user("octo"));
        assert_eq!(Route::user("octo").parent(), Route::Home);
    }
}
