use crate::error::{OctoviewError, Result};
use crate::store::action::Action;
use crate::store::dataset::{Dataset, RepoEntry, UserEntry};
use serde_json::Value;
use std::sync::Arc;

/// Computes the next dataset from `state` and `action`.
///
/// The previous snapshot is never modified. Only the containers on the path
/// the action touches are copied; everything else is shared with `state`. An
/// action that needs a user or repository that was never added is a caller
/// bug and comes back as an error.
pub fn reduce(state: &Arc<Dataset>, action: &Action) -> Result<Arc<Dataset>> {
    match action {
        Action::AddUser { username, repo } => {
            if is_present(state, username, repo.as_deref()) {
                return Ok(Arc::clone(state));
            }
            let mut next = Dataset::clone(state);
            let user = next.ensure_user(username);
            if let Some(repo) = repo {
                user.ensure_repo(repo);
            }
            Ok(Arc::new(next))
        }

        Action::LoadUser {
            username,
            repositories,
        } => {
            if state.user(username).is_none() {
                return Err(OctoviewError::UnknownUser(username.to_string()));
            }
            // A failed request arrives as `null`, a 404 or rate limit as an
            // error object. Either way the user keeps what it had.
            let Some(repositories) = repositories.as_array() else {
                tracing::warn!(
                    username = username.as_str(),
                    body = kind(repositories),
                    "LOAD_USER without a repository list, keeping cached repositories"
                );
                return Ok(Arc::clone(state));
            };
            let mut next = Dataset::clone(state);
            let user = user_mut(&mut next, username)?;
            for repository in repositories {
                let (name, record) = repository_record(repository)?;
                user.replace_repo(&name, RepoEntry::from_record(record));
            }
            Ok(Arc::new(next))
        }

        Action::LoadRepository {
            username,
            repo,
            commits,
        } => {
            let mut next = Dataset::clone(state);
            repo_mut(&mut next, username, repo)?.set_commits(commits.clone());
            Ok(Arc::new(next))
        }

        Action::LoadDiff {
            username,
            repo,
            sha,
            diff,
        } => {
            let mut next = Dataset::clone(state);
            repo_mut(&mut next, username, repo)?.set_diff(sha, diff.clone());
            Ok(Arc::new(next))
        }

        Action::Unknown => Ok(Arc::clone(state)),
    }
}

fn is_present(state: &Dataset, username: &str, repo: Option<&str>) -> bool {
    match (state.user(username), repo) {
        (Some(_), None) => true,
        (Some(user), Some(repo)) => user.repo(repo).is_some(),
        (None, _) => false,
    }
}

fn user_mut<'a>(state: &'a mut Dataset, username: &str) -> Result<&'a mut UserEntry> {
    state
        .user_entry(username)
        .ok_or_else(|| OctoviewError::UnknownUser(username.to_string()))
}

fn repo_mut<'a>(state: &'a mut Dataset, username: &str, repo: &str) -> Result<&'a mut RepoEntry> {
    user_mut(state, username)?
        .repo_entry(repo)
        .ok_or_else(|| OctoviewError::UnknownRepository {
            username: username.to_string(),
            repo: repo.to_string(),
        })
}

fn repository_record(repository: &Value) -> Result<(String, serde_json::Map<String, Value>)> {
    let record = repository
        .as_object()
        .ok_or_else(|| OctoviewError::MalformedPayload {
            action: "LOAD_USER",
            detail: format!("expected a repository object, got {}", kind(repository)),
        })?;
    let name = record
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| OctoviewError::MalformedPayload {
            action: "LOAD_USER",
            detail: "repository record has no string `name`".to_string(),
        })?;
    Ok((name.to_string(), record.clone()))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}


#[cfg(test)]
mod properties {
    use super::*;
    use crate::test_utils::{add_user, load_diff, load_repository, load_user, repo_record};
    use indexmap::IndexMap;
    use proptest::prelude::*;
    use serde_json::json;

    const USERS: usize = 3;
    const REPOS: usize = 4;
    const SHAS: usize = 3;

    #[derive(Debug, Clone)]
    enum Step {
        Add(usize, Option<usize>),
        LoadUser(usize, Vec<usize>),
        LoadRepository(usize, usize),
        LoadDiff(usize, usize, usize),
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            (0..USERS, proptest::option::of(0..REPOS)).prop_map(|(u, r)| Step::Add(u, r)),
            (0..USERS, prop::collection::vec(0..REPOS, 0..4))
                .prop_map(|(u, rs)| Step::LoadUser(u, rs)),
            (0..USERS, 0..REPOS).prop_map(|(u, r)| Step::LoadRepository(u, r)),
            (0..USERS, 0..REPOS, 0..SHAS).prop_map(|(u, r, s)| Step::LoadDiff(u, r, s)),
        ]
    }

    fn user(n: usize) -> String {
        format!("user{n}")
    }

    fn repo(n: usize) -> String {
        format!("repo{n}")
    }

    fn sha(n: usize) -> String {
        format!("{n:07x}")
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct ModelRepo {
        commits: bool,
        shas: Vec<String>,
    }

    type Model = IndexMap<String, IndexMap<String, ModelRepo>>;

    /// Applies `step` to `model` and returns the matching action, or `None`
    /// when the user or repository it needs was never added.
    fn admit(model: &mut Model, step: &Step) -> Option<Action> {
        match step {
            Step::Add(u, r) => {
                let entry = model.entry(user(*u)).or_default();
                let r = r.map(repo);
                if let Some(r) = &r {
                    entry.entry(r.clone()).or_default();
                }
                Some(add_user(&user(*u), r.as_deref()))
            }
            Step::LoadUser(u, rs) => {
                let entry = model.get_mut(&user(*u))?;
                for r in rs {
                    entry.insert(repo(*r), ModelRepo::default());
                }
                let body = rs.iter().map(|r| repo_record(&user(*u), &repo(*r))).collect();
                Some(load_user(&user(*u), Value::Array(body)))
            }
            Step::LoadRepository(u, r) => {
                model.get_mut(&user(*u))?.get_mut(&repo(*r))?.commits = true;
                Some(load_repository(&user(*u), &repo(*r), json!([{"sha": sha(0)}])))
            }
            Step::LoadDiff(u, r, s) => {
                let entry = model.get_mut(&user(*u))?.get_mut(&repo(*r))?;
                if !entry.shas.contains(&sha(*s)) {
                    entry.shas.push(sha(*s));
                }
                Some(load_diff(&user(*u), &repo(*r), &sha(*s), json!({"files": []})))
            }
        }
    }

    type Shape = Vec<(String, Vec<(String, ModelRepo)>)>;

    fn model_shape(model: &Model) -> Shape {
        model
            .iter()
            .map(|(u, repos)| {
                let repos = repos.iter().map(|(r, m)| (r.clone(), m.clone())).collect();
                (u.clone(), repos)
            })
            .collect()
    }

    fn dataset_shape(state: &Dataset) -> Shape {
        state
            .usernames()
            .map(|u| {
                let repos = state
                    .user(u)
                    .map(|entry| {
                        entry
                            .repos()
                            .map(|(r, e)| {
                                let m = ModelRepo {
                                    commits: e.commits().is_some(),
                                    shas: e.shas().map(str::to_string).collect(),
                                };
                                (r.to_string(), m)
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                (u.to_string(), repos)
            })
            .collect()
    }

    fn replay(steps: &[Step]) -> (Model, Arc<Dataset>) {
        let mut model = Model::new();
        let mut state = Arc::new(Dataset::default());
        for step in steps {
            if let Some(action) = admit(&mut model, step) {
                state = reduce(&state, &action).expect("admitted action has its precondition");
            }
        }
        (model, state)
    }

    proptest! {
        #[test]
        fn keys_are_exactly_those_the_sequence_implies(steps in prop::collection::vec(step(), 0..40)) {
            let (model, state) = replay(&steps);
            prop_assert_eq!(dataset_shape(&state), model_shape(&model));
        }

        #[test]
        fn add_user_twice_equals_once(
            steps in prop::collection::vec(step(), 0..30),
            u in 0..USERS,
            r in proptest::option::of(0..REPOS),
        ) {
            let (_, state) = replay(&steps);
            let add = add_user(&user(u), r.map(repo).as_deref());
            let once = reduce(&state, &add).unwrap();
            let twice = reduce(&once, &add).unwrap();
            prop_assert_eq!(&*once, &*twice);
            prop_assert!(Arc::ptr_eq(&once, &twice));
        }

        #[test]
        fn load_user_clears_what_was_loaded_under_listed_repos(
            steps in prop::collection::vec(step(), 0..30),
            u in 0..USERS,
            listed in prop::collection::vec(0..REPOS, 1..4),
        ) {
            let (_, state) = replay(&steps);
            let state = reduce(&state, &add_user(&user(u), None)).unwrap();
            let body = listed.iter().map(|r| repo_record(&user(u), &repo(*r))).collect();
            let next = reduce(&state, &load_user(&user(u), Value::Array(body))).unwrap();

            let before = state.user(&user(u)).unwrap();
            let after = next.user(&user(u)).unwrap();
            for n in 0..REPOS {
                let name = repo(n);
                if listed.contains(&n) {
                    let entry = after.repo(&name).unwrap();
                    prop_assert!(entry.commits().is_none());
                    prop_assert_eq!(entry.shas().count(), 0);
                    prop_assert_eq!(entry.str_field("name"), Some(name.as_str()));
                } else if let Some(old) = before.repo_arc(&name) {
                    prop_assert!(Arc::ptr_eq(old, after.repo_arc(&name).unwrap()));
                } else {
                    prop_assert!(after.repo(&name).is_none());
                }
            }
        }
    }
}
