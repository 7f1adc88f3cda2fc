use crate::actions::ActionFactory;
use crate::error::{OctoviewError, Result};
use crate::event::AppEvent;
use crate::highlight::{HighlightChannel, RequestId};
use crate::route::Route;
use crate::store::{Store, SubscriptionId, Task, TaskScope};
use crate::ui::{
    commit_list::CommitList,
    diff_view::{DiffView, FilePane},
    header_bar::HeaderBar,
    input::{self, Command},
    keep_visible,
    repository_list::{self, RepositoryList},
    status_bar::StatusBar,
};
use crate::views::{self, CommitSummary, RepoSummary};
use itertools::Itertools;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    text::Line,
    widgets::Paragraph,
    Frame,
};
use std::sync::Arc;
use tokio::sync::mpsc;

pub enum Screen {
    Home,
    Repositories {
        username: String,
        repos: Vec<RepoSummary>,
    },
    Commits {
        username: String,
        repo: String,
        commits: Vec<CommitSummary>,
    },
    Diff {
        username: String,
        repo: String,
        sha: String,
        files: Vec<FilePane>,
        requests: Vec<RequestId>,
    },
}

/// Resources owned by the currently mounted route.
struct Mounted {
    id: u64,
    scope: TaskScope,
    subscription: Option<SubscriptionId>,
    tasks: Vec<Task>,
}

pub struct App {
    actions: ActionFactory,
    tx: mpsc::UnboundedSender<AppEvent>,

    pub route: Route,
    pub screen: Screen,
    mounted: Option<Mounted>,
    next_view: u64,

    pub input: String,
    pub input_focused: bool,
    pub selected: usize,
    pub scroll: usize,

    pub error: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(actions: ActionFactory, tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            actions,
            tx,
            route: Route::Home,
            screen: Screen::Home,
            mounted: None,
            next_view: 0,
            input: String::new(),
            input_focused: true,
            selected: 0,
            scroll: 0,
            error: None,
            should_quit: false,
        }
    }

    /// Unmounts the current route and mounts `route`.
    pub fn navigate(
        &mut self,
        route: Route,
        store: &mut Store,
        highlighter: &mut HighlightChannel,
    ) -> Result<()> {
        tracing::debug!(from = %self.route, to = %route, "navigate");
        self.unmount(store, highlighter);
        self.route = route;
        self.selected = 0;
        self.scroll = 0;
        self.error = None;
        self.mount(store, highlighter)
    }

    fn mount(&mut self, store: &mut Store, highlighter: &mut HighlightChannel) -> Result<()> {
        let id = self.next_view;
        self.next_view += 1;
        let scope = store.root_scope().child();

        let (screen, subscription) = match &self.route {
            Route::Home => {
                self.input_focused = true;
                (Screen::Home, None)
            }
            Route::User { username } => {
                store.dispatch(ActionFactory::add_user(username, None))?;
                let screen = Screen::Repositories {
                    username: username.clone(),
                    repos: Vec::new(),
                };
                (screen, Some(self.subscribe(store)))
            }
            Route::Repository { username, repo } => {
                store.dispatch(ActionFactory::add_user(username, Some(repo.as_str())))?;
                let screen = Screen::Commits {
                    username: username.clone(),
                    repo: repo.clone(),
                    commits: Vec::new(),
                };
                (screen, Some(self.subscribe(store)))
            }
            Route::Commit {
                username,
                repo,
                sha,
            } => {
                store.dispatch(ActionFactory::add_user(username, Some(repo.as_str())))?;
                let screen = Screen::Diff {
                    username: username.clone(),
                    repo: repo.clone(),
                    sha: sha.clone(),
                    files: Vec::new(),
                    requests: Vec::new(),
                };
                (screen, Some(self.subscribe(store)))
            }
        };

        if !matches!(self.route, Route::Home) {
            self.input_focused = false;
        }
        self.screen = screen;
        self.mounted = Some(Mounted {
            id,
            scope,
            subscription,
            tasks: Vec::new(),
        });
        self.load(store)?;
        self.refresh(store, highlighter)
    }

    fn unmount(&mut self, store: &mut Store, highlighter: &mut HighlightChannel) {
        let Some(mounted) = self.mounted.take() else {
            return;
        };
        mounted.scope.cancel();
        if let Some(subscription) = mounted.subscription {
            store.unsubscribe(subscription);
        }
        if let Screen::Diff { sha, requests, .. } = &self.screen {
            for id in requests {
                highlighter.cancel(*id, sha);
            }
        }
    }

    fn subscribe(&self, store: &mut Store) -> SubscriptionId {
        let tx = self.tx.clone();
        store.subscribe(move |_| {
            let _ = tx.send(AppEvent::StoreChanged);
        })
    }

    /// Fires the fetch the mounted route depends on.
    fn load(&mut self, store: &mut Store) -> Result<()> {
        let Some(mounted) = self.mounted.as_mut() else {
            return Ok(());
        };
        let thunk = match &self.route {
            Route::Home => return Ok(()),
            Route::User { username } => self.actions.load_user(username),
            Route::Repository { username, repo } => self.actions.load_repository(username, repo),
            Route::Commit {
                username,
                repo,
                sha,
            } => self.actions.load_diff(username, repo, sha),
        };
        mounted.tasks.retain(|t| !t.is_finished());
        if let Some(task) = store.dispatch_in(&mounted.scope, thunk)?.task() {
            mounted.tasks.push(task);
        }
        Ok(())
    }

    /// Re-derives the mounted screen's slice from the current dataset.
    pub fn refresh(&mut self, store: &Store, highlighter: &mut HighlightChannel) -> Result<()> {
        let state = Arc::clone(store.state());
        let view = self.mounted.as_ref().map(|m| m.id).unwrap_or_default();

        let len = match &mut self.screen {
            Screen::Home => 0,
            Screen::Repositories { username, repos } => {
                *repos = views::repository_list(&state, username);
                repos.len()
            }
            Screen::Commits {
                username,
                repo,
                commits,
            } => {
                *commits = views::commit_list(&state, username, repo);
                commits.len()
            }
            Screen::Diff {
                username,
                repo,
                sha,
                files,
                requests,
            } => {
                if files.is_empty() {
                    let entries = views::diff_files(&state, username, repo, sha);
                    *files = entries.iter().map(FilePane::new).collect();
                    for (i, entry) in entries.iter().enumerate() {
                        let Some(patch) = &entry.patch else { continue };
                        let tx = self.tx.clone();
                        let id = highlighter.highlight(sha.as_str(), patch.as_str(), move |markup| {
                            let _ = tx.send(AppEvent::Highlighted {
                                view,
                                file: i,
                                markup,
                            });
                        })?;
                        requests.push(id);
                    }
                }
                0
            }
        };

        self.selected = self.selected.min(len.saturating_sub(1));
        Ok(())
    }

    pub fn handle_event(
        &mut self,
        event: AppEvent,
        store: &mut Store,
        highlighter: &mut HighlightChannel,
    ) -> Result<()> {
        match event {
            AppEvent::Key(key) => {
                let command = input::map_key(key, self.input_focused);
                self.handle_command(command, store, highlighter)
            }
            AppEvent::Resize => Ok(()),
            AppEvent::StoreChanged => self.refresh(store, highlighter),
            AppEvent::Highlighted { view, file, markup } => {
                if self.mounted.as_ref().map(|m| m.id) != Some(view) {
                    return Ok(());
                }
                if let Screen::Diff { files, .. } = &mut self.screen {
                    if let Some(pane) = files.get_mut(file) {
                        pane.set_markup(&markup);
                    }
                }
                Ok(())
            }
        }
    }

    fn handle_command(
        &mut self,
        command: Command,
        store: &mut Store,
        highlighter: &mut HighlightChannel,
    ) -> Result<()> {
        match command {
            Command::Quit => self.should_quit = true,
            Command::Down => match &self.screen {
                Screen::Diff { files, .. } => {
                    if self.scroll + 1 < DiffView::total_lines(files) {
                        self.scroll += 1;
                    }
                }
                Screen::Repositories { repos, .. } if self.selected + 1 < repos.len() => {
                    self.selected += 1;
                }
                Screen::Commits { commits, .. } if self.selected + 1 < commits.len() => {
                    self.selected += 1;
                }
                _ => {}
            },
            Command::Up => match &self.screen {
                Screen::Diff { .. } => self.scroll = self.scroll.saturating_sub(1),
                _ => self.selected = self.selected.saturating_sub(1),
            },
            Command::Open => {
                if let Some(route) = self.selected_route() {
                    self.navigate(route, store, highlighter)?;
                }
            }
            Command::Back => {
                if self.route != Route::Home {
                    self.navigate(self.route.parent(), store, highlighter)?;
                }
            }
            Command::Refresh => self.load(store)?,
            Command::FocusInput => self.input_focused = true,
            Command::InputChar(c) => self.input.push(c),
            Command::InputBackspace => {
                self.input.pop();
            }
            Command::InputSubmit => match self.input.trim().parse::<Route>() {
                Ok(Route::Home) => {}
                Ok(route) => {
                    self.input.clear();
                    self.navigate(route, store, highlighter)?;
                }
                Err(e) => self.error = Some(e.to_string()),
            },
            Command::InputCancel => {
                self.input.clear();
                self.input_focused = matches!(self.route, Route::Home);
            }
            Command::None => {}
        }
        Ok(())
    }

    fn selected_route(&self) -> Option<Route> {
        match &self.screen {
            Screen::Repositories { repos, .. } => repos
                .get(self.selected)
                .map(|r| Route::repository(&r.owner, &r.name)),
            Screen::Commits {
                username,
                repo,
                commits,
            } => commits
                .get(self.selected)
                .filter(|c| !c.sha.is_empty())
                .map(|c| Route::commit(username, repo, &c.sha)),
            _ => None,
        }
    }

    /// Puts a malformed payload in the status bar. Precondition errors are
    /// programming errors and still propagate.
    pub fn absorb<T>(&mut self, result: Result<T>) -> Result<()> {
        match result {
            Ok(_) => Ok(()),
            Err(e @ OctoviewError::MalformedPayload { .. }) => {
                tracing::warn!(error = %e, "dropping malformed payload");
                self.error = Some(e.to_string());
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.mounted
            .as_ref()
            .is_some_and(|m| m.tasks.iter().any(|t| !t.is_finished()))
    }

    pub fn render(&mut self, frame: &mut Frame, pending_highlights: usize) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(frame.area());

        frame.render_widget(
            HeaderBar {
                input: &self.input,
                focused: self.input_focused,
            },
            chunks[0],
        );

        let body = chunks[1];
        let visible = body.height.saturating_sub(2) as usize;
        match &self.screen {
            Screen::Home => {
                let lines = [
                    "Type a GitHub username above and press enter.",
                    "Routes: user, user/repo, user/repo/sha",
                ]
                .into_iter()
                .map(Line::from)
                .collect_vec();
                frame.render_widget(
                    Paragraph::new(lines).style(Style::default().fg(crate::ui::theme::DIM_TEXT)),
                    body,
                );
            }
            Screen::Repositories { username, repos } => {
                self.scroll = keep_visible(
                    self.selected,
                    self.scroll,
                    visible / repository_list::ROWS_PER_ITEM,
                );
                frame.render_widget(
                    RepositoryList {
                        username,
                        repos,
                        selected: self.selected,
                        scroll: self.scroll,
                    },
                    body,
                );
            }
            Screen::Commits {
                username,
                repo,
                commits,
            } => {
                self.scroll = keep_visible(self.selected, self.scroll, visible);
                frame.render_widget(
                    CommitList {
                        username,
                        repo,
                        commits,
                        selected: self.selected,
                        scroll: self.scroll,
                        now: chrono::Utc::now(),
                    },
                    body,
                );
            }
            Screen::Diff {
                username,
                repo,
                sha,
                files,
                ..
            } => {
                frame.render_widget(
                    DiffView {
                        username,
                        repo,
                        sha,
                        files,
                        scroll: self.scroll,
                    },
                    body,
                );
            }
        }

        let route = self.route.to_string();
        frame.render_widget(
            StatusBar {
                route: &route,
                loading: self.is_loading(),
                pending_highlights,
                error: self.error.as_deref(),
            },
            chunks[2],
        );
    }

    /// Cancels everything the mounted route started.
    pub fn shutdown(&mut self, store: &mut Store, highlighter: &mut HighlightChannel) {
        self.unmount(store, highlighter);
    }

    #[cfg(test)]
    async fn join_tasks(&mut self) {
        let tasks = self
            .mounted
            .as_mut()
            .map(|m| std::mem::take(&mut m.tasks))
            .unwrap_or_default();
        for task in tasks {
            task.join().await;
        }
    }
}
