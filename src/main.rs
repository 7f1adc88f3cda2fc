mod actions;
mod app;
mod config;
mod error;
mod event;
mod github;
mod highlight;
mod logging;
mod route;
mod store;
#[cfg(test)]
mod test_utils;
mod ui;
mod views;

use actions::ActionFactory;
use app::App;
use clap::{Parser, ValueEnum};
use config::{Config, Overrides};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use event::AppEvent;
use futures::StreamExt;
use github::client::GitHubClient;
use highlight::{Correlation, HighlightChannel, HighlightReply};
use route::Route;
use std::sync::Arc;
use store::Store;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CorrelationArg {
    Request,
    Key,
}

impl From<CorrelationArg> for Correlation {
    fn from(arg: CorrelationArg) -> Self {
        match arg {
            CorrelationArg::Request => Correlation::Request,
            CorrelationArg::Key => Correlation::Key,
        }
    }
}

#[derive(Parser)]
#[command(
    name = "octoview",
    about = "Browse a GitHub user's repositories, commits and diffs"
)]
struct Cli {
    #[arg(help = "Where to start: user, user/repo or user/repo/sha")]
    route: Option<String>,

    #[arg(long, help = "Base URL of the GitHub REST API")]
    api_base: Option<String>,

    #[arg(long, value_enum, help = "How highlight replies find their caller")]
    correlation: Option<CorrelationArg>,

    #[arg(long, help = "Fetch the route, print the cached data as JSON and exit")]
    dump: bool,

    #[arg(long, help = "Print the effective configuration as TOML and exit")]
    print_config: bool,
}

/// What woke the main loop.
enum Wake {
    Applied(error::Result<bool>),
    Highlight(Option<HighlightReply>),
    App(Option<AppEvent>),
}

// The store and highlight continuations are !Send; everything stays on one thread.
#[tokio::main(flavor = "current_thread")]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load(Overrides {
        api_base: cli.api_base.clone(),
        correlation: cli.correlation.map(Into::into),
    });

    if cli.print_config {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let route: Route = cli.route.as_deref().unwrap_or("/").parse()?;
    let client = GitHubClient::new(&config.api_base)?;
    let actions = ActionFactory::new(Arc::new(client));

    if cli.dump {
        logging::init(&config, logging::Sink::Stderr)?;
        return dump(route, actions).await;
    }
    logging::init(&config, logging::Sink::FileOnly)?;

    let mut store = Store::new();
    let mut highlighter = HighlightChannel::spawn(config.correlation)?;
    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();
    let mut app = App::new(actions, tx.clone());
    app.navigate(route, &mut store, &mut highlighter)?;

    // Install panic hook before entering raw mode so terminal is restored on panic
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(std::io::stdout(), LeaveAlternateScreen);
        default_hook(info);
    }));

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let input_tx = tx.clone();
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        while let Some(Ok(event)) = reader.next().await {
            let app_event = match event {
                Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
                Event::Resize(_, _) => Some(AppEvent::Resize),
                _ => None,
            };
            if let Some(e) = app_event {
                if input_tx.send(e).is_err() {
                    break;
                }
            }
        }
    });

    let outcome = run(&mut terminal, &mut app, &mut store, &mut highlighter, &mut rx).await;

    app.shutdown(&mut store, &mut highlighter);
    highlighter.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    outcome
}

async fn run(
    terminal: &mut ratatui::Terminal<ratatui::backend::CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    store: &mut Store,
    highlighter: &mut HighlightChannel,
    rx: &mut mpsc::UnboundedReceiver<AppEvent>,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|f| app.render(f, highlighter.pending()))?;

        let wake = tokio::select! {
            applied = store.apply_next() => Wake::Applied(applied),
            reply = highlighter.recv() => Wake::Highlight(reply),
            event = rx.recv() => Wake::App(event),
        };

        match wake {
            Wake::Applied(applied) => app.absorb(applied)?,
            Wake::Highlight(Some(reply)) => {
                highlighter.deliver(reply);
            }
            Wake::Highlight(None) => return Err(error::OctoviewError::WorkerGone.into()),
            Wake::App(Some(event)) => app.handle_event(event, store, highlighter)?,
            Wake::App(None) => break,
        }

        app.absorb(store.apply_pending())?;
        highlighter.deliver_pending();
        while let Ok(pending) = rx.try_recv() {
            app.handle_event(pending, store, highlighter)?;
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Loads `route` without a terminal and prints the resulting dataset.
async fn dump(
    route: Route,
    actions: ActionFactory,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let mut store = Store::new();
    let thunk = match &route {
        Route::Home => None,
        Route::User { username } => {
            store.dispatch(ActionFactory::add_user(username, None))?;
            Some(actions.load_user(username))
        }
        Route::Repository { username, repo } => {
            store.dispatch(ActionFactory::add_user(username, Some(repo.as_str())))?;
            Some(actions.load_repository(username, repo))
        }
        Route::Commit {
            username,
            repo,
            sha,
        } => {
            store.dispatch(ActionFactory::add_user(username, Some(repo.as_str())))?;
            Some(actions.load_diff(username, repo, sha))
        }
    };

    if let Some(thunk) = thunk {
        if let Some(task) = store.dispatch(thunk)?.task() {
            task.join().await;
        }
        store.apply_pending()?;
    }

    println!("{}", serde_json::to_string_pretty(&**store.state())?);
    Ok(())
}
