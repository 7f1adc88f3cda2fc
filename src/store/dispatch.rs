use crate::store::action::Action;
use futures::future::BoxFuture;
use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// An asynchronous action procedure: does its I/O, then dispatches through the
/// [`Dispatcher`] it is handed.
pub struct Thunk {
    name: &'static str,
    run: Box<dyn FnOnce(Dispatcher) -> BoxFuture<'static, ()> + Send>,
}

impl Thunk {
    pub fn new<F, Fut>(name: &'static str, f: F) -> Self
    where
        F: FnOnce(Dispatcher) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            name,
            run: Box::new(move |dispatcher| Box::pin(f(dispatcher))),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn into_future(self, dispatcher: Dispatcher) -> BoxFuture<'static, ()> {
        (self.run)(dispatcher)
    }
}

impl std::fmt::Debug for Thunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Thunk").field("name", &self.name).finish()
    }
}

/// Anything the store accepts.
#[derive(Debug)]
pub enum Dispatch {
    Action(Action),
    Thunk(Thunk),
}

impl From<Action> for Dispatch {
    fn from(action: Action) -> Self {
        Dispatch::Action(action)
    }
}

impl From<Thunk> for Dispatch {
    fn from(thunk: Thunk) -> Self {
        Dispatch::Thunk(thunk)
    }
}

/// What a call to `Store::dispatch` did.
#[derive(Debug)]
pub enum Dispatched {
    Reduced,
    Spawned(Task),
}

impl Dispatched {
    pub fn task(self) -> Option<Task> {
        match self {
            Dispatched::Reduced => None,
            Dispatched::Spawned(task) => Some(task),
        }
    }
}

/// A queued follow-up action and the scope that produced it.
#[derive(Debug)]
pub(crate) struct Envelope {
    pub action: Action,
    pub scope: CancellationToken,
}

/// The dispatch function handed to a running [`Thunk`].
///
/// Actions are queued for the store's owner to reduce; once the thunk's scope
/// is cancelled they are dropped instead.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<Envelope>,
    scope: CancellationToken,
}

impl Dispatcher {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Envelope>, scope: CancellationToken) -> Self {
        Self { tx, scope }
    }

    pub fn dispatch(&self, action: Action) {
        if self.scope.is_cancelled() {
            tracing::debug!(tag = action.tag(), "scope cancelled, dropping completion");
            return;
        }
        if self
            .tx
            .send(Envelope {
                action,
                scope: self.scope.clone(),
            })
            .is_err()
        {
            tracing::debug!("store dropped, discarding completion");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.scope.is_cancelled()
    }
}

/// Lifetime that asynchronous work can be tied to.
///
/// Cancelling a scope aborts its in-flight procedures and drops completions
/// they already queued. Child scopes are cancelled with their parent.
#[derive(Debug, Clone, Default)]
pub struct TaskScope {
    token: CancellationToken,
}

impl TaskScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// Handle to a spawned procedure.
#[derive(Debug)]
pub struct Task {
    name: &'static str,
    handle: JoinHandle<()>,
    scope: CancellationToken,
}

impl Task {
    pub(crate) fn spawn(thunk: Thunk, dispatcher: Dispatcher) -> Self {
        let name = thunk.name();
        let scope = dispatcher.scope.clone();
        let cancelled = scope.clone();
        let fut = thunk.into_future(dispatcher);
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {
                    tracing::debug!(task = name, "cancelled before completion");
                }
                _ = fut => {}
            }
        });
        Self {
            name,
            handle,
            scope,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Cancels this task only; its scope and siblings are unaffected.
    pub fn cancel(&self) {
        self.scope.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn join(self) {
        if let Err(e) = self.handle.await {
            if e.is_panic() {
                std::panic::resume_unwind(e.into_panic());
            }
        }
    }
}
