//! Application store: the cached dataset, its reducer, the subscription bus
//! and the asynchronous-action middleware.

pub mod action;
pub mod dataset;
pub mod dispatch;
pub mod reducer;

pub use action::Action;
pub use dataset::{Dataset, RepoEntry, UserEntry};
pub use dispatch::{Dispatch, Dispatched, Dispatcher, Task, TaskScope, Thunk};

use crate::error::Result;
use dispatch::Envelope;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&Dataset)>;

pub struct Store {
    state: Arc<Dataset>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    root: TaskScope,
    tx: mpsc::UnboundedSender<Envelope>,
    rx: mpsc::UnboundedReceiver<Envelope>,
}

impl Store {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: Arc::new(Dataset::default()),
            listeners: Vec::new(),
            next_subscription: 0,
            root: TaskScope::new(),
            tx,
            rx,
        }
    }

    /// Current snapshot. It never changes once handed out.
    pub fn state(&self) -> &Arc<Dataset> {
        &self.state
    }

    /// Scope that unscoped procedures run under; cancelled only on shutdown.
    pub fn root_scope(&self) -> &TaskScope {
        &self.root
    }

    /// Reduces a descriptor, or spawns a procedure under the root scope.
    pub fn dispatch(&mut self, item: impl Into<Dispatch>) -> Result<Dispatched> {
        let scope = self.root.clone();
        self.dispatch_in(&scope, item)
    }

    /// Like [`Store::dispatch`], with procedures bound to `scope`.
    pub fn dispatch_in(&mut self, scope: &TaskScope, item: impl Into<Dispatch>) -> Result<Dispatched> {
        match item.into() {
            Dispatch::Action(action) => {
                self.reduce(action)?;
                Ok(Dispatched::Reduced)
            }
            Dispatch::Thunk(thunk) => {
                tracing::debug!(task = thunk.name(), "spawning procedure");
                let dispatcher = Dispatcher::new(self.tx.clone(), scope.token().child_token());
                Ok(Dispatched::Spawned(Task::spawn(thunk, dispatcher)))
            }
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&Dataset) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether `id` was still subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    /// Reduces every completion queued so far without waiting.
    /// Returns how many were applied.
    pub fn apply_pending(&mut self) -> Result<usize> {
        let mut applied = 0;
        while let Ok(envelope) = self.rx.try_recv() {
            if self.apply(envelope)? {
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// Waits for the next queued completion and reduces it. Returns `false`
    /// when it was dropped because its scope had been cancelled.
    pub async fn apply_next(&mut self) -> Result<bool> {
        match self.rx.recv().await {
            Some(envelope) => self.apply(envelope),
            None => Ok(false),
        }
    }

    fn apply(&mut self, envelope: Envelope) -> Result<bool> {
        if envelope.scope.is_cancelled() {
            tracing::debug!(tag = envelope.action.tag(), "dropping completion from cancelled scope");
            return Ok(false);
        }
        self.reduce(envelope.action)?;
        Ok(true)
    }

    fn reduce(&mut self, action: Action) -> Result<()> {
        tracing::debug!(tag = action.tag(), "reducing");
        self.state = reducer::reduce(&self.state, &action).inspect_err(|e| {
            tracing::error!(tag = action.tag(), error = %e, "reducer precondition violated");
        })?;

        let state = Arc::clone(&self.state);
        for (_, listener) in self.listeners.iter_mut() {
            listener(&state);
        }
        Ok(())
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        self.root.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OctoviewError;
    use crate::test_utils::{add_user, load_repository};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn listeners_fire_once_in_registration_order_after_update() {
        let mut store = Store::new();
        let log: Rc<RefCell<Vec<(usize, bool)>>> = Rc::default();
        for n in 0..3 {
            let log = Rc::clone(&log);
            store.subscribe(move |state| {
                log.borrow_mut().push((n, state.user("octo").is_some()));
            });
        }

        store.dispatch(add_user("octo", None)).unwrap();

        assert_eq!(*log.borrow(), vec![(0, true), (1, true), (2, true)]);
    }

    #[test]
    fn listener_sees_the_same_snapshot_as_state() {
        let mut store = Store::new();
        let seen: Rc<RefCell<Option<Dataset>>> = Rc::default();
        let sink = Rc::clone(&seen);
        store.subscribe(move |state| *sink.borrow_mut() = Some(state.clone()));

        store.dispatch(add_user("octo", Some("demo"))).unwrap();
        store
            .dispatch(load_repository("octo", "demo", json!([{"sha": "abc"}])))
            .unwrap();

        assert_eq!(seen.borrow().as_ref(), Some(&**store.state()));
    }

    #[test]
    fn unsubscribed_listener_is_not_invoked() {
        let mut store = Store::new();
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        let id = store.subscribe(move |_| *counter.borrow_mut() += 1);

        store.dispatch(add_user("a", None)).unwrap();
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.dispatch(add_user("b", None)).unwrap();

        assert_eq!(*calls.borrow(), 1);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn listeners_fire_even_when_nothing_changed() {
        let mut store = Store::new();
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        store.subscribe(move |_| *counter.borrow_mut() += 1);

        store.dispatch(add_user("a", None)).unwrap();
        store.dispatch(add_user("a", None)).unwrap();
        store.dispatch(Action::Unknown).unwrap();

        assert_eq!(*calls.borrow(), 3);
    }

    #[test]
    fn precondition_violation_surfaces_and_keeps_state() {
        let mut store = Store::new();
        let before = Arc::clone(store.state());
        let err = store
            .dispatch(load_repository("octo", "demo", json!([])))
            .unwrap_err();
        assert!(matches!(err, OctoviewError::UnknownUser(_)));
        assert!(Arc::ptr_eq(&before, store.state()));
    }

    #[tokio::test]
    async fn thunk_completion_is_reduced_by_the_owner() {
        let mut store = Store::new();
        store.dispatch(add_user("octo", Some("demo"))).unwrap();
        let thunk = Thunk::new("test", |dispatch| async move {
            dispatch.dispatch(load_repository("octo", "demo", json!([{"sha": "abc"}])));
        });

        let task = store.dispatch(thunk).unwrap().task().expect("spawned");
        task.join().await;
        assert!(store.state().repo("octo", "demo").unwrap().commits().is_none());

        assert_eq!(store.apply_pending().unwrap(), 1);
        assert_eq!(
            store.state().repo("octo", "demo").unwrap().commits(),
            Some(&json!([{"sha": "abc"}]))
        );
    }

    #[tokio::test]
    async fn cancelled_scope_drops_queued_completion() {
        let mut store = Store::new();
        store.dispatch(add_user("octo", Some("demo"))).unwrap();
        let scope = TaskScope::new();
        let thunk = Thunk::new("test", |dispatch| async move {
            dispatch.dispatch(load_repository("octo", "demo", json!([{"sha": "abc"}])));
        });

        let task = store.dispatch_in(&scope, thunk).unwrap().task().unwrap();
        task.join().await;
        scope.cancel();

        assert!(!store.apply_next().await.unwrap());
        assert!(store.state().repo("octo", "demo").unwrap().commits().is_none());
    }

    #[tokio::test]
    async fn cancelled_task_never_dispatches() {
        let mut store = Store::new();
        store.dispatch(add_user("octo", Some("demo"))).unwrap();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
        let thunk = Thunk::new("test", |dispatch| async move {
            let _ = release_rx.await;
            dispatch.dispatch(load_repository("octo", "demo", json!([])));
        });

        let task = store.dispatch(thunk).unwrap().task().unwrap();
        task.cancel();
        let _ = release_tx.send(());
        task.join().await;

        assert_eq!(store.apply_pending().unwrap(), 0);
        assert!(!store.root_scope().is_cancelled());
    }

    #[tokio::test]
    async fn completions_apply_in_arrival_order() {
        let mut store = Store::new();
        store.dispatch(add_user("octo", Some("demo"))).unwrap();
        let (slow_tx, slow_rx) = tokio::sync::oneshot::channel::<()>();

        let slow = Thunk::new("slow", |dispatch| async move {
            let _ = slow_rx.await;
            dispatch.dispatch(load_repository("octo", "demo", json!(["first call"])));
        });
        let fast = Thunk::new("fast", |dispatch| async move {
            dispatch.dispatch(load_repository("octo", "demo", json!(["second call"])));
        });

        let slow = store.dispatch(slow).unwrap().task().unwrap();
        let fast = store.dispatch(fast).unwrap().task().unwrap();
        fast.join().await;
        let _ = slow_tx.send(());
        slow.join().await;

        assert_eq!(store.apply_pending().unwrap(), 2);
        assert_eq!(
            store.state().repo("octo", "demo").unwrap().commits(),
            Some(&json!(["first call"]))
        );
    }
}
