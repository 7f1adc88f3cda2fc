//! Request/response correlation on top of the worker's one-way channels.

use crate::error::{OctoviewError, Result};
use crate::highlight::protocol::{HighlightReply, HighlightRequest, RequestId, RequestIds};
use crate::highlight::worker::Worker;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::mpsc;

pub type Continuation = Box<dyn FnMut(String)>;

/// How a reply finds the continuation waiting for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Correlation {
    /// By the per-request id; each continuation runs at most once.
    Request,
    /// By the caller's key. A later registration under the same key replaces
    /// the earlier continuation, and entries are never removed, so files of
    /// one commit all land in the last-registered continuation.
    Key,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Slot {
    Request(RequestId),
    Key(String),
}

pub struct HighlightChannel {
    correlation: Correlation,
    requests: Option<mpsc::UnboundedSender<HighlightRequest>>,
    replies: mpsc::UnboundedReceiver<HighlightReply>,
    registry: HashMap<Slot, Continuation>,
    ids: RequestIds,
    worker: Option<Worker>,
}

impl HighlightChannel {
    /// Starts the shared worker thread.
    pub fn spawn(correlation: Correlation) -> Result<Self> {
        let (req_tx, req_rx) = mpsc::unbounded_channel();
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        let worker = Worker::spawn(req_rx, reply_tx)?;
        let mut channel = Self::from_parts(correlation, req_tx, reply_rx);
        channel.worker = Some(worker);
        Ok(channel)
    }

    /// Builds a channel over an externally driven worker.
    pub fn from_parts(
        correlation: Correlation,
        requests: mpsc::UnboundedSender<HighlightRequest>,
        replies: mpsc::UnboundedReceiver<HighlightReply>,
    ) -> Self {
        Self {
            correlation,
            requests: Some(requests),
            replies,
            registry: HashMap::new(),
            ids: RequestIds::default(),
            worker: None,
        }
    }

    pub fn correlation(&self) -> Correlation {
        self.correlation
    }

    /// Sends `source` to the worker; `continuation` receives the markup.
    pub fn highlight(
        &mut self,
        key: impl Into<String>,
        source: impl Into<String>,
        continuation: impl FnMut(String) + 'static,
    ) -> Result<RequestId> {
        let key = key.into();
        let id = self.ids.next_id();
        let slot = self.slot(id, &key);
        let requests = self.requests.as_ref().ok_or(OctoviewError::WorkerGone)?;
        requests
            .send(HighlightRequest {
                id,
                key,
                source: source.into(),
            })
            .map_err(|_| OctoviewError::WorkerGone)?;
        if self.registry.insert(slot, Box::new(continuation)).is_some() {
            tracing::trace!(%id, "replaced an awaiting continuation");
        }
        Ok(id)
    }

    /// Routes one reply to its continuation. Returns whether one was found.
    pub fn deliver(&mut self, reply: HighlightReply) -> bool {
        match self.correlation {
            Correlation::Request => match self.registry.remove(&Slot::Request(reply.id)) {
                Some(mut continuation) => {
                    tracing::trace!(id = %reply.id, "delivering highlight");
                    continuation(reply.source);
                    true
                }
                None => {
                    tracing::debug!(id = %reply.id, "no continuation awaiting reply");
                    false
                }
            },
            Correlation::Key => match self.registry.get_mut(&Slot::Key(reply.key.clone())) {
                Some(continuation) => {
                    tracing::trace!(key = %reply.key, "delivering highlight");
                    continuation(reply.source);
                    true
                }
                None => false,
            },
        }
    }

    /// Delivers every reply that has already arrived.
    pub fn deliver_pending(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok(reply) = self.replies.try_recv() {
            if self.deliver(reply) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Waits for the next reply. `None` once the worker has stopped.
    pub async fn recv(&mut self) -> Option<HighlightReply> {
        self.replies.recv().await
    }

    /// Forgets a request; its reply, if it still comes, is dropped.
    pub fn cancel(&mut self, id: RequestId, key: &str) -> bool {
        let slot = self.slot(id, key);
        self.registry.remove(&slot).is_some()
    }

    /// Number of registered continuations.
    pub fn pending(&self) -> usize {
        self.registry.len()
    }

    /// Stops the worker and waits for it to exit.
    pub fn shutdown(&mut self) {
        self.requests = None;
        if let Some(worker) = self.worker.take() {
            worker.join();
        }
    }

    fn slot(&self, id: RequestId, key: &str) -> Slot {
        match self.correlation {
            Correlation::Request => Slot::Request(id),
            Correlation::Key => Slot::Key(key.to_string()),
        }
    }
}

impl Drop for HighlightChannel {
    fn drop(&mut self) {
        self.shutdown();
    }
}
