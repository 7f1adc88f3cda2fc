use crate::error::Result;
use crate::highlight::diff;
use crate::highlight::protocol::{HighlightReply, HighlightRequest};
use std::thread::JoinHandle;
use tokio::sync::mpsc;

/// The background highlighter. It shares nothing with the caller; requests
/// and replies only travel over the two channels.
pub struct Worker {
    thread: Option<JoinHandle<()>>,
}

impl Worker {
    pub fn spawn(
        requests: mpsc::UnboundedReceiver<HighlightRequest>,
        replies: mpsc::UnboundedSender<HighlightReply>,
    ) -> Result<Self> {
        let thread = std::thread::Builder::new()
            .name("highlight-worker".to_string())
            .spawn(move || run(requests, replies))?;
        Ok(Self {
            thread: Some(thread),
        })
    }

    /// Waits for the thread once the request side has been dropped.
    pub fn join(mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn run(
    mut requests: mpsc::UnboundedReceiver<HighlightRequest>,
    replies: mpsc::UnboundedSender<HighlightReply>,
) {
    while let Some(request) = requests.blocking_recv() {
        let markup = diff::highlight(&request.source);
        if replies.send(request.reply(markup)).is_err() {
            break;
        }
    }
    tracing::debug!("highlight worker stopped");
}
