//! Message refresh for an open chat.
//!
//! The document store has no push channel, so an open chat re-fetches its
//! messages on a fixed interval. The poller runs on its own task and stops
//! when [`ChatPoller::stop`] is called or the poller is dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use bozor_core::{ChatId, Message};

use crate::db::ChatRepository;
use crate::store::DocumentStore;

/// Background refresh of one chat's messages.
pub struct ChatPoller {
    messages: watch::Receiver<Vec<Message>>,
    handle: JoinHandle<()>,
}

impl ChatPoller {
    /// Start polling `chat_id` every `every`. The first fetch happens
    /// immediately.
    #[must_use]
    pub fn start(store: Arc<dyn DocumentStore>, chat_id: ChatId, every: Duration) -> Self {
        let (tx, messages) = watch::channel(Vec::new());
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if tx.is_closed() {
                    break;
                }
                match ChatRepository::new(store.as_ref()).get_messages(&chat_id).await {
                    Ok(fetched) => {
                        tx.send_if_modified(|current| {
                            if *current == fetched {
                                false
                            } else {
                                *current = fetched;
                                true
                            }
                        });
                    }
                    Err(e) => tracing::warn!(chat_id = %chat_id, error = %e, "Chat refresh failed"),
                }
            }
            tracing::debug!(chat_id = %chat_id, "Chat poller stopped");
        });

        Self { messages, handle }
    }

    /// Messages as of the last successful fetch.
    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        self.messages.borrow().clone()
    }

    /// Watch for new messages.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<Message>> {
        self.messages.clone()
    }

    /// Whether the background task is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop polling.
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for ChatPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
