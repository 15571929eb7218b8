//! Update delivery to the presentation layer
//!
//! ## Delivery policy
//!
//! Latest value wins. Publishing replaces the stored event and never waits
//! for subscribers, so the polling loop cannot be blocked by a slow consumer.
//! A subscriber sees every event at most once and always in round order, but
//! may skip events if it falls behind; gaps show up in
//! [`UpdateEvent::sequence`].

use std::sync::Arc;

use tokio::sync::watch;
use tracing::trace;

use crate::UpdateEvent;

pub struct UpdatePublisher {
    sender: watch::Sender<Option<Arc<UpdateEvent>>>,
}

impl UpdatePublisher {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    pub fn subscribe(&self) -> UpdateSubscriber {
        UpdateSubscriber {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn publish(&self, event: UpdateEvent) {
        let sequence = event.sequence;
        // send_replace stores the value even without receivers
        self.sender.send_replace(Some(Arc::new(event)));

        match self.sender.receiver_count() {
            0 => trace!("no subscribers for round {sequence} (this is OK)"),
            n => trace!("published round {sequence} to {n} subscribers"),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for UpdatePublisher {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side handed to presentation code
///
/// Cheap to clone; each clone tracks what it has seen independently.
#[derive(Debug, Clone)]
pub struct UpdateSubscriber {
    receiver: watch::Receiver<Option<Arc<UpdateEvent>>>,
}

impl UpdateSubscriber {
    /// Wait for the next event this subscriber has not seen yet.
    ///
    /// Returns `None` once the publisher is gone and nothing unseen remains.
    pub async fn next_update(&mut self) -> Option<Arc<UpdateEvent>> {
        loop {
            self.receiver.changed().await.ok()?;
            if let Some(event) = self.receiver.borrow_and_update().clone() {
                return Some(event);
            }
        }
    }

    /// Most recent event, if any round has completed.
    pub fn latest(&self) -> Option<Arc<UpdateEvent>> {
        self.receiver.borrow().clone()
    }
}
