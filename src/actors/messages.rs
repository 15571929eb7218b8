//! Message types for the poller actor

use tokio::sync::oneshot;

use crate::UpdateEvent;

/// Commands that can be sent to the PollerActor
#[derive(Debug)]
pub enum PollerCommand {
    /// Run a round now instead of waiting for the interval
    ///
    /// If a round is already in flight, the response is that round's event.
    PollNow {
        respond_to: oneshot::Sender<UpdateEvent>,
    },

    /// Stop the poller
    ///
    /// An in-flight round is abandoned and never published.
    Shutdown,
}

/// Lifecycle of the polling loop
///
/// ```text
/// Idle → Polling → Sleeping → Polling → ...
///            └──────────┴────→ Stopped
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Polling,
    Sleeping,
    Stopped,
}
