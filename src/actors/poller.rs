//! PollerActor - Drives poll rounds on a fixed interval
//!
//! ## Message Flow
//!
//! ```text
//! Polling: run round → decide alert → publish UpdateEvent → Sleeping
//! Sleeping: interval elapsed ──────────────────────────────→ Polling
//!     ↑
//!     └─── Commands (PollNow, Shutdown)
//! ```
//!
//! The alert state is owned by the actor and only touched between rounds, so
//! each round's decision is a single serialized step even though the queries
//! inside a round run concurrently.
//!
//! A shutdown received mid-round drops the in-flight queries (closing their
//! sockets) and publishes nothing for that round.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, instrument, trace, warn};

use crate::{
    Endpoint, PollRound, UpdateEvent,
    config::{AlertPolicy, WatchConfig},
    error::ResolutionError,
    monitors::{
        occupancy::{self, AlertState},
        round::RoundExecutor,
    },
    query::StatusQuery,
    resolver::{Resolve, resolve_endpoints},
};

use super::{
    messages::{PollerCommand, SchedulerState},
    publisher::{UpdatePublisher, UpdateSubscriber},
};

/// Actor that polls every endpoint once per interval
pub struct PollerActor {
    /// Query fan-out over the resolved endpoints
    executor: RoundExecutor,

    /// Alert thresholds and cooldown
    policy: AlertPolicy,

    /// Pause between rounds
    interval: Duration,

    /// Debounce state, written only after a round completes
    alert_state: AlertState,

    /// Command receiver for control messages
    command_rx: mpsc::Receiver<PollerCommand>,

    /// Outbound updates
    publisher: UpdatePublisher,

    /// Current lifecycle state, observable through the handle
    state_tx: watch::Sender<SchedulerState>,
}

impl PollerActor {
    pub fn new(
        executor: RoundExecutor,
        policy: AlertPolicy,
        interval: Duration,
        command_rx: mpsc::Receiver<PollerCommand>,
        publisher: UpdatePublisher,
        state_tx: watch::Sender<SchedulerState>,
    ) -> Self {
        Self {
            executor,
            policy,
            interval,
            alert_state: AlertState::never(),
            command_rx,
            publisher,
            state_tx,
        }
    }

    /// Run the actor's main loop
    ///
    /// Runs until a Shutdown command is received or every handle is dropped.
    #[instrument(skip(self), fields(endpoints = self.executor.endpoints().len()))]
    pub async fn run(mut self) {
        debug!("starting poller actor");

        // PollNow callers waiting for the next completed round
        let mut waiting = Vec::new();

        loop {
            self.set_state(SchedulerState::Polling);

            let Some(round) = self.poll_round(&mut waiting).await else {
                break;
            };

            let event = self.conclude(round);
            for respond_to in waiting.drain(..) {
                let _ = respond_to.send(event.clone());
            }
            self.publisher.publish(event);

            self.set_state(SchedulerState::Sleeping);

            if !self.sleep(&mut waiting).await {
                break;
            }
        }

        self.set_state(SchedulerState::Stopped);
        debug!("poller actor stopped");
    }

    /// Run one round, collecting commands that arrive meanwhile.
    ///
    /// Returns `None` if the actor should stop; the round is then dropped.
    async fn poll_round(
        &mut self,
        waiting: &mut Vec<oneshot::Sender<UpdateEvent>>,
    ) -> Option<PollRound> {
        let round = self.executor.run_round();
        tokio::pin!(round);

        loop {
            tokio::select! {
                round = &mut round => return Some(round),

                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(PollerCommand::PollNow { respond_to }) => {
                            debug!("received PollNow command during round");
                            waiting.push(respond_to);
                        }

                        Some(PollerCommand::Shutdown) => {
                            debug!("received shutdown command, abandoning round");
                            return None;
                        }

                        None => {
                            warn!("command channel closed, shutting down");
                            return None;
                        }
                    }
                }
            }
        }
    }

    /// Wait out the interval. Returns `false` if the actor should stop.
    async fn sleep(&mut self, waiting: &mut Vec<oneshot::Sender<UpdateEvent>>) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(self.interval) => true,

            cmd = self.command_rx.recv() => {
                match cmd {
                    Some(PollerCommand::PollNow { respond_to }) => {
                        debug!("received PollNow command");
                        waiting.push(respond_to);
                        true
                    }

                    Some(PollerCommand::Shutdown) => {
                        debug!("received shutdown command");
                        false
                    }

                    None => {
                        warn!("command channel closed, shutting down");
                        false
                    }
                }
            }
        }
    }

    fn conclude(&mut self, round: PollRound) -> UpdateEvent {
        let (event, alert_state) =
            occupancy::conclude(round, self.alert_state, Utc::now(), &self.policy);
        self.alert_state = alert_state;

        if event.alert_triggered {
            info!("{}", event.alert_text().replace('\n', "; "));
        } else {
            trace!("round {}: no alert", event.sequence);
        }

        event
    }

    fn set_state(&self, state: SchedulerState) {
        trace!("state → {state:?}");
        self.state_tx.send_replace(state);
    }
}

/// Handle for controlling a PollerActor
///
/// Can be cloned and shared across tasks.
#[derive(Debug, Clone)]
pub struct PollerHandle {
    /// Command sender
    sender: mpsc::Sender<PollerCommand>,

    /// Lifecycle state published by the actor
    state_rx: watch::Receiver<SchedulerState>,

    /// Endpoints being polled, in round order
    endpoints: Arc<[Endpoint]>,
}

impl PollerHandle {
    /// Spawn a poller over an already resolved executor.
    ///
    /// Subscribe to `publisher` before calling this to be sure to see the
    /// first round.
    pub fn spawn(
        executor: RoundExecutor,
        policy: AlertPolicy,
        interval: Duration,
        publisher: UpdatePublisher,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let (state_tx, state_rx) = watch::channel(SchedulerState::Idle);
        let endpoints: Arc<[Endpoint]> = executor.endpoints().into();

        let actor = PollerActor::new(executor, policy, interval, cmd_rx, publisher, state_tx);

        tokio::spawn(actor.run());

        Self {
            sender: cmd_tx,
            state_rx,
            endpoints,
        }
    }

    /// Resolve the configured host and start polling it.
    ///
    /// Fails without spawning anything if no endpoint can be resolved.
    pub async fn start(
        config: &WatchConfig,
        resolver: &dyn Resolve,
        client: Arc<dyn StatusQuery>,
    ) -> Result<(Self, UpdateSubscriber), ResolutionError> {
        let endpoints = resolve_endpoints(resolver, &config.hostname, &config.ports).await?;

        let executor = RoundExecutor::new(endpoints, client, config.query_timeout);
        let publisher = UpdatePublisher::new();
        let subscriber = publisher.subscribe();

        let handle = Self::spawn(executor, config.policy, config.interval, publisher);

        Ok((handle, subscriber))
    }

    /// Run a round immediately and return its event.
    pub async fn poll_now(&self) -> Result<UpdateEvent> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(PollerCommand::PollNow { respond_to: tx })
            .await
            .context("failed to send PollNow command")?;

        rx.await.context("poller stopped before the round completed")
    }

    /// Stop the poller. Use [`PollerHandle::stopped`] to wait for it.
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(PollerCommand::Shutdown)
            .await
            .context("failed to send Shutdown command")?;
        Ok(())
    }

    pub fn state(&self) -> SchedulerState {
        *self.state_rx.borrow()
    }

    /// Resolves once the actor has left its loop.
    pub async fn stopped(&self) {
        let mut state_rx = self.state_rx.clone();
        let _ = state_rx
            .wait_for(|state| *state == SchedulerState::Stopped)
            .await;
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }
}
