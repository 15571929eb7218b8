//! "Needs players" decision
//!
//! ## Debounce
//!
//! ```text
//! no server in (min, max)          → Quiet       (state untouched)
//! some server in (min, max):
//!   now - last_alert <= cooldown   → CoolingDown (state untouched)
//!   otherwise                      → Alert       (last_alert = now)
//! ```
//!
//! Because the state only moves when an alert fires, at most one alert fires
//! per cooldown window no matter how often the condition holds.
//!
//! Failed endpoints report the placeholder status with zero players and go
//! through the same predicate as everything else. With `min_players = 0` that
//! is still `0 > 0`, so a placeholder never counts as occupied.

use chrono::{DateTime, Utc};

use crate::{PollRound, ServerStatus, UpdateEvent, config::AlertPolicy};

/// When the last alert fired; `None` until the first one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertState {
    pub last_alert: Option<DateTime<Utc>>,
}

impl AlertState {
    pub fn never() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccupancyEvaluation {
    /// No server is in the alert range
    Quiet,
    /// A server is in range but an alert fired too recently
    CoolingDown,
    /// A server is in range and the cooldown has passed
    Alert,
}

impl OccupancyEvaluation {
    pub fn evaluate<'a>(
        statuses: impl IntoIterator<Item = &'a ServerStatus>,
        policy: &AlertPolicy,
        state: &AlertState,
        now: DateTime<Utc>,
    ) -> OccupancyEvaluation {
        if !statuses
            .into_iter()
            .any(|status| needs_players(status, policy))
        {
            return OccupancyEvaluation::Quiet;
        }

        match state.last_alert {
            Some(last) if now - last <= policy.cooldown => OccupancyEvaluation::CoolingDown,
            _ => OccupancyEvaluation::Alert,
        }
    }
}

/// Occupied enough to be worth joining, but not yet full.
pub fn needs_players(status: &ServerStatus, policy: &AlertPolicy) -> bool {
    policy.min_players < status.player_count && status.player_count < policy.max_players
}

/// Decide whether `round` fires an alert, returning the updated state.
pub fn decide(
    round: &PollRound,
    state: AlertState,
    now: DateTime<Utc>,
    policy: &AlertPolicy,
) -> (bool, AlertState) {
    match OccupancyEvaluation::evaluate(round.statuses(), policy, &state, now) {
        OccupancyEvaluation::Alert => (
            true,
            AlertState {
                last_alert: Some(now),
            },
        ),
        OccupancyEvaluation::Quiet | OccupancyEvaluation::CoolingDown => (false, state),
    }
}

/// Turn a completed round into the event for subscribers.
pub fn conclude(
    round: PollRound,
    state: AlertState,
    now: DateTime<Utc>,
    policy: &AlertPolicy,
) -> (UpdateEvent, AlertState) {
    let (alert_triggered, state) = decide(&round, state, now, policy);
    (UpdateEvent::from_round(round, alert_triggered), state)
}
