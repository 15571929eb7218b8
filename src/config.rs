use std::time::Duration;

use chrono::TimeDelta;

/// Host whose servers are watched.
pub const HOSTNAME: &str = "csgo.sub.io";

/// Ports of the server instances on [`HOSTNAME`], in display order.
pub const PORTS: [u16; 2] = [27015, 27017];

/// Delay between the end of one round and the start of the next.
pub const POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Upper bound for a single status query.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// When a round is worth a "needs players" alert.
///
/// A server needs players when `min_players < player_count < max_players`.
/// Alerts are debounced: after one fires, no other fires until `cooldown`
/// has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertPolicy {
    pub min_players: u32,
    pub max_players: u32,
    pub cooldown: TimeDelta,
}

impl AlertPolicy {
    pub fn production() -> Self {
        Self {
            min_players: 5,
            max_players: 11,
            cooldown: TimeDelta::minutes(10),
        }
    }

    /// Alerts on almost anything, useful when testing notifications by hand.
    pub fn fast() -> Self {
        Self {
            min_players: 0,
            max_players: 999,
            cooldown: TimeDelta::minutes(1),
        }
    }
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self::production()
    }
}

#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub hostname: String,
    pub ports: Vec<u16>,
    pub interval: Duration,
    pub query_timeout: Duration,
    pub policy: AlertPolicy,
}

impl WatchConfig {
    pub fn with_policy(mut self, policy: AlertPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            hostname: HOSTNAME.to_string(),
            ports: PORTS.to_vec(),
            interval: POLL_INTERVAL,
            query_timeout: QUERY_TIMEOUT,
            policy: AlertPolicy::default(),
        }
    }
}
