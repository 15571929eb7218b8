pub mod actors;
pub mod config;
pub mod error;
pub mod monitors;
pub mod query;
pub mod resolver;

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name reported for an endpoint whose query failed.
pub const PLACEHOLDER_NAME: &str = "Error fetching server info.";

/// A resolved game server address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub address: IpAddr,
    pub port: u16,
}

impl Endpoint {
    pub fn new(address: IpAddr, port: u16) -> Self {
        Self { address, port }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }
}

impl From<SocketAddr> for Endpoint {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip(), addr.port())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // SocketAddr brackets IPv6 addresses
        write!(f, "{}", self.socket_addr())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub name: String,
    pub player_count: u32,
    pub max_players: u32,
}

impl ServerStatus {
    pub fn new(name: impl Into<String>, player_count: u32, max_players: u32) -> Self {
        Self {
            name: name.into(),
            player_count,
            max_players,
        }
    }

    /// Status substituted for an endpoint that could not be queried.
    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_NAME, 0, 0)
    }

    pub fn is_placeholder(&self) -> bool {
        self.name == PLACEHOLDER_NAME && self.player_count == 0 && self.max_players == 0
    }

    /// One-line summary, e.g. `de_dust2 pug: 6/10`.
    pub fn info(&self) -> String {
        format!("{}: {}/{}", self.name, self.player_count, self.max_players)
    }
}

/// Status of one endpoint within a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolledServer {
    /// Endpoint the status was queried from
    pub endpoint: Endpoint,

    /// Reported status, or the placeholder when the query failed
    pub status: ServerStatus,

    /// Query error text for failed endpoints
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PolledServer {
    pub fn queried(endpoint: Endpoint, status: ServerStatus) -> Self {
        Self {
            endpoint,
            status,
            error: None,
        }
    }

    pub fn failed(endpoint: Endpoint, error: impl ToString) -> Self {
        Self {
            endpoint,
            status: ServerStatus::placeholder(),
            error: Some(error.to_string()),
        }
    }

    /// URI that launches the game client connected to this endpoint.
    pub fn connect_uri(&self) -> String {
        format!("steam://connect/{}", self.endpoint)
    }
}

/// Result of one pass over every endpoint, in endpoint order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollRound {
    pub sequence: u64,
    pub completed_at: DateTime<Utc>,
    pub servers: Vec<PolledServer>,
}

impl PollRound {
    pub fn statuses(&self) -> impl Iterator<Item = &ServerStatus> {
        self.servers.iter().map(|server| &server.status)
    }
}

/// Event handed to the presentation layer once per completed round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateEvent {
    /// Sequence number of the round, starting at 1
    pub sequence: u64,

    /// When the round finished
    pub completed_at: DateTime<Utc>,

    /// Per-endpoint statuses in endpoint order
    pub servers: Vec<PolledServer>,

    /// Whether this round fired a "needs players" alert
    pub alert_triggered: bool,
}

impl UpdateEvent {
    pub fn from_round(round: PollRound, alert_triggered: bool) -> Self {
        let PollRound {
            sequence,
            completed_at,
            servers,
        } = round;

        Self {
            sequence,
            completed_at,
            servers,
            alert_triggered,
        }
    }

    pub fn statuses(&self) -> impl Iterator<Item = &ServerStatus> {
        self.servers.iter().map(|server| &server.status)
    }

    /// Notification body listing every server.
    pub fn alert_text(&self) -> String {
        let mut text = String::from("Players needed!");
        for status in self.statuses() {
            text.push('\n');
            text.push_str(&status.info());
        }
        text
    }
}
