//! Actor-based polling
//!
//! ## Architecture Overview
//!
//! ```text
//!   ┌──────────────┐   commands    ┌────────────────────────────┐
//!   │ PollerHandle │ ────────────▶ │ PollerActor                │
//!   └──────────────┘  (mpsc)       │  RoundExecutor → occupancy │
//!                                  └─────────────┬──────────────┘
//!                                                │ UpdateEvent
//!                                    ┌───────────▼───────────┐
//!                                    │ UpdatePublisher       │ (watch, latest wins)
//!                                    └───────────┬───────────┘
//!                                                │ subscribe
//!                                    ┌───────────▼───────────┐
//!                                    │ presentation layer    │
//!                                    └───────────────────────┘
//! ```
//!
//! ## Communication Patterns
//!
//! 1. **Commands**: the poller has an mpsc command channel for control messages
//! 2. **Events**: rounds are published to a watch channel
//! 3. **Request/Response**: oneshot channels for `PollNow`

pub mod messages;
pub mod poller;
pub mod publisher;
