//! Status queries against a single endpoint
//!
//! The poll executor only depends on the [`StatusQuery`] trait. Calls are
//! independent: nothing may be assumed about ordering or shared state between
//! queries to different endpoints.

pub mod a2s;

use std::time::Duration;

use async_trait::async_trait;

use crate::{Endpoint, ServerStatus, error::QueryError};

pub use a2s::A2sClient;

#[async_trait]
pub trait StatusQuery: Send + Sync {
    /// Query `endpoint` once, giving up after `timeout`.
    async fn query(&self, endpoint: Endpoint, timeout: Duration)
    -> Result<ServerStatus, QueryError>;
}
