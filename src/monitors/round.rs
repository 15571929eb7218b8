use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, instrument, trace, warn};

use crate::{Endpoint, PollRound, PolledServer, error::QueryError, query::StatusQuery};

/// Runs one round of status queries across a fixed endpoint set.
///
/// Queries are issued concurrently, each bounded by `timeout`. A failing
/// endpoint is reported with the placeholder status; the round itself never
/// fails.
#[derive(Clone)]
pub struct RoundExecutor {
    endpoints: Arc<[Endpoint]>,
    client: Arc<dyn StatusQuery>,
    timeout: Duration,
    completed: u64,
}

impl RoundExecutor {
    pub fn new(endpoints: Vec<Endpoint>, client: Arc<dyn StatusQuery>, timeout: Duration) -> Self {
        Self {
            endpoints: endpoints.into(),
            client,
            timeout,
            completed: 0,
        }
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Number of rounds completed so far.
    pub fn completed(&self) -> u64 {
        self.completed
    }

    #[instrument(skip(self), fields(round = self.completed + 1))]
    pub async fn run_round(&mut self) -> PollRound {
        let queries = self
            .endpoints
            .iter()
            .map(|endpoint| self.query_endpoint(*endpoint));

        // join_all yields results in input order
        let servers = join_all(queries).await;

        self.completed += 1;

        let failed = servers.iter().filter(|s| s.error.is_some()).count();
        debug!(
            "round {} complete: {}/{} endpoints answered",
            self.completed,
            servers.len() - failed,
            servers.len()
        );

        PollRound {
            sequence: self.completed,
            completed_at: Utc::now(),
            servers,
        }
    }

    async fn query_endpoint(&self, endpoint: Endpoint) -> PolledServer {
        // bound the call even if a client ignores its timeout
        let result = match tokio::time::timeout(
            self.timeout,
            self.client.query(endpoint, self.timeout),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(QueryError::Timeout(self.timeout)),
        };

        match result {
            Ok(status) => {
                trace!("{endpoint}: {}", status.info());
                PolledServer::queried(endpoint, status)
            }
            Err(e) => {
                warn!("{endpoint}: query failed: {e}");
                debug!("{endpoint}: reporting placeholder status");
                PolledServer::failed(endpoint, e)
            }
        }
    }
}
