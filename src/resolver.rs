//! Endpoint resolution
//!
//! The host is resolved once at startup. The first address returned is paired
//! with every configured port; the resulting endpoint set never changes for
//! the lifetime of the process, so an address change requires a restart.

use std::io;
use std::net::IpAddr;

use async_trait::async_trait;
use tracing::{debug, instrument, trace};

use crate::{Endpoint, error::ResolutionError};

/// Host name lookup
#[async_trait]
pub trait Resolve: Send + Sync {
    /// Addresses for `host`, in the order the system resolver returned them.
    async fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>>;
}

/// System DNS resolver
#[derive(Debug, Clone, Copy, Default)]
pub struct DnsResolver;

#[async_trait]
impl Resolve for DnsResolver {
    async fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        // lookup_host wants a port; it is discarded
        let addrs = tokio::net::lookup_host((host, 0)).await?;
        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}

/// Resolve `host` to one endpoint per port, in port order.
#[instrument(skip(resolver))]
pub async fn resolve_endpoints(
    resolver: &dyn Resolve,
    host: &str,
    ports: &[u16],
) -> Result<Vec<Endpoint>, ResolutionError> {
    if ports.is_empty() {
        return Err(ResolutionError::NoPorts {
            host: host.to_string(),
        });
    }

    let addresses = resolver
        .lookup(host)
        .await
        .map_err(|source| ResolutionError::Lookup {
            host: host.to_string(),
            source,
        })?;

    trace!("{host} resolved to {addresses:?}");

    let Some(address) = addresses.first().copied() else {
        return Err(ResolutionError::NoAddress {
            host: host.to_string(),
        });
    };

    let endpoints: Vec<_> = ports
        .iter()
        .map(|port| Endpoint::new(address, *port))
        .collect();

    debug!("watching {} endpoints on {address}", endpoints.len());

    Ok(endpoints)
}
