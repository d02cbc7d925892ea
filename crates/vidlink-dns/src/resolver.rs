use std::collections::HashMap;
use std::future::Future;
use std::net::IpAddr;

use tracing::{debug, warn};

use crate::{ResolveError, Result};

/// Hostname to address resolution.
///
/// Implementations return every address they know for `host`. An empty list
/// is a valid (successful) answer.
pub trait Resolver: Send + Sync {
    fn lookup(&self, host: &str) -> impl Future<Output = Result<Vec<IpAddr>>> + Send;
}

/// The platform resolver, via `getaddrinfo` on tokio's blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl Resolver for SystemResolver {
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((host, 0))
            .await
            .map_err(|e| ResolveError::lookup(host, e))?;
        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}

/// Wraps a primary resolver with a static `hostname -> ip` table.
///
/// The table is only consulted after the primary lookup fails. Hosts absent
/// from the table get the primary error back unchanged.
#[derive(Debug, Clone)]
pub struct FallbackResolver<R> {
    primary:  R,
    fallback: HashMap<String, IpAddr>,
}

impl<R: Resolver> FallbackResolver<R> {
    pub fn new(primary: R, fallback: HashMap<String, IpAddr>) -> Self { Self { primary, fallback } }

    /// Build from textual addresses, rejecting any that do not parse.
    pub fn from_pairs<I, K, V>(primary: R, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut fallback = HashMap::new();
        for (host, ip) in pairs {
            let host = host.into();
            let ip = ip.as_ref();
            let parsed = ip.parse::<IpAddr>().map_err(|_| ResolveError::InvalidFallback {
                host: host.clone(),
                ip:   ip.to_owned(),
            })?;
            fallback.insert(host, parsed);
        }
        Ok(Self::new(primary, fallback))
    }

    pub fn fallback_for(&self, host: &str) -> Option<IpAddr> { self.fallback.get(host).copied() }
}

impl<R: Resolver> Resolver for FallbackResolver<R> {
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>> {
        match self.primary.lookup(host).await {
            Ok(addrs) => Ok(addrs),
            Err(err) => match self.fallback_for(host) {
                Some(ip) => {
                    warn!(host, %ip, error = %err, "primary resolution failed, using fallback address");
                    Ok(vec![ip])
                }
                None => {
                    debug!(host, error = %err, "resolution failed with no fallback");
                    Err(err)
                }
            },
        }
    }
}
