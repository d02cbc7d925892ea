use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::dns::{Addrs, Name, Resolve, Resolving};

use crate::Resolver;

/// Plugs any [`Resolver`] into `reqwest::ClientBuilder::dns_resolver`.
pub struct ReqwestResolver<R> {
    inner: Arc<R>,
}

impl<R> ReqwestResolver<R> {
    pub fn new(inner: R) -> Self { Self { inner: Arc::new(inner) } }
}

impl<R> Clone for ReqwestResolver<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Resolver + 'static> Resolve for ReqwestResolver<R> {
    fn resolve(&self, name: Name) -> Resolving {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            let ips = inner.lookup(name.as_str()).await?;
            // reqwest overrides the port from the request URL
            let addrs: Addrs = Box::new(ips.into_iter().map(|ip| SocketAddr::new(ip, 0)));
            Ok(addrs)
        })
    }
}
