//! Client configuration.
//!
//! Loaded from a TOML file, then overridden by `VIDLINK_*` environment
//! variables:
//!
//! ```toml
//! base_url = "https://api.example.com/api/v1"
//! api_key = "..."
//! grace_period_secs = 5
//! refresh_on_forbidden = true
//!
//! [fallback_hosts]
//! "api.example.com" = "203.0.113.7"
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::retry::AuthRetryPolicy;

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API root including any version prefix, e.g. `https://host/api/v1`.
    pub base_url:             String,
    pub api_key:              String,
    pub grace_period_secs:    u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub refresh_on_forbidden: bool,
    /// Addresses used only when normal DNS resolution of the host fails.
    pub fallback_hosts:       BTreeMap<String, String>,
    pub proxies:              Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url:             String::new(),
            api_key:              String::new(),
            grace_period_secs:    5,
            connect_timeout_secs: 15,
            request_timeout_secs: 30,
            refresh_on_forbidden: true,
            fallback_hosts:       BTreeMap::new(),
            proxies:              Vec::new(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("grace_period_secs", &self.grace_period_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("refresh_on_forbidden", &self.refresh_on_forbidden)
            .field("fallback_hosts", &self.fallback_hosts)
            .field("proxies", &self.proxies)
            .finish()
    }
}

impl ClientConfig {
    pub const ENV_PREFIX: &str = "VIDLINK_";

    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Defaults, then `path` (if it exists), then the environment.
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(Self::ENV_PREFIX))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(ClientError::MissingConfig("api_key"));
        }
        self.split_base_url().map(|_| ())
    }

    pub fn grace_period(&self) -> Duration { Duration::from_secs(self.grace_period_secs) }

    pub fn connect_timeout(&self) -> Duration { Duration::from_secs(self.connect_timeout_secs) }

    pub fn request_timeout(&self) -> Duration { Duration::from_secs(self.request_timeout_secs) }

    pub fn policy(&self) -> AuthRetryPolicy {
        AuthRetryPolicy {
            refresh_on_forbidden: self.refresh_on_forbidden,
        }
    }

    /// Split `base_url` into `scheme://host[:port]` and its path prefix.
    pub fn split_base_url(&self) -> Result<(String, String)> {
        let base = self.base_url.trim_end_matches('/');
        let (scheme, rest) = base
            .split_once("://")
            .ok_or_else(|| ClientError::InvalidUrl(self.base_url.clone()))?;
        if !matches!(scheme, "http" | "https") {
            return Err(ClientError::InvalidUrl(self.base_url.clone()));
        }

        let (authority, path) = match rest.find('/') {
            Some(idx) => rest.split_at(idx),
            None => (rest, ""),
        };
        if authority.is_empty() || authority.contains(['?', '#']) || path.contains(['?', '#']) {
            return Err(ClientError::InvalidUrl(self.base_url.clone()));
        }

        Ok((format!("{scheme}://{authority}"), path.to_owned()))
    }
}

#[cfg(feature = "reqwest")]
mod build {
    use std::sync::Arc;

    use reqwest::{Client, Proxy};
    use vidlink_dns::{FallbackResolver, ReqwestResolver, SystemResolver};
    use vidlink_session::{HttpBootstrapper, SessionStore};

    use super::*;
    use crate::client::SignedClient;
    use crate::transport::ReqwestTransport;

    /// A fully wired production client.
    pub type HttpClient = SignedClient<ReqwestTransport, SessionStore<HttpBootstrapper>>;

    impl ClientConfig {
        /// reqwest client with timeouts, proxies and the fallback resolver.
        pub fn build_reqwest(&self) -> Result<Client> {
            let resolver = FallbackResolver::from_pairs(SystemResolver, &self.fallback_hosts)?;

            let mut cb = Client::builder()
                .connect_timeout(self.connect_timeout())
                .timeout(self.request_timeout())
                .dns_resolver(Arc::new(ReqwestResolver::new(resolver)));

            let (secure, insecure): (Vec<&String>, Vec<&String>) =
                self.proxies.iter().partition(|u| u.starts_with("https://"));

            for url in secure {
                cb = cb.proxy(Proxy::https(url.as_str()).map_err(|source| ClientError::Proxy {
                    url: url.clone(),
                    source,
                })?);
            }
            for url in insecure {
                cb = cb.proxy(Proxy::http(url.as_str()).map_err(|source| ClientError::Proxy {
                    url: url.clone(),
                    source,
                })?);
            }

            cb.build().map_err(ClientError::ClientBuild)
        }

        pub fn bootstrapper(&self, client: Client) -> HttpBootstrapper {
            HttpBootstrapper::new(client, &self.base_url, self.api_key.clone())
        }

        /// Session store, bootstrapper and signed transport sharing one reqwest client.
        pub fn build(&self) -> Result<HttpClient> {
            self.validate()?;
            let (origin, prefix) = self.split_base_url()?;
            let client = self.build_reqwest()?;

            let store = SessionStore::new(self.bootstrapper(client.clone())).with_grace(self.grace_period());

            Ok(SignedClient::new(ReqwestTransport::new(client, &origin), Arc::new(store), self.api_key.clone())
                .with_path_prefix(&prefix)
                .with_policy(self.policy()))
        }
    }
}

#[cfg(feature = "reqwest")]
pub use build::HttpClient;
