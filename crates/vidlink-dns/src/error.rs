use std::io;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("failed to resolve {host}: {source}")]
    Lookup {
        host:   String,
        #[source]
        source: io::Error,
    },

    #[error("invalid fallback address {ip:?} for host {host}")]
    InvalidFallback { host: String, ip: String },
}

impl ResolveError {
    pub fn lookup(host: impl Into<String>, source: io::Error) -> Self {
        Self::Lookup {
            host: host.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
