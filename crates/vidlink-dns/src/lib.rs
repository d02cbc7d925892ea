//! DNS resolution with a static fallback table.
//!
//! [`FallbackResolver`] delegates to a primary [`Resolver`] and only when that
//! fails substitutes a configured address for known hosts. It never changes
//! the answer of a successful lookup.
//!
//! With the default `reqwest` feature, [`ReqwestResolver`] adapts any
//! resolver to reqwest's pluggable DNS hook.

pub use self::error::{ResolveError, Result};
pub use self::resolver::{FallbackResolver, Resolver, SystemResolver};

#[cfg(feature = "reqwest")]
pub use self::reqwest_dns::ReqwestResolver;

mod error;
mod resolver;

#[cfg(feature = "reqwest")]
mod reqwest_dns;
