use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, warn};
use vidlink_core::{Clock, DEFAULT_GRACE, Session, SystemClock};

use crate::bootstrap::Bootstrapper;
use crate::error::{BootstrapError, Result};

/// Anything that can hand out a current session and forget it on demand.
///
/// The request pipeline only depends on this seam, so tests can observe
/// invalidations without a real store.
pub trait SessionProvider: Send + Sync {
    fn get_or_create(&self) -> impl Future<Output = Result<Arc<Session>>> + Send;

    /// Drop the cached session. Idempotent.
    fn invalidate(&self);
}

/// Owns the lifecycle of the current session.
///
/// Reads of a fresh session take only a short read lock. Refreshes go
/// through a single async critical section and re-check freshness inside it,
/// so any number of callers racing on a stale store trigger one bootstrap.
pub struct SessionStore<B> {
    bootstrapper: B,
    clock:        Arc<dyn Clock>,
    grace:        Duration,
    current:      RwLock<Option<Arc<Session>>>,
    refresh:      Mutex<()>,
}

impl<B: Bootstrapper> SessionStore<B> {
    pub fn new(bootstrapper: B) -> Self {
        Self {
            bootstrapper,
            clock: Arc::new(SystemClock),
            grace: DEFAULT_GRACE,
            current: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn grace(&self) -> Duration { self.grace }

    /// The cached session, fresh or not, without bootstrapping.
    pub fn current(&self) -> Option<Arc<Session>> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn fresh(&self) -> Option<Arc<Session>> {
        let now = self.clock.now();
        self.current().filter(|s| s.is_fresh_at(now, self.grace))
    }

    fn store(&self, session: Option<Arc<Session>>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = session;
    }

    async fn refresh(&self) -> Result<Arc<Session>> {
        let _guard = self.refresh.lock().await;

        // another caller may have refreshed while we waited
        if let Some(session) = self.fresh() {
            return Ok(session);
        }

        // a stale session is never resurrected, even if bootstrap fails
        self.store(None);

        let session = self.bootstrapper.bootstrap().await.inspect_err(|err| {
            warn!(error = %err, "session bootstrap failed");
        })?;

        if !session.is_fresh_at(self.clock.now(), self.grace) {
            warn!(session_id = session.session_id(), "bootstrapped session expires within grace period");
            return Err(BootstrapError::Payload("session expires within grace period".to_owned()).into());
        }

        let session = Arc::new(session);
        self.store(Some(Arc::clone(&session)));
        debug!(session_id = session.session_id(), "session cached");
        Ok(session)
    }
}

impl<B: Bootstrapper> SessionProvider for SessionStore<B> {
    async fn get_or_create(&self) -> Result<Arc<Session>> {
        if let Some(session) = self.fresh() {
            return Ok(session);
        }
        self.refresh().await
    }

    fn invalidate(&self) {
        let previous = self.current.write().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(session) = previous {
            debug!(session_id = session.session_id(), "session invalidated");
        }
    }
}

impl<B> std::fmt::Debug for SessionStore<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("SessionStore")
            .field("grace", &self.grace)
            .field("current", &*current)
            .finish()
    }
}
