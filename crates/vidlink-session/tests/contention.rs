//! Concurrency tests for the session store.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Barrier;
use vidlink_core::{Clock, FixedClock, Session};
use vidlink_session::{BootstrapError, Bootstrapper, SessionProvider, SessionStore};

struct SlowBootstrapper {
    clock: Arc<FixedClock>,
    calls: Arc<AtomicUsize>,
    delay: Duration,
}

impl Bootstrapper for SlowBootstrapper {
    async fn bootstrap(&self) -> Result<Session, BootstrapError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        Ok(Session::from_ttl(
            format!("sid{n}"),
            format!("sec{n}"),
            self.clock.now(),
            Duration::from_secs(600),
        ))
    }
}

struct Fixture {
    clock: Arc<FixedClock>,
    store: Arc<SessionStore<SlowBootstrapper>>,
    calls: Arc<AtomicUsize>,
}

impl Fixture {
    fn bootstraps(&self) -> usize { self.calls.load(Ordering::SeqCst) }
}

fn slow_store() -> Fixture {
    let clock = Arc::new(FixedClock::at_unix(1_700_000_000));
    let calls = Arc::new(AtomicUsize::new(0));
    let bootstrapper = SlowBootstrapper {
        clock: Arc::clone(&clock),
        calls: Arc::clone(&calls),
        delay: Duration::from_millis(50),
    };
    let store = SessionStore::new(bootstrapper).with_clock(clock.clone());
    Fixture {
        clock,
        store: Arc::new(store),
        calls,
    }
}

async fn race(store: &Arc<SessionStore<SlowBootstrapper>>, callers: usize) -> Vec<Arc<Session>> {
    let barrier = Arc::new(Barrier::new(callers));
    let handles: Vec<_> = (0..callers)
        .map(|_| {
            let store = Arc::clone(store);
            let barrier = Arc::clone(&barrier);
            tokio::spawn(async move {
                barrier.wait().await;
                store.get_or_create().await
            })
        })
        .collect();

    let mut sessions = Vec::with_capacity(callers);
    for handle in handles {
        sessions.push(handle.await.unwrap().unwrap());
    }
    sessions
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_on_empty_store_bootstrap_once() {
    let fx = slow_store();

    let sessions = race(&fx.store, 32).await;

    assert_eq!(fx.bootstraps(), 1);
    assert_eq!(fx.store.current().unwrap().session_id(), "sid1");
    assert!(sessions.iter().all(|s| s.session_id() == "sid1" && s.secret() == "sec1"));
    assert_eq!(sessions.len(), 32);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_on_expired_store_refresh_once() {
    let fx = slow_store();
    fx.store.get_or_create().await.unwrap();

    fx.clock.advance(Duration::from_secs(3600));
    let sessions = race(&fx.store, 16).await;

    assert_eq!(fx.bootstraps(), 2);
    assert!(sessions.iter().all(|s| s.session_id() == "sid2"));
    assert_eq!(fx.store.current().unwrap().session_id(), "sid2");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_two_callers_share_session_and_invalidate_rebootstraps() {
    let fx = slow_store();

    let sessions = race(&fx.store, 2).await;
    assert!(Arc::ptr_eq(&sessions[0], &sessions[1]));
    assert_eq!(fx.bootstraps(), 1);

    fx.store.invalidate();
    let next = fx.store.get_or_create().await.unwrap();
    assert_eq!(next.session_id(), "sid2");
    assert_eq!(fx.bootstraps(), 2);
}
