//! Per-session serialization of cart writes.
//!
//! A cart write is load, mirror, save. Two posts from the same browser
//! running those steps interleaved would both start from the same cart and
//! one change would be lost, so writers take the session's lock before the
//! first session read. The session layer persists the record after the
//! handler returns, so the guard travels in the response extensions and is
//! released only when the response is dropped.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tower_sessions::{Session, session::Id};

/// Locks of sessions idle this long are dropped.
const LOCK_IDLE_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Exclusive cart access for one session, released on drop.
#[derive(Clone)]
pub struct CartWriteGuard {
    _held: Arc<OwnedMutexGuard<()>>,
}

/// One async mutex per session id.
#[derive(Clone)]
pub struct CartLocks {
    locks: Cache<Id, Arc<Mutex<()>>>,
}

impl Default for CartLocks {
    fn default() -> Self {
        Self {
            locks: Cache::builder().time_to_idle(LOCK_IDLE_TIMEOUT).build(),
        }
    }
}

impl CartLocks {
    /// Wait for exclusive cart access in `session`.
    ///
    /// Sessions without an id yet (no cookie) cannot race with themselves
    /// and get `None`.
    pub async fn acquire(&self, session: &Session) -> Option<CartWriteGuard> {
        let id = session.id()?;
        let lock = self
            .locks
            .get_with(id, async { Arc::new(Mutex::new(())) })
            .await;
        Some(CartWriteGuard {
            _held: Arc::new(lock.lock_owned().await),
        })
    }
}
