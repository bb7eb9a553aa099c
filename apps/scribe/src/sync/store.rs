//! In-memory session registry and the pump that fires debounce deadlines.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};
use uuid::Uuid;

use crate::sync::session::EditorSession;

#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<Uuid, EditorSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: EditorSession) -> Uuid {
        let id = session.id();
        self.inner.lock().await.insert(id, session);
        id
    }

    pub async fn remove(&self, id: Uuid) -> Option<EditorSession> {
        self.inner.lock().await.remove(&id)
    }

    pub async fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, EditorSession>> {
        self.inner.lock().await
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Fires every due propagation across all sessions.
    pub async fn fire_due(&self, now: Instant) -> usize {
        let mut sessions = self.inner.lock().await;
        sessions
            .values_mut()
            .map(|session| session.fire_due(now))
            .sum()
    }

    /// Flushes and drops every session idle for at least `ttl`.
    pub async fn evict_idle(&self, now: Instant, ttl: Duration) -> Vec<EditorSession> {
        let mut sessions = self.inner.lock().await;
        let expired: Vec<Uuid> = sessions
            .iter()
            .filter(|(_, session)| session.idle_for(now) >= ttl)
            .map(|(id, _)| *id)
            .collect();

        let mut evicted = Vec::with_capacity(expired.len());
        for id in expired {
            if let Some(mut session) = sessions.remove(&id) {
                session.flush();
                info!(
                    session = %id,
                    revision = session.revision(),
                    "Idle session evicted"
                );
                evicted.push(session);
            }
        }
        evicted
    }
}

/// Spawns the background task that drives debounce deadlines every `interval`
/// and evicts sessions idle for `idle_ttl`.
pub fn spawn_sync_pump(
    store: SessionStore,
    interval: Duration,
    idle_ttl: Duration,
) -> JoinHandle<()> {
    info!(
        interval_ms = interval.as_millis() as u64,
        idle_ttl_secs = idle_ttl.as_secs(),
        "Sync pump started"
    );
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            let now = ticker.tick().await;
            let fired = store.fire_due(now).await;
            if fired > 0 {
                debug!(fired, "Sync pump fired propagations");
            }
            store.evict_idle(now, idle_ttl).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::bridge::SyncConfig;
    use crate::sync::document::SurfaceId;

    #[tokio::test(start_paused = true)]
    async fn test_pump_commits_after_debounce() {
        let store = SessionStore::new();
        let id = store
            .insert(EditorSession::new(Some(""), SyncConfig::default()))
            .await;
        let pump = spawn_sync_pump(
            store.clone(),
            Duration::from_millis(50),
            Duration::from_secs(3600),
        );

        store
            .lock()
            .await
            .get_mut(&id)
            .expect("session")
            .user_edit(SurfaceId::Rich, "lecture 4".to_string())
            .expect("edit");

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(store.lock().await[&id].revision(), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        let sessions = store.lock().await;
        assert_eq!(sessions[&id].canonical_text(), "lecture 4");
        assert_eq!(sessions[&id].revision(), 1);
        drop(sessions);
        pump.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_evict_idle_flushes_and_drops_stale_sessions() {
        let ttl = Duration::from_secs(60);
        let store = SessionStore::new();
        let stale = store
            .insert(EditorSession::new(Some(""), SyncConfig::default()))
            .await;
        let live = store
            .insert(EditorSession::new(Some(""), SyncConfig::default()))
            .await;

        store
            .lock()
            .await
            .get_mut(&stale)
            .expect("session")
            .user_edit(SurfaceId::Rich, "last words".to_string())
            .expect("edit");
        tokio::time::advance(Duration::from_secs(45)).await;
        store
            .lock()
            .await
            .get_mut(&live)
            .expect("session")
            .user_edit(SurfaceId::Rich, "still here".to_string())
            .expect("edit");
        tokio::time::advance(Duration::from_secs(20)).await;

        let evicted = store.evict_idle(Instant::now(), ttl).await;
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].id(), stale);
        assert_eq!(evicted[0].canonical_text(), "last words");
        assert_eq!(store.len().await, 1);
        assert!(store.lock().await.contains_key(&live));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pump_evicts_idle_sessions() {
        let store = SessionStore::new();
        store
            .insert(EditorSession::new(None, SyncConfig::default()))
            .await;
        let pump = spawn_sync_pump(
            store.clone(),
            Duration::from_millis(50),
            Duration::from_secs(1),
        );

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(store.len().await, 1);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(store.len().await, 0);
        pump.abort();
    }

    #[tokio::test]
    async fn test_remove_returns_session() {
        let store = SessionStore::new();
        let id = store
            .insert(EditorSession::new(None, SyncConfig::default()))
            .await;
        assert_eq!(store.len().await, 1);
        assert!(store.remove(id).await.is_some());
        assert!(store.remove(id).await.is_none());
    }
}
