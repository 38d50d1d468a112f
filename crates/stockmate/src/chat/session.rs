//! Chat sessions and their in-memory store

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::ChatTurn;

/// One user's conversation
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    /// Turns in the order they were answered
    pub history: Vec<ChatTurn>,
    /// Questions asked, small talk included
    pub query_count: u64,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            history: Vec::new(),
            query_count: 0,
            created_at: now,
            last_active: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_active = Utc::now();
    }

    /// Append a turn and return its index
    pub fn push_turn(&mut self, turn: ChatTurn) -> usize {
        self.history.push(turn);
        self.touch();
        self.history.len() - 1
    }

    pub fn turn(&self, index: usize) -> Result<&ChatTurn> {
        self.history.get(index).ok_or(Error::TurnNotFound {
            session_id: self.id,
            index,
        })
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

pub type SessionHandle = Arc<Mutex<Session>>;

/// Live sessions keyed by id
///
/// Each session sits behind its own async mutex so turns of one session run
/// one at a time while other sessions proceed.
pub struct SessionStore {
    sessions: DashMap<Uuid, SessionHandle>,
    idle_ttl: Duration,
}

impl SessionStore {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            idle_ttl,
        }
    }

    pub fn create(&self) -> Uuid {
        let session = Session::new();
        let id = session.id;
        self.sessions.insert(id, Arc::new(Mutex::new(session)));
        tracing::debug!("Created session {}", id);
        id
    }

    /// Look up a session, marking it active unless another task holds it
    pub fn get(&self, id: Uuid) -> Result<SessionHandle> {
        let entry = self.sessions.get(&id).ok_or(Error::SessionNotFound(id))?;
        if let Ok(mut session) = entry.value().try_lock() {
            session.touch();
        }
        Ok(Arc::clone(entry.value()))
    }

    /// Lock a session for a turn
    ///
    /// Fails with `SessionNotFound` if the session was removed or expired
    /// while waiting for the lock, so a turn is never recorded on a session
    /// that is no longer in the store.
    pub async fn lock(&self, id: Uuid) -> Result<OwnedMutexGuard<Session>> {
        let handle = self.get(id)?;
        let mut session = handle.clone().lock_owned().await;
        session.touch();

        let still_live = self
            .sessions
            .get(&id)
            .is_some_and(|entry| Arc::ptr_eq(entry.value(), &handle));
        if !still_live {
            return Err(Error::SessionNotFound(id));
        }
        Ok(session)
    }

    pub fn remove(&self, id: Uuid) -> Result<()> {
        self.sessions
            .remove(&id)
            .map(|_| tracing::debug!("Removed session {}", id))
            .ok_or(Error::SessionNotFound(id))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop sessions idle for longer than the TTL as of `now`
    ///
    /// Sessions that are mid-turn (locked) are kept. Returns how many were
    /// removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let ttl = chrono::Duration::from_std(self.idle_ttl).unwrap_or(chrono::Duration::MAX);
        let before = self.sessions.len();

        self.sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) => now.signed_duration_since(session.last_active) <= ttl,
            Err(_) => true,
        });

        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            tracing::info!("Expired {} idle sessions", removed);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_get_remove() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.create();

        assert_eq!(store.len(), 1);
        assert!(store.get(id).is_ok());

        store.remove(id).unwrap();
        assert!(matches!(store.get(id), Err(Error::SessionNotFound(_))));
        assert!(matches!(store.remove(id), Err(Error::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn test_push_turn_and_lookup() {
        let store = SessionStore::new(Duration::from_secs(60));
        let handle = store.get(store.create()).unwrap();
        let mut session = handle.lock().await;

        let index = session.push_turn(ChatTurn::new("hello", "hi", Vec::new()));
        assert_eq!(index, 0);
        assert_eq!(session.turn(0).unwrap().question, "hello");
        assert!(matches!(
            session.turn(1),
            Err(Error::TurnNotFound { index: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = SessionStore::new(Duration::from_secs(60));
        let stale = store.create();
        let fresh = store.create();

        store.get(stale).unwrap().lock().await.last_active = Utc::now() - chrono::Duration::minutes(5);

        assert_eq!(store.purge_expired(Utc::now()), 1);
        assert!(store.get(stale).is_err());
        assert!(store.get(fresh).is_ok());
    }

    #[tokio::test]
    async fn test_purge_keeps_busy_sessions() {
        let store = SessionStore::new(Duration::from_secs(0));
        let id = store.create();
        let handle = store.get(id).unwrap();
        let _guard = handle.lock().await;

        assert_eq!(store.purge_expired(Utc::now() + chrono::Duration::hours(1)), 0);
        assert!(store.get(id).is_ok());
    }

    #[tokio::test]
    async fn test_get_refreshes_activity() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.create();
        store.get(id).unwrap().lock().await.last_active = Utc::now() - chrono::Duration::minutes(5);

        store.get(id).unwrap();
        assert_eq!(store.purge_expired(Utc::now()), 0);
        assert!(store.get(id).is_ok());
    }

    #[tokio::test]
    async fn test_lock_fails_after_expiry() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.create();
        let handle = store.get(id).unwrap();
        handle.lock().await.last_active = Utc::now() - chrono::Duration::minutes(5);

        // Expired between lookup and lock
        assert_eq!(store.purge_expired(Utc::now()), 1);
        assert!(matches!(store.lock(id).await, Err(Error::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn test_lock_touches_session() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.create();
        let before = Utc::now();

        let session = store.lock(id).await.unwrap();
        assert!(session.last_active >= before);
        assert_eq!(session.id, id);
    }
}
