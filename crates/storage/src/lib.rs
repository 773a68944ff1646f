use std::collections::HashMap;
use std::sync::Arc;

use agro_core::Session;
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

/// Per-conversation session rows, keyed by the opaque conversation identity.
/// Bounded: implementations must not grow without limit across a long-running
/// process.
pub trait SessionStore: Send + Sync {
    /// Returns the session for `id`, creating a fresh `Stage::New` row on
    /// first contact.
    fn get(&self, id: &str) -> Result<Session>;
    fn set(&self, id: &str, session: Session) -> Result<()>;
    fn evict(&self, id: &str) -> Result<()>;
    /// Drops rows idle longer than the TTL; returns how many were removed.
    fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64>;
}

/// In-memory store with a hard capacity and an idle TTL. When the capacity
/// is reached, inserting a new identity evicts the least-recently-seen row.
#[derive(Clone)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    max_sessions: usize,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(max_sessions: usize, ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            max_sessions: max_sessions.max(1),
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(10_000, Duration::hours(24))
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, id: &str) -> Result<Session> {
        let now = Utc::now();
        if let Some(session) = self.sessions.read().get(id) {
            return Ok(session.clone());
        }
        Ok(Session::new(now))
    }

    fn set(&self, id: &str, mut session: Session) -> Result<()> {
        let now = Utc::now();
        session.last_seen = now;

        let mut sessions = self.sessions.write();
        if !sessions.contains_key(id) && sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, row)| row.last_seen)
                .map(|(key, _)| key.clone());
            if let Some(key) = oldest {
                sessions.remove(&key);
            }
        }
        sessions.insert(id.to_string(), session);
        Ok(())
    }

    fn evict(&self, id: &str) -> Result<()> {
        self.sessions.write().remove(id);
        Ok(())
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut removed = 0_u64;
        self.sessions.write().retain(|_, session| {
            let keep = now - session.last_seen <= self.ttl;
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}
