//! Per-session conversation contexts. Each session id owns an isolated
//! `ConversationContext`; nothing is shared across sessions.
//!
//! The registry is bounded: entries idle longer than `idle_ttl` are swept, and
//! when `max_sessions` is reached the least recently used entry is evicted.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::dialogue::context::ConversationContext;

pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

#[derive(Debug)]
struct SessionEntry {
    ctx: Arc<ConversationContext>,
    last_used: Instant,
}

#[derive(Debug, Clone)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<Uuid, SessionEntry>>>,
    idle_ttl: Duration,
    max_sessions: usize,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_limits(DEFAULT_IDLE_TTL, DEFAULT_MAX_SESSIONS)
    }
}

impl SessionRegistry {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    /// `max_sessions` is clamped to at least one.
    pub fn with_limits(idle_ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            idle_ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    pub fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    /// Returns the context for `session_id`, creating it on first use.
    pub async fn context(&self, session_id: Uuid) -> Arc<ConversationContext> {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;

        if let Some(entry) = sessions.get_mut(&session_id) {
            if now.duration_since(entry.last_used) < self.idle_ttl {
                entry.last_used = now;
                return Arc::clone(&entry.ctx);
            }
        }

        self.sweep_locked(&mut sessions, now);
        if sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(id, _)| *id);
            if let Some(id) = oldest {
                debug!("Session registry full, evicting least recently used session {id}");
                sessions.remove(&id);
            }
        }

        let ctx = Arc::new(ConversationContext::new());
        sessions.insert(
            session_id,
            SessionEntry {
                ctx: Arc::clone(&ctx),
                last_used: now,
            },
        );
        ctx
    }

    /// Returns the context only if the session exists and has not expired.
    pub async fn existing(&self, session_id: Uuid) -> Option<Arc<ConversationContext>> {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        let entry = sessions.get_mut(&session_id)?;
        if now.duration_since(entry.last_used) >= self.idle_ttl {
            sessions.remove(&session_id);
            return None;
        }
        entry.last_used = now;
        Some(Arc::clone(&entry.ctx))
    }

    /// Drops the session entry, returning its context if there was one.
    pub async fn remove(&self, session_id: Uuid) -> Option<Arc<ConversationContext>> {
        self.sessions
            .lock()
            .await
            .remove(&session_id)
            .map(|entry| entry.ctx)
    }

    /// Removes every entry idle for at least `idle_ttl`. Returns how many were removed.
    pub async fn sweep_expired(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        self.sweep_locked(&mut sessions, Instant::now())
    }

    fn sweep_locked(&self, sessions: &mut HashMap<Uuid, SessionEntry>, now: Instant) -> usize {
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_used) < self.idle_ttl);
        before - sessions.len()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
