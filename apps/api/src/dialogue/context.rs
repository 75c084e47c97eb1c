//! Conversation Context — append-only turn log, flattened into prompt context.
//!
//! The log is held as an immutable `Arc<Vec<Turn>>` snapshot behind a lock.
//! Appends copy-on-write a new snapshot; `reset` swaps in an empty one, so a
//! reset never races an in-flight append into a half-cleared sequence.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single immutable conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ConversationContext {
    turns: RwLock<Arc<Vec<Turn>>>,
}

impl ConversationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a user turn and its assistant reply as one step.
    pub async fn append_exchange(&self, user: Turn, assistant: Turn) {
        let mut guard = self.turns.write().await;
        let mut next = Vec::with_capacity(guard.len() + 2);
        next.extend(guard.iter().cloned());
        next.push(user);
        next.push(assistant);
        *guard = Arc::new(next);
    }

    /// Replaces the sequence with an empty one.
    pub async fn reset(&self) {
        *self.turns.write().await = Arc::new(Vec::new());
    }

    /// Ordered snapshot of all turns, oldest first.
    pub async fn turns(&self) -> Arc<Vec<Turn>> {
        Arc::clone(&*self.turns.read().await)
    }

    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        self.turns.read().await.is_empty()
    }

    /// Turn contents joined by blank lines, oldest first. Empty when there is no history.
    pub async fn as_text(&self) -> String {
        self.turns()
            .await
            .iter()
            .map(|t| t.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Prefixes `prompt` with the flattened history, if any.
    pub async fn contextualize(&self, prompt: &str) -> String {
        let history = self.as_text().await;
        if history.is_empty() {
            prompt.to_string()
        } else {
            format!("{history}\n\n{prompt}")
        }
    }
}
