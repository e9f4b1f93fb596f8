//! Conversation turns

use chrono::{DateTime, Utc};

use crate::api::Source;

pub type MessageId = i64;

/// Id of the greeting every session starts with
pub const GREETING_ID: MessageId = 1;

/// Who wrote a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::User => write!(f, "You"),
            MessageRole::Assistant => write!(f, "Assistant"),
        }
    }
}

/// One turn of the conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub sources: Vec<Source>,
}

impl Message {
    pub fn user(id: MessageId, content: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            role: MessageRole::User,
            content,
            timestamp,
            sources: Vec::new(),
        }
    }

    pub fn assistant(
        id: MessageId,
        content: String,
        sources: Vec<Source>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            role: MessageRole::Assistant,
            content,
            timestamp,
            sources,
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }

    pub fn is_assistant(&self) -> bool {
        self.role == MessageRole::Assistant
    }

    /// Local wall-clock time of the turn, `HH:MM:SS`
    pub fn local_time(&self) -> String {
        self.timestamp
            .with_timezone(&chrono::Local)
            .format("%H:%M:%S")
            .to_string()
    }
}

/// Hands out message ids from the clock in milliseconds, bumped so they
/// stay strictly increasing when several turns land in the same millisecond.
#[derive(Debug, Clone)]
pub struct MessageIdAllocator {
    last: MessageId,
}

impl MessageIdAllocator {
    pub fn new() -> Self {
        Self { last: GREETING_ID }
    }

    pub fn next(&mut self, now: DateTime<Utc>) -> MessageId {
        let id = now.timestamp_millis().max(self.last + 1);
        self.last = id;
        id
    }
}

impl Default for MessageIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
