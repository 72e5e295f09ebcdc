//! User sessions: conversation messages plus free-form state.
//!
//! Sessions live in process memory; [`InMemorySessionService::archive_session`]
//! copies one into the memory bank for long-term retention.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::memory::{context, Clock, SharedMemoryBank, SystemClock};

/// Memory bank category that archived sessions are stored under.
pub const SESSION_CATEGORY: &str = "sessions";

/// Default number of trailing messages returned by [`Session::get_context`].
pub const DEFAULT_CONTEXT_MESSAGES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMessage {
    pub role: String,
    pub content: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub state: Map<String, Value>,
    pub messages: Vec<SessionMessage>,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
}

impl Session {
    pub fn new(session_id: impl Into<String>, initial_state: Map<String, Value>) -> Self {
        Self::started_at(session_id, initial_state, Utc::now())
    }

    /// A fresh session whose creation and last access are `now`.
    pub fn started_at(
        session_id: impl Into<String>,
        initial_state: Map<String, Value>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            state: initial_state,
            messages: Vec::new(),
            created_at: now,
            last_accessed: now,
        }
    }

    pub fn add_message(
        &mut self,
        role: impl Into<String>,
        content: impl Into<String>,
        metadata: Map<String, Value>,
    ) {
        let now = Utc::now();
        self.messages.push(SessionMessage {
            role: role.into(),
            content: content.into(),
            metadata,
            timestamp: now,
        });
        self.last_accessed = now;
    }

    pub fn update_state(&mut self, key: impl Into<String>, value: Value) {
        self.update_state_at(key, value, Utc::now());
    }

    pub fn update_state_at(&mut self, key: impl Into<String>, value: Value, now: DateTime<Utc>) {
        self.state.insert(key.into(), value);
        self.last_accessed = now;
    }

    /// The last `max_messages` messages, oldest first.
    pub fn get_context(&self, max_messages: usize) -> &[SessionMessage] {
        let start = self.messages.len().saturating_sub(max_messages);
        &self.messages[start..]
    }
}

/// Session registry held in process memory.
#[derive(Debug)]
pub struct InMemorySessionService {
    sessions: HashMap<String, Session>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemorySessionService {
    fn default() -> Self {
        Self {
            sessions: HashMap::new(),
            clock: Arc::new(SystemClock),
        }
    }
}

impl InMemorySessionService {
    pub fn new() -> Self {
        info!(event = "session.service_initialized");
        Self::default()
    }

    /// Replace the time source used for session timestamps and idle cleanup.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Create a session, or return the existing one with that id unchanged.
    pub fn create_session(
        &mut self,
        session_id: &str,
        initial_state: Map<String, Value>,
    ) -> &mut Session {
        if self.sessions.contains_key(session_id) {
            info!(event = "session.exists", session_id = %session_id);
        } else {
            info!(event = "session.created", session_id = %session_id);
        }
        let now = self.clock.now();
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Session::started_at(session_id, initial_state, now))
    }

    /// Look up a session, marking it as accessed.
    pub fn get_session(&mut self, session_id: &str) -> Option<&mut Session> {
        let now = self.clock.now();
        let session = self.sessions.get_mut(session_id)?;
        session.last_accessed = now;
        Some(session)
    }

    /// Merge `data` into a session's state. Returns `false` if it does not exist.
    pub fn update_session(&mut self, session_id: &str, data: Map<String, Value>) -> bool {
        let now = self.clock.now();
        let Some(session) = self.get_session(session_id) else {
            warn!(event = "session.missing", session_id = %session_id);
            return false;
        };
        for (key, value) in data {
            session.update_state_at(key, value, now);
        }
        true
    }

    pub fn delete_session(&mut self, session_id: &str) -> bool {
        let removed = self.sessions.remove(session_id).is_some();
        if removed {
            info!(event = "session.deleted", session_id = %session_id);
        }
        removed
    }

    /// Ids of all live sessions, sorted.
    pub fn list_sessions(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Drop sessions idle for longer than `hours`. Returns how many were removed.
    pub fn cleanup_old_sessions(&mut self, hours: u32) -> usize {
        let cutoff = self.clock.now() - Duration::hours(i64::from(hours));
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| session.last_accessed >= cutoff);
        let removed = before - self.sessions.len();
        info!(event = "session.cleanup", removed = removed);
        removed
    }

    /// Copy a session into the memory bank under `sessions:<id>`.
    pub fn archive_session(&self, session_id: &str, bank: &SharedMemoryBank) -> bool {
        let Some(session) = self.sessions.get(session_id) else {
            warn!(event = "session.missing", session_id = %session_id);
            return false;
        };
        bank.store_in(
            SESSION_CATEGORY,
            session_id,
            session,
            context([("type", "session")]),
        )
    }
}
