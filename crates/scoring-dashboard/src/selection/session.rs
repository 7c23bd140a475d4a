use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SelectionState;

/// Opaque key for one analyst's dashboard session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stored per-session state: the selection plus bookkeeping timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub id: SessionId,
    pub selection: SelectionState,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl SessionRecord {
    pub fn open(now: DateTime<Utc>) -> Self {
        Self {
            id: SessionId::generate(),
            selection: SelectionState::new(),
            created_at: now,
            last_seen: now,
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_seen = now;
    }

    pub fn is_idle(&self, now: DateTime<Utc>, max_idle: Duration) -> bool {
        now.signed_duration_since(self.last_seen) > max_idle
    }
}

/// Storage abstraction for sessions so the service can be exercised in isolation.
pub trait SessionStore: Send + Sync {
    fn insert(&self, record: SessionRecord) -> Result<SessionRecord, SessionError>;
    fn save(&self, record: SessionRecord) -> Result<(), SessionError>;
    fn fetch(&self, id: &SessionId) -> Result<Option<SessionRecord>, SessionError>;
    /// Drop sessions idle for longer than `max_idle`, returning how many were removed.
    fn prune_idle(&self, now: DateTime<Utc>, max_idle: Duration) -> Result<usize, SessionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session already exists")]
    Conflict,
    #[error("session not found")]
    NotFound,
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}
