use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for sale sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub u32);

impl From<u32> for SessionId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session_{}", self.0)
    }
}

/// A live broadcast uses the quick-entry form (alias identity, session-unique codes);
/// a regular sale uses the full form (real-name identity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionKind {
    Live,
    Regular,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Open,
    Closed,
}

/// One sale event grouping captured lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub name: String,
    pub kind: SessionKind,
    pub status: SessionStatus,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// Payload for opening a session. A missing name gets [`default_session_name`].
#[derive(Debug, Clone)]
pub struct SessionCreate {
    pub kind: SessionKind,
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SessionUpdate {
    pub name: String,
}

impl Session {
    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }

    /// The explicit capture context for this session.
    pub fn capture(&self) -> CaptureSession {
        CaptureSession {
            session_id: self.id,
            kind: self.kind,
        }
    }
}

/// What the reconciler needs to know about the session lines are captured into.
///
/// Passed explicitly to every capture call instead of living in ambient UI state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSession {
    pub session_id: SessionId,
    pub kind: SessionKind,
}

/// Unique key held by whichever session is currently open.
pub const OPEN_SESSION_KEY: &str = "session:open";

/// `Live 17-10-2026 20h05` for broadcasts, `Vente 17-10-2026 20h05` for regular sales.
pub fn default_session_name(kind: SessionKind, at: NaiveDateTime) -> String {
    let prefix = match kind {
        SessionKind::Live => "Live",
        SessionKind::Regular => "Vente",
    };
    format!("{} {}", prefix, at.format("%d-%m-%Y %Hh%M"))
}
