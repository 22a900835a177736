//! Events emitted by an edit session

use uuid::Uuid;

use crate::session::SessionState;

/// Events emitted by an [`EditSession`](crate::EditSession) on every transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session moved from one state to another
    StateChanged {
        session_id: Uuid,
        from: SessionState,
        to: SessionState,
    },

    /// Every statement of a batch succeeded and the baseline advanced.
    Saved {
        session_id: Uuid,
        /// Table the batch was applied to
        table: String,
        /// Number of statements sent (zero for a no-op save)
        statement_count: usize,
    },

    /// A save ended with rejected statements or a transport failure.
    /// The draft is retained.
    SaveFailed {
        session_id: Uuid,
        /// Messages for display, prefix already stripped
        messages: Vec<String>,
    },

    /// The session was closed and no longer accepts operations
    Closed { session_id: Uuid },
}

impl SessionEvent {
    pub fn session_id(&self) -> Uuid {
        match self {
            SessionEvent::StateChanged { session_id, .. }
            | SessionEvent::Saved { session_id, .. }
            | SessionEvent::SaveFailed { session_id, .. }
            | SessionEvent::Closed { session_id } => *session_id,
        }
    }
}
