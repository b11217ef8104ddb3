//! Resume-or-restart decision for an interrupted collection session.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use redpulse_core::CollectionProgress;

#[derive(Debug)]
pub(crate) struct SessionPlan {
    pub session_id: Uuid,
    pub start_index: usize,
    pub started_at: DateTime<Utc>,
    pub resumed: bool,
}

/// Decides where a run starts given the last persisted checkpoint.
///
/// A checkpoint is resumable when its keyword count matches the current
/// list, its `updated_at` falls within the session window, and at least one
/// keyword remains after `current_index`. Resuming continues the same
/// session id at `current_index + 1`; the interrupted keyword itself is
/// re-fetched only if its checkpoint was written but the fetch never
/// completed, which the dedup store absorbs.
pub(crate) fn plan_session(
    checkpoint: Option<&CollectionProgress>,
    total_keywords: usize,
    session_window_secs: i64,
    now: DateTime<Utc>,
) -> SessionPlan {
    if let Some(progress) = checkpoint {
        let age_secs = now.signed_duration_since(progress.updated_at).num_seconds();
        if progress.total_keywords == total_keywords
            && age_secs < session_window_secs
            && progress.current_index + 1 < total_keywords
        {
            return SessionPlan {
                session_id: progress.session_id,
                start_index: progress.current_index + 1,
                started_at: progress.started_at,
                resumed: true,
            };
        }
    }
    SessionPlan {
        session_id: Uuid::new_v4(),
        start_index: 0,
        started_at: now,
        resumed: false,
    }
}
