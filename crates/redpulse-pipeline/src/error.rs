use thiserror::Error;

/// Errors a collection or report run can surface to callers.
///
/// Per-keyword fetch failures are absorbed inside the run (fallback or skip)
/// and never appear here; only input validation, storage failures, and an
/// entirely empty run abort.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Caller input was rejected before any work started. Never retried.
    #[error("invalid pipeline input: {0}")]
    Validation(String),

    /// A checkpoint, dedup query, or report write failed.
    #[error("storage operation failed: {0}")]
    Storage(anyhow::Error),

    /// Every keyword yielded zero posts.
    #[error("collection produced no posts across any keyword")]
    NoData,
}
