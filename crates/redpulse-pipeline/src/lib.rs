//! Serialized keyword-collection pipeline.
//!
//! Walks the tracked keyword list one keyword at a time, fetching posts
//! through a [`PostFetcher`], scoring them, and persisting the deduplicated
//! aggregate through a [`PostStore`]. Progress is checkpointed before every
//! fetch so an interrupted run resumes where it left off. Fetching and
//! persistence sit behind traits so the whole pipeline is testable without a
//! database or network.

pub mod config;
pub mod error;
mod progress;
pub mod report;
pub mod run;
pub mod store;
pub mod traits;

pub use config::{DelayRange, PipelineConfig};
pub use error::PipelineError;
pub use report::build_daily_report;
pub use run::{run_collection, CollectionSummary};
pub use store::{persist_posts, PersistOutcome};
pub use traits::{CheckpointStore, PostFetcher, PostStore, ReportStore};
