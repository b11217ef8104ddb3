//! Client for the external post-scraping provider, plus the degraded-mode
//! fallback generator.
//!
//! The provider is opaque: we only model its `POST /search` contract. All
//! transient failures (timeouts, connection errors, 5xx) are retried with
//! exponential backoff; 4xx, error bodies, and malformed payloads are fatal.
//! When the provider is unreachable, [`fallback`] produces schema-valid
//! synthetic posts so the pipeline can still make progress.

pub mod client;
pub mod error;
pub mod fallback;
mod retry;
pub mod types;

pub use client::ProviderClient;
pub use error::ScrapeError;
pub use fallback::{is_fallback_id, FallbackMix, FALLBACK_ID_PREFIX};
pub use types::RawPost;
