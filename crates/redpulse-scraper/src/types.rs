//! Wire types for the provider's `POST /search` contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An unscored post as returned by the scraping provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPost {
    pub post_id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: String,
    pub url: String,
    /// The provider echoes the search keyword; absent in some responses.
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Request body for `POST /search`.
#[derive(Debug, Serialize)]
pub(crate) struct SearchRequest<'a> {
    pub keyword: &'a str,
    pub max_posts: u32,
    pub sort_type: &'static str,
    pub note_time: u8,
}
