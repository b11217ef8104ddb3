use thiserror::Error;

/// Errors returned by the provider client.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider returned a non-2xx status.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The provider returned an error object `{"detail": ...}`.
    #[error("provider error: {0}")]
    Api(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The response parsed as JSON but was not the expected array shape.
    #[error("provider returned {received} where an array was expected")]
    InvalidResponse { received: &'static str },

    /// All retry attempts for a keyword were used up.
    #[error("fetch for keyword \"{keyword}\" failed after {attempts} attempts: {source}")]
    Exhausted {
        keyword: String,
        attempts: u32,
        #[source]
        source: Box<ScrapeError>,
    },
}

impl ScrapeError {
    /// Returns `true` for transient conditions worth retrying after backoff.
    ///
    /// **Retryable:** network-level failures (timeout, connection
    /// reset/refused) and 5xx responses.
    ///
    /// **Fatal:** 4xx statuses, provider error bodies, malformed payloads,
    /// and already-exhausted fetches. Retrying won't fix any of them.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ScrapeError::Http(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            ScrapeError::UnexpectedStatus { status, .. } => *status >= 500,
            ScrapeError::Api(_)
            | ScrapeError::Deserialize { .. }
            | ScrapeError::InvalidResponse { .. }
            | ScrapeError::Exhausted { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_retryable() {
        let err = ScrapeError::UnexpectedStatus {
            status: 503,
            url: "http://test/search".to_owned(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn client_errors_are_fatal() {
        let err = ScrapeError::UnexpectedStatus {
            status: 404,
            url: "http://test/search".to_owned(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn provider_detail_is_fatal() {
        assert!(!ScrapeError::Api("cookie expired".to_owned()).is_retryable());
    }

    #[test]
    fn deserialize_error_is_fatal() {
        let source = serde_json::from_str::<()>("nope").unwrap_err();
        let err = ScrapeError::Deserialize {
            context: "search response".to_owned(),
            source,
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn exhausted_is_terminal() {
        let err = ScrapeError::Exhausted {
            keyword: "AI".to_owned(),
            attempts: 3,
            source: Box::new(ScrapeError::UnexpectedStatus {
                status: 502,
                url: "http://test/search".to_owned(),
            }),
        };
        assert!(!err.is_retryable());
    }
}
