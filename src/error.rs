//! Page-source failure taxonomy.
//!
//! A page fetch has three outcomes: the page body, a transient [`FetchError::Timeout`]
//! that the detail retry controller may retry, or a [`FetchError::Hard`] failure that
//! is never retried. Per-field parse failures are not errors at all; they degrade to
//! `None` inside the normalizer.

/// Failure reported by a page source or by the extraction of a fetched page.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The page did not arrive (or never became ready) within the time allowed.
    #[error("timed out fetching {url}")]
    Timeout { url: String },
    /// The request failed outright or the page is structurally unrecognizable.
    #[error("failed to fetch {url}: {reason}")]
    Hard { url: String, reason: String },
}

impl FetchError {
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    pub fn hard(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Hard { url: url.into(), reason: reason.into() }
    }

    /// Returns true for the retryable, timeout-class failure.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// The URL the failure refers to.
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url } | Self::Hard { url, .. } => url,
        }
    }
}
