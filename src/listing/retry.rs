//! Bounded retry for detail pages.

use crate::error::FetchError;
use crate::listing::models::VehicleRecord;
use std::future::Future;
use tracing::{debug, warn};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Retries a detail fetch on timeout, up to a fixed number of attempts.
///
/// Only [`FetchError::Timeout`] is retried. When every attempt times out the
/// listing is represented by an all-NIL placeholder that keeps its link, so a
/// slow page never drops a row from the output.
#[derive(Debug, Clone, Copy)]
pub struct RetryController {
    max_attempts: u32,
}

impl Default for RetryController {
    fn default() -> Self {
        Self { max_attempts: DEFAULT_MAX_ATTEMPTS }
    }
}

impl RetryController {
    /// At least one attempt is always made.
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts: max_attempts.max(1) }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Runs `attempt` until it succeeds, hits a hard failure, or runs out of attempts.
    ///
    /// Hard failures are returned to the caller unchanged.
    pub async fn fetch_detail<F, Fut>(&self, link: &str, mut attempt: F) -> Result<VehicleRecord, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<VehicleRecord, FetchError>>,
    {
        for n in 1..=self.max_attempts {
            match attempt().await {
                Ok(record) => return Ok(record),
                Err(FetchError::Timeout { .. }) => {
                    debug!("Attempt {}/{} timed out for {}", n, self.max_attempts, link);
                }
                Err(e) => return Err(e),
            }
        }

        warn!("Giving up on {} after {} attempts, emitting NIL row", link, self.max_attempts);
        Ok(VehicleRecord::placeholder(link))
    }

    /// Like [`fetch_detail`](Self::fetch_detail), but a hard failure also
    /// becomes a placeholder.
    pub async fn fetch_detail_or_placeholder<F, Fut>(&self, link: &str, attempt: F) -> VehicleRecord
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<VehicleRecord, FetchError>>,
    {
        match self.fetch_detail(link, attempt).await {
            Ok(record) => record,
            Err(e) => {
                warn!("{}", e);
                VehicleRecord::placeholder(link)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::models::FuelType;
    use std::sync::atomic::{AtomicU32, Ordering};

    const LINK: &str = "https://example.com/info.php?ID=1";

    fn good() -> VehicleRecord {
        VehicleRecord::new(Some("Honda".into()), "Vezel", FuelType::PetrolElectric, LINK)
    }

    #[test]
    fn test_new_clamps_to_one() {
        assert_eq!(RetryController::new(0).max_attempts(), 1);
        assert_eq!(RetryController::new(5).max_attempts(), 5);
        assert_eq!(RetryController::default().max_attempts(), DEFAULT_MAX_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_success_first_try() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result = RetryController::default()
            .fetch_detail(LINK, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, FetchError>(good())
            })
            .await
            .unwrap();

        assert_eq!(result.model.as_deref(), Some("Vezel"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_timeout_then_success() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result = RetryController::default()
            .fetch_detail(LINK, move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(FetchError::timeout(LINK))
                } else {
                    Ok(good())
                }
            })
            .await
            .unwrap();

        assert!(!result.is_placeholder());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_always_timeout_yields_placeholder_after_three() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result = RetryController::default()
            .fetch_detail(LINK, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<VehicleRecord, _>(FetchError::timeout(LINK))
            })
            .await
            .unwrap();

        assert!(result.is_placeholder());
        assert_eq!(result.source_link, LINK);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_hard_failure_not_retried() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let err = RetryController::default()
            .fetch_detail(LINK, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<VehicleRecord, _>(FetchError::hard(LINK, "HTTP 404"))
            })
            .await
            .unwrap_err();

        assert!(!err.is_timeout());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_or_placeholder_absorbs_hard_failure() {
        let result = RetryController::new(2)
            .fetch_detail_or_placeholder(LINK, || async {
                Err::<VehicleRecord, _>(FetchError::hard(LINK, "HTTP 500"))
            })
            .await;

        assert!(result.is_placeholder());
        assert_eq!(result.source_link, LINK);
    }
}
