//! Admission control in front of an analysis client.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::client::{AnalysisClient, AnalysisError, AnalysisReply};
use crate::prompt::AnalysisRequest;

/// Caps the number of in-flight calls to the wrapped client.
///
/// Callers over the cap wait for a permit. A permit is held for the duration
/// of one call and released when the call future completes or is dropped.
pub struct GatedClient<C> {
    inner: C,
    permits: Arc<Semaphore>,
    limit: usize,
}

impl<C: AnalysisClient> GatedClient<C> {
    pub fn new(inner: C, max_concurrency: usize) -> Self {
        let limit = max_concurrency.max(1);
        Self {
            inner,
            permits: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Permits not currently held by a call.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

#[async_trait]
impl<C: AnalysisClient> AnalysisClient for GatedClient<C> {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReply, AnalysisError> {
        let _permit = self.permits.acquire().await.map_err(|_| {
            AnalysisError::ServiceUnavailable("admission gate closed".to_string())
        })?;
        debug!(
            in_flight = self.limit - self.permits.available_permits(),
            limit = self.limit,
            "admitted analysis call"
        );
        self.inner.analyze(request).await
    }

    fn model(&self) -> &str {
        self.inner.model()
    }
}
