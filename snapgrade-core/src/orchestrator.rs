// File: src/orchestrator.rs

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tracing::{error, info};

use snapgrade_common::BackendError;
use snapgrade_common::models::{AnalysisResult, ImagePayload, User, UserTier};
use snapgrade_common::traits::{BasicAnalysisBackend, FullAnalysisBackend};

use crate::error::AnalysisError;
use crate::ledger::EntitlementLedger;

/// Runs scans against the right backend for the user's tier and spends
/// quota or credits only once the backend has answered successfully.
pub struct AnalysisOrchestrator {
    full: Arc<dyn FullAnalysisBackend>,
    basic: Arc<dyn BasicAnalysisBackend>,
    request_timeout: Option<Duration>,
}

impl AnalysisOrchestrator {
    pub fn new(full: Arc<dyn FullAnalysisBackend>, basic: Arc<dyn BasicAnalysisBackend>) -> Self {
        Self {
            full,
            basic,
            request_timeout: None,
        }
    }

    /// Caps each backend request; a request that runs over counts as failed.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    /// Paid users get one AI report per image; everyone else gets a basic
    /// report for the first image only.
    pub async fn run_scan(
        &self,
        images: &[ImagePayload],
        ledger: &EntitlementLedger,
    ) -> Result<Vec<AnalysisResult>, AnalysisError> {
        if images.is_empty() {
            return Err(AnalysisError::NoImages);
        }

        let user = ledger.snapshot();
        match user.tier() {
            UserTier::Paid => self.run_full_batch(images, &user, ledger).await,
            UserTier::Guest | UserTier::Free => self.run_basic(&images[0], &user, ledger).await,
        }
    }

    async fn run_full_batch(
        &self,
        images: &[ImagePayload],
        user: &User,
        ledger: &EntitlementLedger,
    ) -> Result<Vec<AnalysisResult>, AnalysisError> {
        let required = u32::try_from(images.len()).unwrap_or(u32::MAX);
        let available = user.ai_credits();
        if available < required {
            info!("Paid scan blocked: {} credits needed, {} available", required, available);
            return Err(AnalysisError::InsufficientCredits { required, available });
        }

        info!("Starting full analysis of {} image(s)", images.len());

        // Fan out, then look at every outcome before deciding.
        let outcomes = join_all(
            images
                .iter()
                .map(|image| self.with_timeout(self.full.analyze(image))),
        )
        .await;

        let mut results = Vec::with_capacity(outcomes.len());
        for (idx, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(result) => results.push(AnalysisResult { is_mock: false, ..result }),
                Err(err) => {
                    error!(
                        "Full analysis failed for image {} ('{}'): {}",
                        idx,
                        images[idx].display_name(),
                        err
                    );
                    return Err(AnalysisError::from_full_backend(err));
                }
            }
        }

        ledger.consume_ai_credits(required);
        info!(
            "Full analysis complete: {} report(s), {} credit(s) left",
            results.len(),
            ledger.ai_credits()
        );
        Ok(results)
    }

    async fn run_basic(
        &self,
        image: &ImagePayload,
        user: &User,
        ledger: &EntitlementLedger,
    ) -> Result<Vec<AnalysisResult>, AnalysisError> {
        let tier = user.tier();
        if ledger.remaining_basic_scans().is_exhausted() {
            info!("Basic scan blocked: {} quota exhausted", tier);
            return Err(AnalysisError::QuotaExhausted(tier));
        }

        let result = self
            .with_timeout(self.basic.analyze(image))
            .await
            .map_err(|err| {
                error!("Basic analysis failed for '{}': {}", image.display_name(), err);
                AnalysisError::from_basic_backend(err)
            })?;

        // Only reachable if the quota moved while the request was in flight.
        if !ledger.consume_basic_scan() {
            info!("Basic scan finished but the {} quota was used up meanwhile", tier);
            return Err(AnalysisError::QuotaExhausted(tier));
        }

        info!(
            "Basic analysis of '{}' scored {}/100, {} scan(s) left",
            image.display_name(),
            result.overall_score,
            ledger.remaining_basic_scans()
        );
        Ok(vec![AnalysisResult { is_mock: true, ..result }])
    }

    async fn with_timeout<F>(&self, fut: F) -> Result<AnalysisResult, BackendError>
    where
        F: Future<Output = Result<AnalysisResult, BackendError>>,
    {
        match self.request_timeout {
            Some(limit) => tokio::time::timeout(limit, fut).await.unwrap_or_else(|_| {
                Err(BackendError::unavailable(format!(
                    "Analysis request timed out after {:.1}s",
                    limit.as_secs_f64()
                )))
            }),
            None => fut.await,
        }
    }
}
