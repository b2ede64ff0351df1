use async_trait::async_trait;

use crate::error::BackendError;
use crate::models::{AnalysisResult, ImagePayload};

/// The AI provider that produces the full, credit-metered report.
#[async_trait]
pub trait FullAnalysisBackend: Send + Sync {
    async fn analyze(&self, image: &ImagePayload) -> Result<AnalysisResult, BackendError>;
}

/// The lightweight backend behind guest and free scans.
#[async_trait]
pub trait BasicAnalysisBackend: Send + Sync {
    async fn analyze(&self, image: &ImagePayload) -> Result<AnalysisResult, BackendError>;
}
