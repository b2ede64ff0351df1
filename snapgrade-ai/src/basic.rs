use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, error, warn};
use url::Url;

use snapgrade_common::BackendError;
use snapgrade_common::models::{AnalysisCriteria, AnalysisResult, ImagePayload};
use snapgrade_common::traits::BasicAnalysisBackend;

use crate::validation::parse_analysis_value;

pub const FALLBACK_OVERALL_SCORE: u32 = 78;
pub const DEFAULT_FALLBACK_DELAY: Duration = Duration::from_millis(500);

/// Basic analysis served by a remote endpoint that accepts `{"image": <base64>}`.
pub struct RemoteBasicProvider {
    endpoint: Url,
    client: Client,
}

impl RemoteBasicProvider {
    pub fn new(endpoint: Url) -> Self {
        let client = Client::new();
        Self { endpoint, client }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl BasicAnalysisBackend for RemoteBasicProvider {
    async fn analyze(&self, image: &ImagePayload) -> Result<AnalysisResult, BackendError> {
        debug!(
            "Posting '{}' ({} bytes) to basic analysis endpoint {}",
            image.display_name(),
            image.len(),
            self.endpoint
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&json!({ "image": image.to_base64() }))
            .send()
            .await
            .map_err(|e| {
                error!("Basic analysis API call failed: {:?}", e);
                BackendError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<Value>().await {
                Ok(body) => body
                    .get("error")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| {
                        format!("API request failed with status {}", status.as_u16())
                    }),
                Err(_) => "An unknown error occurred".to_string(),
            };
            error!("Basic analysis API call failed: {}", message);
            return Err(BackendError::unavailable(message));
        }

        let body: Value = response.json().await?;

        // The endpoint should flag the result itself; basic results are always mock.
        parse_analysis_value(&body, true)
    }
}

/// Built-in report used when no basic-analysis endpoint is configured.
pub struct FallbackBasicProvider {
    delay: Duration,
}

impl FallbackBasicProvider {
    pub fn new() -> Self {
        Self {
            delay: DEFAULT_FALLBACK_DELAY,
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for FallbackBasicProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BasicAnalysisBackend for FallbackBasicProvider {
    async fn analyze(&self, image: &ImagePayload) -> Result<AnalysisResult, BackendError> {
        warn!(
            "Basic analysis endpoint is not configured. Falling back to the built-in report for '{}'.",
            image.display_name()
        );
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(fallback_report())
    }
}

pub fn fallback_report() -> AnalysisResult {
    AnalysisResult {
        overall_score: FALLBACK_OVERALL_SCORE,
        summary: "This is a basic analysis. It checks for common issues like resolution and \
                  aspect ratio. Upgrade to Pro to get a full AI-powered report with feedback \
                  on lighting, composition, and more!"
            .to_string(),
        report: vec![
            AnalysisCriteria::new(
                "Resolution Check",
                8,
                "Image dimensions are suitable for most marketplaces.",
            ),
            AnalysisCriteria::new("Aspect Ratio", 9, "Standard aspect ratio detected."),
            AnalysisCriteria::new(
                "File Format",
                10,
                "Image is in a web-friendly format (e.g., JPEG/PNG).",
            ),
            AnalysisCriteria::new(
                "Lighting",
                0,
                "Upgrade to Pro for AI-powered lighting analysis.",
            ),
            AnalysisCriteria::new(
                "Composition",
                0,
                "Upgrade to Pro for AI-powered composition analysis.",
            ),
        ],
        is_mock: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_report_shape() {
        let report = fallback_report();
        assert_eq!(report.overall_score, 78);
        assert_eq!(report.report.len(), 5);
        assert!(report.is_mock);
        assert_eq!(report.report[2].criteria, "File Format");
        assert_eq!(report.report[2].score, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_waits_then_answers() {
        let provider = FallbackBasicProvider::new();
        let image = ImagePayload::new(vec![1, 2, 3], "image/jpeg").unwrap();

        let started = tokio::time::Instant::now();
        let result = provider.analyze(&image).await.unwrap();

        assert!(started.elapsed() >= DEFAULT_FALLBACK_DELAY);
        assert_eq!(result, fallback_report());
    }
}
