use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, error, info};

use snapgrade_common::BackendError;
use snapgrade_common::models::{AnalysisResult, ImagePayload};
use snapgrade_common::traits::FullAnalysisBackend;

use crate::models::ProviderConfig;
use crate::validation::parse_analysis_text;

pub const MISSING_API_KEY_MESSAGE: &str =
    "Gemini API key is not configured. Please set the API_KEY environment variable.";

pub const INVALID_API_KEY_MESSAGE: &str =
    "The configured Gemini API key is invalid. Please check your configuration.";

/// Instruction sent alongside every image.
pub const ANALYSIS_PROMPT: &str = "You are an expert in e-commerce product photography. \
Analyze this image and provide a report card on its quality for a marketplace listing like \
Amazon or Shopify. Provide a score from 1-10 for each criteria, a brief explanation, and an \
overall summary with actionable feedback. The response must be a valid JSON object matching \
the provided schema.";

/// Structured-output schema the model has to follow.
pub fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "overallScore": {
                "type": "NUMBER",
                "description": "A single overall score from 0 to 100 for the entire image quality."
            },
            "summary": {
                "type": "STRING",
                "description": "A concise, 2-3 sentence summary with actionable feedback for the seller."
            },
            "report": {
                "type": "ARRAY",
                "description": "An array of analysis criteria.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "criteria": {
                            "type": "STRING",
                            "description": "The name of the quality metric (e.g., 'Lighting', 'Composition', 'Sharpness', 'Background', 'Resolution')."
                        },
                        "score": {
                            "type": "NUMBER",
                            "description": "A score from 1 to 10 for this specific criteria."
                        },
                        "explanation": {
                            "type": "STRING",
                            "description": "A brief, one-sentence explanation for the score given."
                        }
                    },
                    "required": ["criteria", "score", "explanation"]
                }
            }
        },
        "required": ["overallScore", "summary", "report"]
    })
}

/// Gemini `generateContent` provider for the full report
pub struct GeminiProvider {
    config: ProviderConfig,
    client: Client,
}

impl GeminiProvider {
    pub fn new(config: ProviderConfig) -> Self {
        let client = Client::new();
        Self { config, client }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base(),
            self.config.model
        )
    }

    /// Request body: the image as inline data, then the rubric prompt.
    pub fn build_request(&self, image: &ImagePayload) -> Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [
                    {
                        "inlineData": {
                            "mimeType": image.mime_type(),
                            "data": image.to_base64(),
                        }
                    },
                    { "text": ANALYSIS_PROMPT }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": analysis_schema(),
                "temperature": self.config.temperature,
            }
        })
    }
}

#[async_trait]
impl FullAnalysisBackend for GeminiProvider {
    async fn analyze(&self, image: &ImagePayload) -> Result<AnalysisResult, BackendError> {
        let request_payload = self.build_request(image);

        debug!(
            "Making API call to {} for '{}' ({} bytes)",
            self.endpoint(),
            image.display_name(),
            image.len()
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request_payload)
            .send()
            .await
            .map_err(|e| {
                error!("Error calling Gemini API: {:?}", e);
                BackendError::from(e)
            })?;

        let status = response.status();

        // Get the raw response text first for better error handling
        let response_text = response.text().await?;

        let data = match serde_json::from_str::<Value>(&response_text) {
            Ok(json) => json,
            Err(e) if status.is_success() => {
                error!("Failed to parse Gemini response as JSON: {:?}", e);
                return Err(BackendError::malformed(format!(
                    "Gemini returned a non-JSON response: {}",
                    e
                )));
            }
            Err(_) => {
                error!("Gemini API request failed with status {}", status);
                return Err(BackendError::unavailable(format!(
                    "Gemini API request failed with status {}",
                    status.as_u16()
                )));
            }
        };

        // Check for API errors
        if let Some(err) = data.get("error") {
            let message = err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error");
            error!("Gemini API returned error (status {}): {}", status, message);
            if message.contains("API key not valid") {
                return Err(BackendError::unavailable(INVALID_API_KEY_MESSAGE));
            }
            return Err(BackendError::unavailable(format!("Gemini API error: {}", message)));
        }

        if !status.is_success() {
            error!("Gemini API request failed with status {}", status);
            return Err(BackendError::unavailable(format!(
                "Gemini API request failed with status {}",
                status.as_u16()
            )));
        }

        let text = candidate_text(&data).ok_or_else(|| {
            error!("Gemini response carried no candidate text: {}", response_text);
            BackendError::malformed("AI response contained no text")
        })?;

        let result = parse_analysis_text(&text, false).map_err(|e| {
            error!("Gemini response failed validation: {}", e);
            e
        })?;

        info!(
            "Full analysis of '{}' scored {}/100",
            image.display_name(),
            result.overall_score
        );
        Ok(result)
    }
}

/// Joins the text parts of the first candidate.
fn candidate_text(data: &Value) -> Option<String> {
    let parts = data
        .get("candidates")?
        .as_array()?
        .first()?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();

    if text.trim().is_empty() { None } else { Some(text) }
}

/// Stand-in used when no API key was configured. Every call fails with a
/// configuration message instead of reaching the network.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredFullBackend;

#[async_trait]
impl FullAnalysisBackend for UnconfiguredFullBackend {
    async fn analyze(&self, _image: &ImagePayload) -> Result<AnalysisResult, BackendError> {
        error!("Full analysis requested but no Gemini API key is configured");
        Err(BackendError::unavailable(MISSING_API_KEY_MESSAGE))
    }
}
