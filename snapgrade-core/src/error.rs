// src/error.rs
use thiserror::Error;

use snapgrade_common::BackendError;
use snapgrade_common::models::UserTier;

/// Why a scan produced no report.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Please select an image first.")]
    NoImages,

    #[error("You need {required} AI credits for this scan, but you only have {available}.")]
    InsufficientCredits { required: u32, available: u32 },

    #[error("{}", quota_message(.0))]
    QuotaExhausted(UserTier),

    #[error("{0}")]
    BackendUnavailable(String),

    #[error("Failed to get analysis from AI. The model returned an invalid format: {0}")]
    BackendMalformedResponse(String),

    #[error("An unexpected error occurred during the basic scan: {0}")]
    BasicAnalysisFailed(String),
}

fn quota_message(tier: &UserTier) -> &'static str {
    match tier {
        UserTier::Guest => "You've used all your free guest scans. Sign up to keep scanning.",
        UserTier::Free => "You've reached today's scan limit. Upgrade to Pro for unlimited AI scans.",
        UserTier::Paid => "Scan limit reached.",
    }
}

impl AnalysisError {
    /// Quota and credit failures should open the upgrade/sign-up prompt
    /// instead of an error banner.
    pub fn prompts_upgrade(&self) -> bool {
        matches!(
            self,
            AnalysisError::InsufficientCredits { .. } | AnalysisError::QuotaExhausted(_)
        )
    }

    pub(crate) fn from_full_backend(err: BackendError) -> Self {
        match err {
            BackendError::Unavailable(msg) => AnalysisError::BackendUnavailable(msg),
            BackendError::Malformed(msg) => AnalysisError::BackendMalformedResponse(msg),
        }
    }

    pub(crate) fn from_basic_backend(err: BackendError) -> Self {
        match err {
            BackendError::Unavailable(msg) | BackendError::Malformed(msg) => {
                AnalysisError::BasicAnalysisFailed(msg)
            }
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Please select valid image files (e.g., JPEG, PNG, WEBP).")]
    NoValidImages,

    #[error("No image at position {index} (selection has {len})")]
    OutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}
