use serde::{Deserialize, Serialize};

/// Upper bound of `AnalysisResult::overall_score`.
pub const MAX_OVERALL_SCORE: u32 = 100;

/// Upper bound of `AnalysisCriteria::score`.
pub const MAX_CRITERIA_SCORE: u32 = 10;

/// One row of the report card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisCriteria {
    pub criteria: String,
    pub score: u32,
    pub explanation: String,
}

impl AnalysisCriteria {
    pub fn new(criteria: impl Into<String>, score: u32, explanation: impl Into<String>) -> Self {
        Self {
            criteria: criteria.into(),
            score,
            explanation: explanation.into(),
        }
    }
}

/// A full report card for one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub overall_score: u32,
    pub summary: String,
    pub report: Vec<AnalysisCriteria>,

    /// `true` for basic analysis, `false` for the AI report.
    #[serde(default)]
    pub is_mock: bool,
}
