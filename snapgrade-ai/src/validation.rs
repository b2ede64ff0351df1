use serde_json::{Map, Value};

use snapgrade_common::BackendError;
use snapgrade_common::models::analysis::{MAX_CRITERIA_SCORE, MAX_OVERALL_SCORE};
use snapgrade_common::models::{AnalysisCriteria, AnalysisResult};

/// Parses the JSON text the model produced into a validated report.
pub fn parse_analysis_text(text: &str, is_mock: bool) -> Result<AnalysisResult, BackendError> {
    let value: Value = serde_json::from_str(text.trim()).map_err(|e| {
        BackendError::malformed(format!("AI response is not valid JSON: {}", e))
    })?;
    parse_analysis_value(&value, is_mock)
}

/// Checks the report shape and normalises the scores.
///
/// `overallScore`, a non-empty `summary` and a `report` array must all be
/// present. Scores are rounded and clamped into their ranges.
pub fn parse_analysis_value(value: &Value, is_mock: bool) -> Result<AnalysisResult, BackendError> {
    let obj = value
        .as_object()
        .ok_or_else(|| BackendError::malformed("AI response is not a JSON object"))?;

    let present = |key: &str| obj.get(key).filter(|v| !v.is_null());
    let summary_given = present("summary")
        .map_or(false, |v| v.as_str().map_or(true, |s| !s.trim().is_empty()));

    let missing: Vec<&str> = [
        ("overallScore", present("overallScore").is_some()),
        ("summary", summary_given),
        ("report", present("report").is_some()),
    ]
    .into_iter()
    .filter(|(_, given)| !given)
    .map(|(key, _)| key)
    .collect();
    if !missing.is_empty() {
        return Err(BackendError::malformed(format!(
            "AI response is missing required fields: {}",
            missing.join(", ")
        )));
    }

    let overall = obj
        .get("overallScore")
        .and_then(Value::as_f64)
        .ok_or_else(|| wrong_type("overallScore", "a number"))?;
    let summary = obj
        .get("summary")
        .and_then(Value::as_str)
        .ok_or_else(|| wrong_type("summary", "a string"))?;
    let report = obj
        .get("report")
        .and_then(Value::as_array)
        .ok_or_else(|| wrong_type("report", "an array"))?;

    let report = report
        .iter()
        .enumerate()
        .map(|(idx, entry)| parse_criteria(idx, entry))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AnalysisResult {
        overall_score: clamp_score(overall, MAX_OVERALL_SCORE),
        summary: summary.to_string(),
        report,
        is_mock,
    })
}

fn parse_criteria(idx: usize, entry: &Value) -> Result<AnalysisCriteria, BackendError> {
    let obj: &Map<String, Value> = entry.as_object().ok_or_else(|| {
        BackendError::malformed(format!("report entry {} is not an object", idx))
    })?;

    let criteria = obj
        .get("criteria")
        .and_then(Value::as_str)
        .ok_or_else(|| BackendError::malformed(format!("report entry {} is missing 'criteria'", idx)))?;
    let score = obj
        .get("score")
        .and_then(Value::as_f64)
        .ok_or_else(|| BackendError::malformed(format!("report entry {} is missing 'score'", idx)))?;
    let explanation = obj.get("explanation").and_then(Value::as_str).unwrap_or_default();

    Ok(AnalysisCriteria::new(
        criteria,
        clamp_score(score, MAX_CRITERIA_SCORE),
        explanation,
    ))
}

fn wrong_type(field: &str, expected: &str) -> BackendError {
    BackendError::malformed(format!("AI response field '{}' must be {}", field, expected))
}

fn clamp_score(raw: f64, max: u32) -> u32 {
    if !raw.is_finite() {
        return 0;
    }
    raw.round().clamp(0.0, f64::from(max)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_report_is_normalised() {
        let value = json!({
            "overallScore": 86.6,
            "summary": "Bright and sharp. Consider a plain background.",
            "report": [
                { "criteria": "Lighting", "score": 9, "explanation": "Even light." },
                { "criteria": "Background", "score": 12.2, "explanation": "Busy." },
                { "criteria": "Sharpness", "score": -1 }
            ]
        });

        let result = parse_analysis_value(&value, false).unwrap();
        assert_eq!(result.overall_score, 87);
        assert!(!result.is_mock);
        assert_eq!(result.report.len(), 3);
        assert_eq!(result.report[0].criteria, "Lighting");
        assert_eq!(result.report[1].score, 10);
        assert_eq!(result.report[2].score, 0);
        assert_eq!(result.report[2].explanation, "");
    }

    #[test]
    fn test_missing_report_is_malformed() {
        let value = json!({ "overallScore": 50, "summary": "ok" });
        let err = parse_analysis_value(&value, false).unwrap_err();
        assert_eq!(
            err,
            BackendError::Malformed("AI response is missing required fields: report".into())
        );
    }

    #[test]
    fn test_missing_fields_are_all_listed() {
        let err = parse_analysis_value(&json!({ "summary": "" }), false).unwrap_err();
        match err {
            BackendError::Malformed(msg) => {
                assert!(msg.contains("overallScore"));
                assert!(msg.contains("summary"));
                assert!(msg.contains("report"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_wrong_types_are_not_reported_as_missing() {
        let err = parse_analysis_value(
            &json!({ "overallScore": "high", "summary": "s", "report": [] }),
            false,
        )
        .unwrap_err();
        assert_eq!(
            err,
            BackendError::Malformed("AI response field 'overallScore' must be a number".into())
        );

        let err = parse_analysis_value(
            &json!({ "overallScore": 70, "summary": "s", "report": {} }),
            false,
        )
        .unwrap_err();
        assert_eq!(
            err,
            BackendError::Malformed("AI response field 'report' must be an array".into())
        );

        let err = parse_analysis_value(
            &json!({ "overallScore": null, "summary": "s", "report": [] }),
            false,
        )
        .unwrap_err();
        assert_eq!(
            err,
            BackendError::Malformed("AI response is missing required fields: overallScore".into())
        );
    }

    #[test]
    fn test_empty_report_array_is_accepted() {
        let value = json!({ "overallScore": 0, "summary": "Nothing to grade.", "report": [] });
        let result = parse_analysis_value(&value, true).unwrap();
        assert!(result.report.is_empty());
        assert!(result.is_mock);
    }

    #[test]
    fn test_non_json_text() {
        let err = parse_analysis_text("Sorry, I can't help with that.", false).unwrap_err();
        assert!(matches!(err, BackendError::Malformed(_)));
    }

    #[test]
    fn test_entry_without_criteria() {
        let value = json!({
            "overallScore": 40,
            "summary": "s",
            "report": [{ "score": 4, "explanation": "x" }]
        });
        let err = parse_analysis_value(&value, false).unwrap_err();
        assert_eq!(
            err,
            BackendError::Malformed("report entry 0 is missing 'criteria'".into())
        );
    }
}
