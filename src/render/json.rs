//! JSON rendering for analysis results.

use crate::ats::AtsAnalysisResult;
use crate::error::{Error, Result};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert an analysis result to JSON.
pub fn to_json(result: &AtsAnalysisResult, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(result),
        JsonFormat::Compact => serde_json::to_string(result),
    };

    json.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Convert several results to one JSON array.
pub fn to_json_batch(results: &[AtsAnalysisResult], format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(results),
        JsonFormat::Compact => serde_json::to_string(results),
    };

    json.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ats::{AnalysisInput, AtsAnalyzer};
    use crate::keywords::KeywordSet;
    use chrono::{TimeZone, Utc};

    fn sample() -> AtsAnalysisResult {
        let keywords = KeywordSet::parse("Python, SQL");
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        AtsAnalyzer::default().analyze_at(&AnalysisInput::plain("Python developer"), &keywords, at)
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&sample(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"keyword_match\": 50"));
        assert!(json.contains("\"missing_keywords\""));
        assert!(json.contains('\n')); // Pretty has newlines
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&sample(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n')); // Compact has no newlines
        assert!(json.contains("\"analyzed_at\":\"2024-03-01T12:00:00Z\""));
    }

    #[test]
    fn test_json_parses_back() {
        let result = sample();
        let json = to_json(&result, JsonFormat::Compact).unwrap();
        let parsed: AtsAnalysisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
    }

    #[test]
    fn test_batch_is_array() {
        let json = to_json_batch(&[sample(), sample()], JsonFormat::Compact).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));
    }
}
