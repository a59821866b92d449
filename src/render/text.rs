//! Plain text rendering for analysis results.

use std::fmt::Write;

use crate::ats::{AtsAnalysisResult, Priority};

/// Render a human-readable report.
pub fn to_text(result: &AtsAnalysisResult) -> String {
    let mut out = String::new();
    let score = &result.score;

    let _ = writeln!(out, "ATS score: {}/100 (grade {})", score.overall, score.grade);
    let _ = writeln!(out, "{}", score.description);
    let _ = writeln!(out);
    let _ = writeln!(out, "  Keyword match: {}", score.keyword_match);
    let _ = writeln!(out, "  Formatting:    {}", score.formatting);
    let _ = writeln!(out, "  Readability:   {}", score.readability);

    if result.reference_size() > 0 {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Keywords found ({}/{}): {}",
            result.found_keywords.len(),
            result.reference_size(),
            list_or_none(&result.found_keywords)
        );
        let _ = writeln!(out, "Keywords missing: {}", list_or_none(&result.missing_keywords));
    }

    if !result.issues.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Issues:");
        for issue in &result.issues {
            let _ = writeln!(out, "  [{:?}] {}", issue.severity, issue.message);
        }
    }

    if !result.suggestions.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Suggestions:");
        for suggestion in &result.suggestions {
            let _ = writeln!(out, "  {} {}", marker(suggestion.priority), suggestion.message);
        }
    }

    out.trim_end().to_string()
}

fn marker(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "!!",
        Priority::Medium => "! ",
        Priority::Low => "- ",
    }
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}
