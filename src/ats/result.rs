//! Analysis result records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::score::AtsScore;

/// Suggestion priority; `High` sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// How serious a structural problem is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl Severity {
    pub fn priority(self) -> Priority {
        match self {
            Severity::Critical => Priority::High,
            Severity::Warning => Priority::Medium,
            Severity::Info => Priority::Low,
        }
    }
}

/// Kind of structural problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    NoExtractableText,
    NearEmptyText,
    MissingContactInfo,
    MissingDateRanges,
    NoBulletPoints,
    FewSectionHeadings,
    ExcessiveKeywordDensity,
    LongSentences,
    VeryLongSentence,
    LongLines,
    ShortContent,
}

impl IssueCode {
    /// Fixed advice for resolving the issue.
    pub fn advice(self) -> &'static str {
        match self {
            IssueCode::NoExtractableText => {
                "Export the document with real text; scanned or image-only files cannot be read"
            }
            IssueCode::NearEmptyText => "Make sure the text is selectable and not embedded as images",
            IssueCode::MissingContactInfo => "Add an e-mail address or phone number near the top",
            IssueCode::MissingDateRanges => "Give each position a date range such as \"Jan 2020 - Present\"",
            IssueCode::NoBulletPoints => "List achievements as bullet points",
            IssueCode::FewSectionHeadings => {
                "Use standard headings such as Experience, Education and Skills"
            }
            IssueCode::ExcessiveKeywordDensity => "Reduce keyword repetition and describe concrete results instead",
            IssueCode::LongSentences => "Shorten sentences to keep them easy to scan",
            IssueCode::VeryLongSentence => "Split very long sentences",
            IssueCode::LongLines => "Break long lines into shorter bullet points",
            IssueCode::ShortContent => "Expand the content with more detail on experience and skills",
        }
    }
}

/// A detected structural problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub code: IssueCode,
    pub severity: Severity,
    pub message: String,
}

impl Issue {
    pub fn new(code: IssueCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
        }
    }
}

/// What a suggestion addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Keywords,
    Structure,
}

/// One actionable recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub priority: Priority,
    pub kind: SuggestionKind,
    pub message: String,
    /// Keywords this suggestion addresses
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    /// Issue this suggestion resolves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<IssueCode>,
}

/// Counts behind the readability score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStats {
    pub word_count: usize,
    pub sentence_count: usize,
    pub line_count: usize,
    /// Words inside keyword occurrences divided by all words
    pub keyword_density: f64,
}

/// Full analysis of one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsAnalysisResult {
    pub score: AtsScore,
    pub found_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub suggestions: Vec<Suggestion>,
    pub issues: Vec<Issue>,
    pub stats: TextStats,
    pub analyzed_at: DateTime<Utc>,
}

impl AtsAnalysisResult {
    pub fn reference_size(&self) -> usize {
        self.found_keywords.len() + self.missing_keywords.len()
    }
}
