//! Deterministic ATS scoring.
//!
//! Keyword matching runs on the full extracted text, so it sees what a
//! screening parser sees. Formatting and readability run on the visible text
//! only, so an invisible keyword layer can never improve them.

use chrono::{DateTime, Utc};

use crate::keywords::{normalize, Keyword, KeywordSet, KeywordTier};

use super::result::{
    AtsAnalysisResult, Issue, IssueCode, Priority, Severity, Suggestion, SuggestionKind, TextStats,
};
use super::score::{keyword_match_score, AtsScore};
use super::signals::Signals;

const CONTACT_PENALTY: u32 = 15;
const DATE_RANGE_PENALTY: u32 = 15;
const BULLET_PENALTY: u32 = 10;
const HEADING_PENALTY: u32 = 10;
const NEAR_EMPTY_PENALTY: u32 = 50;
const DENSITY_PENALTY: u32 = 15;
const HIGH_DENSITY_PENALTY: u32 = 30;
const AVG_SENTENCE_PENALTY: u32 = 15;
const LONG_SENTENCE_PENALTY: u32 = 10;
const LONG_LINE_PENALTY: u32 = 10;
const SHORT_CONTENT_PENALTY: u32 = 20;

/// Thresholds used by the analyzer.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringOptions {
    /// Keyword density above this costs readability
    pub density_threshold: f64,
    /// Keyword density above this costs twice as much
    pub high_density_threshold: f64,
    pub max_average_sentence_words: usize,
    pub max_sentence_words: usize,
    pub long_line_chars: usize,
    /// Share of non-empty lines allowed to be long
    pub long_line_ratio: f64,
    /// Fewer visible words than this looks like an unreadable source
    pub near_empty_words: usize,
    /// Fewer visible words than this is short content
    pub min_words: usize,
    /// Standard headings expected at minimum
    pub min_headings: usize,
    /// Keywords per suggestion cluster
    pub cluster_size: usize,
}

impl ScoringOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_density_thresholds(mut self, threshold: f64, high: f64) -> Self {
        self.density_threshold = threshold;
        self.high_density_threshold = high.max(threshold);
        self
    }

    pub fn with_sentence_limits(mut self, average: usize, max: usize) -> Self {
        self.max_average_sentence_words = average;
        self.max_sentence_words = max;
        self
    }

    pub fn with_cluster_size(mut self, size: usize) -> Self {
        self.cluster_size = size.max(1);
        self
    }
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            density_threshold: 0.15,
            high_density_threshold: 0.25,
            max_average_sentence_words: 30,
            max_sentence_words: 60,
            long_line_chars: 120,
            long_line_ratio: 0.30,
            near_empty_words: 30,
            min_words: 50,
            min_headings: 2,
            cluster_size: 5,
        }
    }
}

/// Text handed to the analyzer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisInput {
    /// Everything a text reader extracts, invisible runs included
    pub full_text: String,
    /// Only what a human reader sees
    pub visible_text: String,
}

impl AnalysisInput {
    pub fn new(full_text: impl Into<String>, visible_text: impl Into<String>) -> Self {
        Self {
            full_text: full_text.into(),
            visible_text: visible_text.into(),
        }
    }

    /// Plain text with no hidden layer.
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            full_text: text.clone(),
            visible_text: text,
        }
    }
}

/// Scores text against a reference keyword set.
#[derive(Debug, Clone, Default)]
pub struct AtsAnalyzer {
    options: ScoringOptions,
    signals: Signals,
}

impl AtsAnalyzer {
    pub fn new(options: ScoringOptions) -> Self {
        Self {
            options,
            signals: Signals::new(),
        }
    }

    pub fn options(&self) -> &ScoringOptions {
        &self.options
    }

    /// Analyze now.
    pub fn analyze(&self, input: &AnalysisInput, reference: &KeywordSet) -> AtsAnalysisResult {
        self.analyze_at(input, reference, Utc::now())
    }

    /// Analyze with an explicit timestamp; the result depends on nothing else.
    pub fn analyze_at(
        &self,
        input: &AnalysisInput,
        reference: &KeywordSet,
        analyzed_at: DateTime<Utc>,
    ) -> AtsAnalysisResult {
        let full = normalize(&input.full_text);
        let (found, missing) = partition_keywords(&full, reference);
        let keyword_match = keyword_match_score(found.len(), reference.len());

        let mut issues = Vec::new();
        let formatting = self.formatting_score(&input.visible_text, &mut issues);
        let (readability, stats) = self.readability_score(&input.visible_text, reference, &mut issues);

        let score = AtsScore::new(keyword_match, formatting, readability);
        let suggestions = self.suggestions(&missing, &issues);

        log::debug!(
            "ats score {} (keywords {}, formatting {}, readability {})",
            score.overall,
            score.keyword_match,
            score.formatting,
            score.readability
        );

        AtsAnalysisResult {
            score,
            found_keywords: found.into_iter().map(|k| k.text.clone()).collect(),
            missing_keywords: missing.iter().map(|k| k.text.clone()).collect(),
            suggestions,
            issues,
            stats,
            analyzed_at,
        }
    }

    fn formatting_score(&self, visible: &str, issues: &mut Vec<Issue>) -> u32 {
        if visible.trim().is_empty() {
            issues.push(Issue::new(
                IssueCode::NoExtractableText,
                Severity::Critical,
                "No visible text could be extracted",
            ));
            return 0;
        }

        let mut score = 100u32;
        let mut deduct = |points: u32, issue: Issue| {
            score = score.saturating_sub(points);
            issues.push(issue);
        };

        if !self.signals.has_contact_info(visible) {
            deduct(
                CONTACT_PENALTY,
                Issue::new(
                    IssueCode::MissingContactInfo,
                    Severity::Warning,
                    "No e-mail address or phone number found",
                ),
            );
        }
        if !self.signals.has_date_range(visible) {
            deduct(
                DATE_RANGE_PENALTY,
                Issue::new(
                    IssueCode::MissingDateRanges,
                    Severity::Warning,
                    "No employment date ranges found",
                ),
            );
        }
        if !self.signals.has_bullets(visible) {
            deduct(
                BULLET_PENALTY,
                Issue::new(IssueCode::NoBulletPoints, Severity::Info, "No bullet points found"),
            );
        }
        let headings = self.signals.headings(visible).len();
        if headings < self.options.min_headings {
            deduct(
                HEADING_PENALTY,
                Issue::new(
                    IssueCode::FewSectionHeadings,
                    Severity::Info,
                    format!("Found {} standard section heading(s)", headings),
                ),
            );
        }
        let words = visible.split_whitespace().count();
        if words < self.options.near_empty_words {
            deduct(
                NEAR_EMPTY_PENALTY,
                Issue::new(
                    IssueCode::NearEmptyText,
                    Severity::Critical,
                    format!("Only {} word(s) of text; the source may be image-only", words),
                ),
            );
        }
        score
    }

    fn readability_score(
        &self,
        visible: &str,
        reference: &KeywordSet,
        issues: &mut Vec<Issue>,
    ) -> (u32, TextStats) {
        let normalized = normalize(visible);
        let word_count = normalized.split_whitespace().count();
        let sentences = self.signals.sentence_lengths(visible);
        let lines: Vec<&str> = visible.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        let keyword_density = keyword_density(&normalized, word_count, reference);

        let stats = TextStats {
            word_count,
            sentence_count: sentences.len(),
            line_count: lines.len(),
            keyword_density,
        };
        if word_count == 0 {
            return (0, stats);
        }

        let mut score = 100u32;
        let mut deduct = |points: u32, issue: Issue| {
            score = score.saturating_sub(points);
            issues.push(issue);
        };

        if keyword_density > self.options.density_threshold {
            let points = if keyword_density > self.options.high_density_threshold {
                HIGH_DENSITY_PENALTY
            } else {
                DENSITY_PENALTY
            };
            deduct(
                points,
                Issue::new(
                    IssueCode::ExcessiveKeywordDensity,
                    Severity::Warning,
                    format!("Keywords make up {:.0}% of the text", keyword_density * 100.0),
                ),
            );
        }

        let total: usize = sentences.iter().sum();
        if !sentences.is_empty() && total > self.options.max_average_sentence_words * sentences.len() {
            deduct(
                AVG_SENTENCE_PENALTY,
                Issue::new(
                    IssueCode::LongSentences,
                    Severity::Info,
                    format!("Sentences average {} words", total / sentences.len()),
                ),
            );
        }
        if let Some(&longest) = sentences.iter().max().filter(|&&n| n > self.options.max_sentence_words) {
            deduct(
                LONG_SENTENCE_PENALTY,
                Issue::new(
                    IssueCode::VeryLongSentence,
                    Severity::Info,
                    format!("A sentence runs to {} words", longest),
                ),
            );
        }

        let long_lines = lines
            .iter()
            .filter(|l| l.chars().count() > self.options.long_line_chars)
            .count();
        if !lines.is_empty() && long_lines as f64 > self.options.long_line_ratio * lines.len() as f64 {
            deduct(
                LONG_LINE_PENALTY,
                Issue::new(
                    IssueCode::LongLines,
                    Severity::Info,
                    format!("{} of {} lines are very long", long_lines, lines.len()),
                ),
            );
        }

        if word_count < self.options.min_words {
            deduct(
                SHORT_CONTENT_PENALTY,
                Issue::new(
                    IssueCode::ShortContent,
                    Severity::Warning,
                    format!("Only {} words of visible content", word_count),
                ),
            );
        }

        (score, stats)
    }

    /// Keyword clusters by tier, then one suggestion per issue, stably
    /// ordered by priority.
    fn suggestions(&self, missing: &[&Keyword], issues: &[Issue]) -> Vec<Suggestion> {
        let mut suggestions = Vec::new();

        for tier in [KeywordTier::Required, KeywordTier::Preferred, KeywordTier::Bonus] {
            let texts: Vec<String> = missing
                .iter()
                .filter(|k| k.tier == tier)
                .map(|k| k.text.clone())
                .collect();
            for cluster in texts.chunks(self.options.cluster_size.max(1)) {
                let (priority, lead) = match tier {
                    KeywordTier::Required => (Priority::High, "Add required keywords"),
                    KeywordTier::Preferred => (Priority::Medium, "Add preferred keywords"),
                    KeywordTier::Bonus => (Priority::Low, "Consider bonus keywords"),
                };
                suggestions.push(Suggestion {
                    priority,
                    kind: SuggestionKind::Keywords,
                    message: format!("{}: {}", lead, cluster.join(", ")),
                    keywords: cluster.to_vec(),
                    issue: None,
                });
            }
        }

        for issue in issues {
            suggestions.push(Suggestion {
                priority: issue.severity.priority(),
                kind: SuggestionKind::Structure,
                message: issue.code.advice().to_string(),
                keywords: Vec::new(),
                issue: Some(issue.code),
            });
        }

        // Stable: keyword clusters were pushed first.
        suggestions.sort_by_key(|s| s.priority);
        suggestions
    }
}

fn partition_keywords<'a>(
    normalized_text: &str,
    reference: &'a KeywordSet,
) -> (Vec<&'a Keyword>, Vec<&'a Keyword>) {
    reference
        .iter()
        .partition(|k| normalized_text.contains(&normalize(&k.text)))
}

/// Words covered by keyword occurrences over all words.
fn keyword_density(normalized: &str, word_count: usize, reference: &KeywordSet) -> f64 {
    if word_count == 0 {
        return 0.0;
    }
    let covered: usize = reference
        .iter()
        .map(|k| {
            let phrase = normalize(&k.text);
            normalized.matches(phrase.as_str()).count() * phrase.split_whitespace().count()
        })
        .sum();
    (covered as f64 / word_count as f64).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    const RESUME: &str = "Jane Doe\n\
jane.doe@example.com | (555) 123-4567\n\
Summary\n\
Backend engineer who builds reliable services for payments and logistics teams.\n\
Experience\n\
Acme Corp, Senior Engineer, Jan 2019 - Present\n\
• Designed a Python ingestion pipeline processing events for analytics.\n\
• Led migration of reporting to SQL warehouses with a small team.\n\
Globex, Engineer, 2015 - 2018\n\
• Built internal tooling and mentored new hires across two offices.\n\
Education\n\
B.Sc. Computer Science, State University\n\
Skills\n\
Python, SQL, Git, Linux";

    fn reference(words: &[&str]) -> KeywordSet {
        KeywordSet::from_strings(words.iter().copied())
    }

    #[test]
    fn test_six_of_ten_keywords() {
        let keywords = reference(&[
            "Python", "SQL", "Git", "Linux", "analytics", "mentored", "Kubernetes", "Terraform", "Rust",
            "GraphQL",
        ]);
        let result = AtsAnalyzer::default().analyze_at(&AnalysisInput::plain(RESUME), &keywords, at());

        assert_eq!(result.score.keyword_match, 60);
        assert_eq!(result.found_keywords.len(), 6);
        assert_eq!(result.missing_keywords, vec!["Kubernetes", "Terraform", "Rust", "GraphQL"]);
        let s = &result.score;
        assert_eq!(s.overall, (2 * s.keyword_match + s.formatting + s.readability + 2) / 4);
    }

    #[test]
    fn test_well_formed_resume_formatting() {
        let result = AtsAnalyzer::default().analyze_at(&AnalysisInput::plain(RESUME), &KeywordSet::new(), at());
        assert_eq!(result.score.keyword_match, 100);
        assert_eq!(result.score.formatting, 100);
        assert!(result.issues.iter().all(|i| i.code != IssueCode::MissingContactInfo));
    }

    #[test]
    fn test_phrase_matching_is_a_unit() {
        let keywords = reference(&["Test Engineer"]);
        let analyzer = AtsAnalyzer::default();
        let hit = analyzer.analyze_at(&AnalysisInput::plain("Senior TEST\n engineer"), &keywords, at());
        assert_eq!(hit.found_keywords, vec!["Test Engineer"]);
        let miss = analyzer.analyze_at(&AnalysisInput::plain("Engineer for test rigs"), &keywords, at());
        assert_eq!(miss.missing_keywords, vec!["Test Engineer"]);
    }

    #[test]
    fn test_empty_text_floors() {
        let keywords = reference(&["SQL"]);
        let result = AtsAnalyzer::default().analyze_at(&AnalysisInput::plain("   "), &keywords, at());
        assert_eq!(result.score.formatting, 0);
        assert_eq!(result.score.readability, 0);
        assert_eq!(result.score.keyword_match, 0);
        assert_eq!(result.score.overall, 0);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].code, IssueCode::NoExtractableText);
    }

    #[test]
    fn test_empty_reference_is_vacuous_match() {
        let result = AtsAnalyzer::default().analyze_at(&AnalysisInput::plain(""), &KeywordSet::new(), at());
        assert_eq!(result.score.keyword_match, 100);
        assert_eq!(result.score.overall, 50);
        assert!(result.found_keywords.is_empty() && result.missing_keywords.is_empty());
    }

    #[test]
    fn test_hidden_layer_counts_for_keywords_only() {
        let keywords = reference(&["Kubernetes", "Terraform"]);
        let analyzer = AtsAnalyzer::default();
        let plain = analyzer.analyze_at(&AnalysisInput::plain(RESUME), &keywords, at());
        let layered = analyzer.analyze_at(
            &AnalysisInput::new(format!("{}\nKubernetes Terraform", RESUME), RESUME),
            &keywords,
            at(),
        );
        assert_eq!(plain.score.keyword_match, 0);
        assert_eq!(layered.score.keyword_match, 100);
        assert_eq!(plain.score.formatting, layered.score.formatting);
        assert_eq!(plain.score.readability, layered.score.readability);
    }

    #[test]
    fn test_keyword_stuffing_costs_readability() {
        let keywords = reference(&["SQL", "Python"]);
        let stuffed = "SQL Python SQL Python SQL Python data work.\n".repeat(10);
        let result = AtsAnalyzer::default().analyze_at(&AnalysisInput::plain(stuffed), &keywords, at());
        assert!(result.stats.keyword_density > 0.25);
        assert!(result
            .issues
            .iter()
            .any(|i| i.code == IssueCode::ExcessiveKeywordDensity));
        assert_eq!(result.score.readability, 100 - HIGH_DENSITY_PENALTY);
    }

    #[test]
    fn test_long_sentence_penalties() {
        let sentence = format!("{}.", vec!["word"; 70].join(" "));
        let result = AtsAnalyzer::default().analyze_at(&AnalysisInput::plain(sentence), &KeywordSet::new(), at());
        let codes: Vec<IssueCode> = result.issues.iter().map(|i| i.code).collect();
        assert!(codes.contains(&IssueCode::LongSentences));
        assert!(codes.contains(&IssueCode::VeryLongSentence));
        assert!(codes.contains(&IssueCode::LongLines));
        assert_eq!(
            result.score.readability,
            100 - AVG_SENTENCE_PENALTY - LONG_SENTENCE_PENALTY - LONG_LINE_PENALTY
        );
    }

    #[test]
    fn test_suggestions_cluster_and_order() {
        let mut keywords = KeywordSet::new();
        for k in ["B1", "B2"] {
            keywords.push(k, KeywordTier::Bonus);
        }
        for k in ["R1", "R2", "R3", "R4", "R5", "R6"] {
            keywords.push(k, KeywordTier::Required);
        }
        keywords.push("P1", KeywordTier::Preferred);

        let result = AtsAnalyzer::default().analyze_at(&AnalysisInput::plain("nothing here"), &keywords, at());
        let priorities: Vec<Priority> = result.suggestions.iter().map(|s| s.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort();
        assert_eq!(priorities, sorted);

        let first = &result.suggestions[0];
        assert_eq!(first.kind, SuggestionKind::Keywords);
        assert_eq!(first.keywords, vec!["R1", "R2", "R3", "R4", "R5"]);
        assert_eq!(result.suggestions[1].keywords, vec!["R6"]);

        // Within a priority, keyword clusters come before issue suggestions.
        let medium: Vec<SuggestionKind> = result
            .suggestions
            .iter()
            .filter(|s| s.priority == Priority::Medium)
            .map(|s| s.kind)
            .collect();
        assert_eq!(medium[0], SuggestionKind::Keywords);
        assert!(medium[1..].iter().all(|k| *k == SuggestionKind::Structure));
    }

    #[test]
    fn test_identical_inputs_identical_results() {
        let keywords = reference(&["Python", "Rust"]);
        let analyzer = AtsAnalyzer::default();
        let a = analyzer.analyze_at(&AnalysisInput::plain(RESUME), &keywords, at());
        let b = analyzer.analyze_at(&AnalysisInput::plain(RESUME), &keywords, at());
        assert_eq!(a, b);
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }

    #[test]
    fn test_adding_missing_keyword_never_lowers_match() {
        let keywords = reference(&["Python", "Kubernetes", "Go"]);
        let analyzer = AtsAnalyzer::default();
        let before = analyzer.analyze_at(&AnalysisInput::plain(RESUME), &keywords, at());
        let after = analyzer.analyze_at(
            &AnalysisInput::plain(format!("{} Kubernetes", RESUME)),
            &keywords,
            at(),
        );
        assert!(after.score.keyword_match >= before.score.keyword_match);
    }
}
