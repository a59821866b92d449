//! Applicant tracking system scoring.
//!
//! ```no_run
//! use atspdf::ats::{AnalysisInput, AtsAnalyzer};
//! use atspdf::KeywordSet;
//!
//! let keywords = KeywordSet::parse("Python, SQL, Kubernetes");
//! let result = AtsAnalyzer::default().analyze(&AnalysisInput::plain("Python and SQL"), &keywords);
//! println!("{} ({})", result.score.overall, result.score.grade);
//! ```

mod analyzer;
mod result;
mod score;
mod signals;

pub use analyzer::{AnalysisInput, AtsAnalyzer, ScoringOptions};
pub use result::{
    AtsAnalysisResult, Issue, IssueCode, Priority, Severity, Suggestion, SuggestionKind, TextStats,
};
pub use score::{keyword_match_score, overall_score, AtsScore, Grade};
pub use signals::{Signals, STANDARD_HEADINGS};
