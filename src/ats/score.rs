//! Sub-scores, overall score and letter grade.

use serde::{Deserialize, Serialize};

/// Letter grade for an overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => Grade::A,
            75..=89 => Grade::B,
            60..=74 => Grade::C,
            40..=59 => Grade::D,
            _ => Grade::F,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Grade::A => "Excellent: highly likely to pass automated screening",
            Grade::B => "Good: likely to pass most automated screening",
            Grade::C => "Fair: may pass screening with some improvements",
            Grade::D => "Poor: likely to be filtered out without changes",
            Grade::F => "Failing: unlikely to pass automated screening",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let letter = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(letter)
    }
}

/// The four scores in [0, 100] with the derived grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtsScore {
    pub overall: u32,
    pub keyword_match: u32,
    pub formatting: u32,
    pub readability: u32,
    pub grade: Grade,
    pub description: String,
}

impl AtsScore {
    /// Combine sub-scores; the overall score and grade are derived.
    pub fn new(keyword_match: u32, formatting: u32, readability: u32) -> Self {
        let keyword_match = keyword_match.min(100);
        let formatting = formatting.min(100);
        let readability = readability.min(100);
        let overall = overall_score(keyword_match, formatting, readability);
        let grade = Grade::from_score(overall);
        Self {
            overall,
            keyword_match,
            formatting,
            readability,
            grade,
            description: grade.description().to_string(),
        }
    }
}

/// `round(0.5 * km + 0.25 * f + 0.25 * r)` with halves rounded up.
pub fn overall_score(keyword_match: u32, formatting: u32, readability: u32) -> u32 {
    ((2 * keyword_match + formatting + readability + 2) / 4).min(100)
}

/// `round(100 * found / total)` with halves rounded up; 100 when `total` is 0.
pub fn keyword_match_score(found: usize, total: usize) -> u32 {
    if total == 0 {
        return 100;
    }
    let found = found.min(total) as u64;
    let total = total as u64;
    ((200 * found + total) / (2 * total)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(Grade::from_score(100), Grade::A);
        assert_eq!(Grade::from_score(90), Grade::A);
        assert_eq!(Grade::from_score(89), Grade::B);
        assert_eq!(Grade::from_score(75), Grade::B);
        assert_eq!(Grade::from_score(74), Grade::C);
        assert_eq!(Grade::from_score(60), Grade::C);
        assert_eq!(Grade::from_score(59), Grade::D);
        assert_eq!(Grade::from_score(40), Grade::D);
        assert_eq!(Grade::from_score(39), Grade::F);
        assert_eq!(Grade::from_score(0), Grade::F);
    }

    #[test]
    fn test_overall_rounds_half_up() {
        // 0.5 * 61 + 0.25 * 100 + 0.25 * 100 = 80.5
        assert_eq!(overall_score(61, 100, 100), 81);
        // 0.5 * 60 + 0.25 * 85 + 0.25 * 70 = 68.75
        assert_eq!(overall_score(60, 85, 70), 69);
        assert_eq!(overall_score(0, 0, 0), 0);
        assert_eq!(overall_score(100, 100, 100), 100);
    }

    #[test]
    fn test_keyword_match_score() {
        assert_eq!(keyword_match_score(6, 10), 60);
        assert_eq!(keyword_match_score(1, 3), 33);
        assert_eq!(keyword_match_score(2, 3), 67);
        assert_eq!(keyword_match_score(1, 8), 13);
        assert_eq!(keyword_match_score(0, 0), 100);
        assert_eq!(keyword_match_score(5, 4), 100);
    }

    #[test]
    fn test_score_is_clamped() {
        let score = AtsScore::new(250, 100, 100);
        assert_eq!(score.keyword_match, 100);
        assert_eq!(score.overall, 100);
        assert_eq!(score.grade, Grade::A);
        assert_eq!(score.description, Grade::A.description());
    }
}
