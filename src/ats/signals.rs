//! Structural signals detected in resume text.

use std::collections::BTreeSet;

use regex::Regex;

/// Section headings an ATS expects to find.
pub const STANDARD_HEADINGS: &[&str] = &[
    "experience",
    "education",
    "skills",
    "summary",
    "projects",
    "certifications",
];

const MONTH: &str = r"(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?";

/// Compiled detectors.
#[derive(Debug, Clone)]
pub struct Signals {
    email: Regex,
    phone: Regex,
    date_range: Regex,
    bullet: Regex,
    heading: Regex,
    sentence_end: Regex,
}

impl Signals {
    pub fn new() -> Self {
        let date = format!(r"(?:(?:{MONTH}\s+)?(?:19|20)\d{{2}}|\d{{1,2}}/(?:19|20)\d{{2}})");
        Self {
            email: Regex::new(r"(?i)\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b").unwrap(),
            phone: Regex::new(r"(?:\+\d{1,3}[\s.-]?)?(?:\(\d{3}\)|\b\d{3})[\s.-]?\d{3}[\s.-]?\d{4}\b").unwrap(),
            date_range: Regex::new(&format!(
                r"(?i)\b{date}\s*(?:-|–|—|to)\s*(?:{date}|present|current|now)\b"
            ))
            .unwrap(),
            bullet: Regex::new(r"(?m)^[ \t]*(?:[•▪▸►◆◇➤✓■□·*–-]|\d{1,2}[.)])[ \t]+\S").unwrap(),
            heading: Regex::new(
                r"(?im)^[ \t]*(?:(?:professional|work|technical|core|key|academic)[ \t]+)?(experience|education|skills|summary|projects|certifications)[ \t]*:?[ \t]*$",
            )
            .unwrap(),
            sentence_end: Regex::new(r"[.!?]+(?:\s|$)|\n").unwrap(),
        }
    }

    /// An e-mail address or a phone number.
    pub fn has_contact_info(&self, text: &str) -> bool {
        self.email.is_match(text) || self.phone.is_match(text)
    }

    /// Something like `Jan 2020 - Present` or `2018 – 2021`.
    pub fn has_date_range(&self, text: &str) -> bool {
        self.date_range.is_match(text)
    }

    pub fn has_bullets(&self, text: &str) -> bool {
        self.bullet.is_match(text)
    }

    /// Distinct standard headings standing on a line of their own.
    pub fn headings(&self, text: &str) -> BTreeSet<String> {
        self.heading
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_lowercase())
            .collect()
    }

    /// Word counts of the sentences in `text`. Line breaks end sentences too.
    pub fn sentence_lengths(&self, text: &str) -> Vec<usize> {
        self.sentence_end
            .split(text)
            .map(|s| s.split_whitespace().count())
            .filter(|&n| n > 0)
            .collect()
    }
}

impl Default for Signals {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_info() {
        let signals = Signals::new();
        assert!(signals.has_contact_info("Reach me at jane.doe@example.com"));
        assert!(signals.has_contact_info("Phone: (555) 123-4567"));
        assert!(signals.has_contact_info("+1 555.123.4567"));
        assert!(!signals.has_contact_info("Worked 2019 to 2021 on 12 projects"));
    }

    #[test]
    fn test_date_ranges() {
        let signals = Signals::new();
        assert!(signals.has_date_range("Acme Corp, Jan 2020 - Present"));
        assert!(signals.has_date_range("2016 – 2019"));
        assert!(signals.has_date_range("03/2018 to 11/2021"));
        assert!(signals.has_date_range("September 2015 — June 2017"));
        assert!(!signals.has_date_range("Graduated in 2019"));
    }

    #[test]
    fn test_bullets() {
        let signals = Signals::new();
        assert!(signals.has_bullets("Experience\n• Built services"));
        assert!(signals.has_bullets("  - Led a team"));
        assert!(signals.has_bullets("1. Shipped v2"));
        assert!(!signals.has_bullets("A well-known fact - nothing more"));
    }

    #[test]
    fn test_headings_are_distinct_and_line_bound() {
        let signals = Signals::new();
        let text = "SUMMARY\nI like skills in general.\nProfessional Experience\nSkills:\nskills";
        let headings: Vec<String> = signals.headings(text).into_iter().collect();
        assert_eq!(headings, vec!["experience", "skills", "summary"]);
    }

    #[test]
    fn test_sentence_lengths() {
        let signals = Signals::new();
        assert_eq!(
            signals.sentence_lengths("One two three. Four five!\nSix\n\n  "),
            vec![3, 2, 1]
        );
        assert!(signals.sentence_lengths("").is_empty());
    }
}
