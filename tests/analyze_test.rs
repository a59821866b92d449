//! Integration tests for ATS analysis of PDF files.

mod common;

use atspdf::ats::{overall_score, IssueCode};
use atspdf::render::{to_json, JsonFormat};
use atspdf::{analyze_bytes, create_bytes, AtsPdf, Grade, KeywordSet, ScoringOptions};
use chrono::{TimeZone, Utc};
use common::{build_pdf, text_content, REFERENCE, RESUME};

fn resume_pdf() -> Vec<u8> {
    create_bytes(RESUME, &KeywordSet::new()).unwrap()
}

#[test]
fn test_six_of_ten_keywords() {
    let result = analyze_bytes(&resume_pdf(), &KeywordSet::parse(REFERENCE)).unwrap();

    assert_eq!(result.score.keyword_match, 60);
    assert_eq!(result.found_keywords.len(), 6);
    assert_eq!(result.missing_keywords.len(), 4);
    assert_eq!(
        result.score.overall,
        overall_score(60, result.score.formatting, result.score.readability)
    );
    assert_eq!(result.score.grade, Grade::from_score(result.score.overall));
}

#[test]
fn test_layout_is_visible_to_formatting() {
    let result = analyze_bytes(&resume_pdf(), &KeywordSet::new()).unwrap();
    assert_eq!(result.score.formatting, 100);
    assert!(result.stats.line_count > 10);
}

#[test]
fn test_identical_inputs_identical_output() {
    let at = Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();
    let pdf = resume_pdf();
    let reference = KeywordSet::parse(REFERENCE);

    let a = AtsPdf::new().analyze_at(&pdf, &reference, at).unwrap();
    let b = AtsPdf::new().analyze_at(&pdf, &reference, at).unwrap();
    assert_eq!(a, b);
    assert_eq!(
        to_json(&a, JsonFormat::Compact).unwrap(),
        to_json(&b, JsonFormat::Compact).unwrap()
    );
}

#[test]
fn test_inserting_missing_keyword_never_lowers_match() {
    let reference = KeywordSet::parse(REFERENCE);
    let before = analyze_bytes(&resume_pdf(), &reference).unwrap();

    let extended = create_bytes(&format!("{}\nKubernetes", RESUME), &KeywordSet::new()).unwrap();
    let after = analyze_bytes(&extended, &reference).unwrap();

    assert!(after.score.keyword_match >= before.score.keyword_match);
    assert_eq!(after.score.keyword_match, 70);
}

#[test]
fn test_blank_document_floors() {
    let blank = create_bytes("", &KeywordSet::new()).unwrap();
    let result = analyze_bytes(&blank, &KeywordSet::new()).unwrap();

    assert_eq!(result.score.keyword_match, 100);
    assert_eq!(result.score.formatting, 0);
    assert_eq!(result.score.readability, 0);
    assert_eq!(result.score.overall, 50);
    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].code, IssueCode::NoExtractableText);
}

#[test]
fn test_invisible_layer_does_not_change_readability() {
    let reference = KeywordSet::parse(REFERENCE);
    let plain = resume_pdf();
    let stuffed = create_bytes(
        RESUME,
        &KeywordSet::parse("Kubernetes, Terraform, Rust, GraphQL"),
    )
    .unwrap();

    let at = Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();
    let a = AtsPdf::new().analyze_at(&plain, &reference, at).unwrap();
    let b = AtsPdf::new().analyze_at(&stuffed, &reference, at).unwrap();

    assert_eq!(b.score.keyword_match, 100);
    assert_eq!(a.score.readability, b.score.readability);
    assert_eq!(a.score.formatting, b.score.formatting);
    assert_eq!(a.stats, b.stats);
}

#[test]
fn test_custom_thresholds() {
    let pdf = build_pdf(&[&text_content("Python Python Python SQL", 700)]);
    let reference = KeywordSet::parse("Python, SQL");

    let strict = AtsPdf::new()
        .with_scoring_options(ScoringOptions::new().with_density_thresholds(1.0, 1.0))
        .analyze(&pdf, &reference)
        .unwrap();
    let default = analyze_bytes(&pdf, &reference).unwrap();

    assert!(strict.score.readability > default.score.readability);
}

#[test]
fn test_batch_analysis_keeps_order() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.pdf");
    let bad = dir.path().join("bad.pdf");
    std::fs::write(&good, resume_pdf()).unwrap();
    std::fs::write(&bad, b"not a pdf").unwrap();

    let paths = vec![good.clone(), bad.clone(), good.clone()];
    let results = AtsPdf::new().analyze_files(&paths, &KeywordSet::parse(REFERENCE));

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].0, good);
    assert!(results[0].1.is_ok());
    assert_eq!(results[1].0, bad);
    assert!(results[1].1.is_err());
    assert_eq!(
        results[0].1.as_ref().unwrap().score,
        results[2].1.as_ref().unwrap().score
    );
}
