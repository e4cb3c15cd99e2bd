//! Golden tests for catalog matching.
//!
//! These tests run recognized text through the full matcher and check the
//! ranked candidates against known outcomes.

use medscan_core::matcher::{Matcher, ACCEPTANCE_THRESHOLD};
use medscan_core::models::MedicationRecord;
use proptest::prelude::*;

/// Recognized text and the match outcome it must produce.
struct GoldenCase {
    id: &'static str,
    text: &'static str,
    expected_names: &'static [&'static str],
    expected_dosages: &'static [&'static str],
    expected_forms: &'static [&'static str],
}

fn catalog() -> Vec<MedicationRecord> {
    let mut records = vec![
        MedicationRecord::new("Zyrtec", "10mg", "comprime"),
        MedicationRecord::new("Paracetamol", "1000mg", "comprime"),
        MedicationRecord::new("Paracetamol", "500mg", "comprime"),
        MedicationRecord::new("Doliprane", "1000mg", "comprime"),
        MedicationRecord::new("Toplexil", "0.33mg/ml", "sirop"),
    ];
    records[2].code = "PARA500".into();
    records
}

fn get_golden_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            id: "paracetamol-plural-form",
            text: "Paracetamol 500 comprimés",
            expected_names: &["Paracetamol", "Paracetamol"],
            expected_dosages: &["500"],
            expected_forms: &["comprime"],
        },
        GoldenCase {
            id: "no-digits",
            text: "Doliprane comprimé",
            expected_names: &["Doliprane"],
            expected_dosages: &[],
            expected_forms: &["comprime"],
        },
        GoldenCase {
            id: "syrup-lowercase",
            text: "toplexil sirop",
            expected_names: &["Toplexil"],
            expected_dosages: &[],
            expected_forms: &["sirop"],
        },
        GoldenCase {
            id: "dosage-with-unit-is-not-extracted",
            text: "Zyrtec 10mg",
            expected_names: &["Zyrtec"],
            expected_dosages: &[],
            expected_forms: &[],
        },
    ]
}

#[test]
fn test_golden_cases() {
    let matcher = Matcher::new().unwrap();
    let catalog = catalog();

    for case in get_golden_cases() {
        let report = matcher.match_text(case.text, &catalog);

        let names: Vec<&str> = report
            .candidates
            .iter()
            .map(|c| c.record.name.as_str())
            .collect();
        assert_eq!(names, case.expected_names, "Case {}: names", case.id);
        assert_eq!(
            report.features.dosages, case.expected_dosages,
            "Case {}: dosages",
            case.id
        );
        let forms: Vec<&str> = report.features.forms.iter().map(String::as_str).collect();
        assert_eq!(forms, case.expected_forms, "Case {}: forms", case.id);
    }
}

#[test]
fn test_exact_dosage_ranks_first() {
    let matcher = Matcher::new().unwrap();
    let catalog = catalog();

    let report = matcher.match_text("Paracetamol 500 comprimés", &catalog);

    let best = report.best().unwrap();
    assert_eq!(best.record.code, "PARA500");
    assert_eq!(best.name_score, 100);
    assert_eq!(best.dosage_score, 100);
    assert_eq!(best.total_score, 100.0);
    assert_eq!(best.matched_form.as_deref(), Some("comprime"));

    // "500" against "1000mg": LCS "00" → round(200 * 2 / 9) = 44
    let second = &report.candidates[1];
    assert_eq!(second.record.dosage, "1000mg");
    assert_eq!(second.dosage_score, 44);
    assert!((second.total_score - 77.6).abs() < 1e-9);
}

#[test]
fn test_name_only_match_scores_sixty() {
    let matcher = Matcher::new().unwrap();
    let catalog = catalog();

    let report = matcher.match_text("Doliprane comprimé", &catalog);
    let best = report.best().unwrap();

    assert_eq!(best.dosage_score, 0);
    assert_eq!(best.total_score, 60.0);
    assert!(best.total_score >= ACCEPTANCE_THRESHOLD);
}

#[test]
fn test_form_does_not_change_score() {
    let matcher = Matcher::new().unwrap();
    let catalog = vec![MedicationRecord::new("Doliprane", "1000mg", "comprime")];

    let with_form = matcher.match_text("Doliprane 1000 comprimés", &catalog);
    let without_form = matcher.match_text("Doliprane 1000", &catalog);

    assert!(with_form.best().unwrap().form_match());
    assert!(!without_form.best().unwrap().form_match());
    assert_eq!(
        with_form.best().unwrap().total_score,
        without_form.best().unwrap().total_score
    );
}

#[test]
fn test_unrelated_text_matches_nothing() {
    let matcher = Matcher::new().unwrap();
    let catalog = catalog();

    let report = matcher.match_text("xxxx", &catalog);
    assert!(report.is_empty());
}

#[test]
fn test_equal_scores_keep_catalog_order() {
    let matcher = Matcher::new().unwrap();
    let mut first = MedicationRecord::new("Spasfon", "80mg", "comprime");
    first.code = "A".into();
    let mut second = MedicationRecord::new("Spasfon", "80mg", "comprime");
    second.code = "B".into();
    let mut third = MedicationRecord::new("Spasfon", "80mg", "comprime");
    third.code = "C".into();
    let catalog = vec![first, second, third];

    let report = matcher.match_text("Spasfon 80", &catalog);

    let codes: Vec<&str> = report
        .candidates
        .iter()
        .map(|c| c.record.code.as_str())
        .collect();
    assert_eq!(codes, vec!["A", "B", "C"]);
}

#[test]
fn test_summary_truncates_ranked_list() {
    let matcher = Matcher::new().unwrap();
    let catalog: Vec<MedicationRecord> = (0..5)
        .map(|i| MedicationRecord::new("Smecta", format!("{}g", i + 1), "poudre"))
        .collect();

    let report = matcher.match_text("Smecta 3", &catalog);

    assert_eq!(report.all().len(), 5);
    assert_eq!(report.top(3).len(), 3);
    assert_eq!(report.best().unwrap().record.dosage, "3g");
}

proptest! {
    #[test]
    fn prop_candidates_are_accepted_and_sorted(
        text in "[A-Za-z0-9 ]{0,30}",
        names in prop::collection::vec("[A-Za-z]{0,10}", 0..8),
        dosages in prop::collection::vec("[0-9]{1,4}(mg|g|ml)?", 8),
    ) {
        let matcher = Matcher::new().unwrap();
        let catalog: Vec<MedicationRecord> = names
            .iter()
            .zip(dosages.iter())
            .map(|(n, d)| MedicationRecord::new(n.clone(), d.clone(), "comprime"))
            .collect();

        let report = matcher.match_text(&text, &catalog);

        for candidate in report.all() {
            prop_assert!(candidate.total_score >= ACCEPTANCE_THRESHOLD);
            prop_assert!(candidate.total_score <= 100.0);
            prop_assert!(!candidate.record.name.trim().is_empty());
        }
        for pair in report.all().windows(2) {
            prop_assert!(pair[0].total_score >= pair[1].total_score);
        }
    }

    #[test]
    fn prop_matching_is_deterministic(text in "[A-Za-z0-9 ]{0,30}") {
        let matcher = Matcher::new().unwrap();
        let catalog = catalog();

        prop_assert_eq!(
            matcher.match_text(&text, &catalog),
            matcher.match_text(&text, &catalog)
        );
    }
}
