//! Integration tests for the phishing analyzer
//!
//! These tests verify the scoring scenarios, the scoring laws, corpus loading
//! from disk, and report export.

use std::sync::Arc;

use phishing_analyzer::core::analyzer::ContentAnalyzer;
use phishing_analyzer::core::patterns::{load_corpus, CorpusConfig, CorpusError, DEFAULT_CORPUS};
use phishing_analyzer::utils::file_utils::read_email_file;
use phishing_analyzer::utils::output_formatter;
use phishing_analyzer::{analyze, Verdict};

const SAMPLES: &[(&str, &str)] = &[
    ("", ""),
    ("Meeting notes", "See you at 3pm tomorrow"),
    ("URGENT", "Click here to claim your reward"),
    ("Invoice", "Wire transfer details attached, login at tinyurl.com/x"),
    ("Hi", "Visit http://10.0.0.1 and evil.tk and bit.ly/y"),
    ("Congratulations winner", "You have been selected. No questions asked. Free money!"),
    ("act now urgent immediate expire", "limited time hurry paypal bitcoin lottery inheritance password"),
];

#[test]
fn test_scenario_safe() {
    let result = analyze("Meeting notes", "See you at 3pm tomorrow");
    assert_eq!(result.verdict(), Verdict::Safe);
    assert_eq!(result.score(), 0);
    assert_eq!(result.raw_score(), 0);
    assert!(result.detected_threats().is_empty());
    assert!(result.suspicious_elements().is_empty());
}

#[test]
fn test_scenario_single_urgent_phrase() {
    let result = analyze("", "Please act now before your account is suspended");
    assert_eq!(result.verdict(), Verdict::Suspicious);
    assert_eq!(result.score(), 30);
    assert_eq!(
        result.detected_threats(),
        [
            "Urgent language detected: \"act now\"",
            "Urgent language detected: \"suspend\"",
        ]
    );
    assert!(result.suspicious_elements().is_empty());
}

#[test]
fn test_scenario_credential_phishing() {
    let result = analyze(
        "",
        "Your paypal account is frozen, verify now and enter your password at http://192.168.1.1/login",
    );
    assert_eq!(result.verdict(), Verdict::Phishing);
    assert_eq!(result.score(), 95);
    assert_eq!(
        result.detected_threats(),
        [
            "Urgent language detected: \"verify now\"",
            "Urgent language detected: \"frozen\"",
            "Financial keyword detected: \"paypal\"",
            "Suspicious URL pattern detected",
            "Password/login information requested",
        ]
    );
}

#[test]
fn test_scenario_clamp_boundary() {
    // 6 urgent (90) + 2 financial (40) + 1 suspicious (10) = 140
    let result = analyze("", "act now urgent immediate expire limited time hurry paypal bitcoin winner");
    assert_eq!(result.raw_score(), 140);
    assert_eq!(result.score(), 100);
    assert_eq!(result.verdict(), Verdict::Phishing);
}

#[test]
fn test_determinism() {
    for (subject, body) in SAMPLES {
        assert_eq!(analyze(subject, body), analyze(subject, body));
    }
}

#[test]
fn test_clamp_law_and_threshold_partition() {
    for (subject, body) in SAMPLES {
        let result = analyze(subject, body);
        let raw = result.raw_score();
        assert!(result.score() <= 100);
        assert_eq!(result.score(), raw.min(100));

        let expected = match raw {
            0..=19 => Verdict::Safe,
            20..=39 => Verdict::Suspicious,
            _ => Verdict::Phishing,
        };
        assert_eq!(result.verdict(), expected, "input {:?}", (subject, body));
    }
}

#[test]
fn test_monotonic_when_phrases_added() {
    let corpus = &*DEFAULT_CORPUS;
    let phrases = corpus
        .phrase_categories()
        .iter()
        .flat_map(|c| c.phrases.iter())
        .chain(corpus.credential_request().keywords.iter());

    for phrase in phrases {
        for (subject, body) in SAMPLES {
            let before = analyze(subject, body).raw_score();
            let extended = format!("{} {}", body, phrase);
            let after = analyze(subject, &extended).raw_score();
            assert!(after >= before, "adding {:?} lowered the score", phrase);
        }
    }
}

#[test]
fn test_phrase_case_insensitivity() {
    let upper = analyze("URGENT", "");
    let lower = analyze("urgent", "");
    assert_eq!(upper.raw_score(), lower.raw_score());
    assert_eq!(upper.detected_threats(), lower.detected_threats());
    assert_eq!(upper.raw_score(), 15);
}

#[test]
fn test_subject_and_body_are_joined_with_space() {
    // "act" ending the subject and "now" starting the body form "act now"
    let result = analyze("Please act", "now");
    assert_eq!(result.raw_score(), 15);
}

#[test]
fn test_long_input_is_handled() {
    let body = "lorem ipsum ".repeat(100_000) + "bitcoin";
    let result = analyze("", &body);
    assert_eq!(result.raw_score(), 20);
    assert_eq!(result.verdict(), Verdict::Suspicious);
}

#[test]
fn test_load_corpus_from_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("corpus.json");

    let mut config = CorpusConfig::default();
    config.phrase_categories[2].phrases.push("Gift Card".to_string());
    std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

    let corpus = load_corpus(&path).expect("Failed to load corpus");
    let analyzer = ContentAnalyzer::new(Arc::new(corpus));
    let result = analyzer.analyze("", "send a gift card");
    assert_eq!(result.suspicious_elements(), ["Suspicious keyword: \"gift card\""]);
    assert_eq!(result.raw_score(), 10);
}

#[test]
fn test_load_corpus_errors() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let missing = load_corpus(dir.path().join("missing.json"));
    assert!(matches!(missing, Err(CorpusError::Io(_))));

    let bad_json = dir.path().join("bad.json");
    std::fs::write(&bad_json, "{ not json").unwrap();
    assert!(matches!(load_corpus(&bad_json), Err(CorpusError::Json(_))));
}

#[test]
fn test_email_file_and_reports() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let email_path = dir.path().join("message.eml");
    std::fs::write(
        &email_path,
        "From: security@paypa1.tk\nSubject: Account frozen\n\nVerify now: http://10.1.2.3/login\n",
    )
    .unwrap();

    let email = read_email_file(&email_path).expect("Failed to read email");
    assert_eq!(email.input.subject, "Account frozen");

    // Headers are not part of the analyzed text
    let result = ContentAnalyzer::default().analyze_input(&email.input);
    assert_eq!(result.raw_score(), 15 + 15 + 25 + 20);
    let all_results = vec![("message.eml".to_string(), result)];

    let json_path = dir.path().join("report.json");
    output_formatter::export_results_json(&all_results, &json_path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(json[0]["source"], "message.eml");
    assert_eq!(json[0]["result"]["verdict"], "phishing");
    assert_eq!(json[0]["result"]["score"], 75);
    assert_eq!(json[0]["result"]["detectedThreats"].as_array().unwrap().len(), 4);

    let csv_path = dir.path().join("report.csv");
    output_formatter::create_csv_report(&all_results, &csv_path).unwrap();
    let csv = std::fs::read_to_string(&csv_path).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("Source,Verdict,Score,Kind,Finding"));
    assert_eq!(lines.count(), 4);

    let html_path = dir.path().join("report.html");
    output_formatter::create_html_report(&all_results, &html_path).unwrap();
    let html = std::fs::read_to_string(&html_path).unwrap();
    assert!(html.contains("Likely Phishing"));
    assert!(html.contains("Risk Score: 75/100"));
    assert!(html.contains("Suspicious URL pattern detected"));
}
