//! Core content analyzer implementation
//!
//! This file contains the ContentAnalyzer, which runs the matching pass over
//! an email's subject and body and turns the matches into a scored verdict.

use std::sync::Arc;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::core::patterns::{PatternCorpus, Severity, DEFAULT_CORPUS};
use crate::core::verdict::{clamp_score, Verdict};

/// Subject and body of one email snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub subject: String,
    pub body: String,
}

impl AnalysisInput {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// True when both subject and body are empty or whitespace-only.
    ///
    /// Front ends check this before invoking the analyzer.
    pub fn is_blank(&self) -> bool {
        self.subject.trim().is_empty() && self.body.trim().is_empty()
    }
}

/// Result of analyzing one email
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    verdict: Verdict,
    score: u32,
    detected_threats: Vec<String>,
    suspicious_elements: Vec<String>,
    #[serde(skip)]
    raw_score: u32,
}

impl AnalysisResult {
    fn from_matches(raw_score: u32, detected_threats: Vec<String>, suspicious_elements: Vec<String>) -> Self {
        Self {
            verdict: Verdict::from_raw_score(raw_score),
            score: clamp_score(raw_score),
            detected_threats,
            suspicious_elements,
            raw_score,
        }
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Score in the range 0..=100
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Unclamped sum of all triggered weights
    pub fn raw_score(&self) -> u32 {
        self.raw_score
    }

    pub fn detected_threats(&self) -> &[String] {
        &self.detected_threats
    }

    pub fn suspicious_elements(&self) -> &[String] {
        &self.suspicious_elements
    }

    /// Total number of reported findings
    pub fn finding_count(&self) -> usize {
        self.detected_threats.len() + self.suspicious_elements.len()
    }
}

/// Heuristic phishing classifier over a shared, read-only corpus
///
/// Cloning is cheap and clones share the corpus.
#[derive(Debug, Clone)]
pub struct ContentAnalyzer {
    corpus: Arc<PatternCorpus>,
}

impl Default for ContentAnalyzer {
    fn default() -> Self {
        Self::new(Arc::clone(&DEFAULT_CORPUS))
    }
}

impl ContentAnalyzer {
    /// Create a new ContentAnalyzer instance
    ///
    /// # Arguments
    ///
    /// * `corpus` - Compiled pattern corpus to match against
    pub fn new(corpus: Arc<PatternCorpus>) -> Self {
        Self { corpus }
    }

    pub fn corpus(&self) -> &PatternCorpus {
        &self.corpus
    }

    /// Analyze an email subject and body
    ///
    /// Total over all inputs: empty, whitespace-only and very long strings
    /// all produce a result.
    ///
    /// # Arguments
    ///
    /// * `subject` - Email subject line
    /// * `body` - Email body text
    ///
    /// # Returns
    ///
    /// The scored verdict with its threat and suspicious-element lists
    pub fn analyze(&self, subject: &str, body: &str) -> AnalysisResult {
        let combined_text = format!("{} {}", subject, body);
        // Phrases match the lowercased text; URL patterns see the original casing
        let lower_text = combined_text.to_lowercase();

        let mut detected_threats = Vec::new();
        let mut suspicious_elements = Vec::new();
        let mut raw_score: u32 = 0;

        for category in self.corpus.phrase_categories() {
            for phrase in &category.phrases {
                if !lower_text.contains(phrase.as_str()) {
                    continue;
                }
                debug!("Matched {} phrase {:?}", category.name, phrase);
                let entry = format!("{}: \"{}\"", category.label, phrase);
                match category.severity {
                    Severity::Threat => detected_threats.push(entry),
                    Severity::Suspicious => suspicious_elements.push(entry),
                }
                raw_score = raw_score.saturating_add(category.weight);
            }
        }

        // Once per matching pattern, however many times it occurs
        let urls = self.corpus.url_patterns();
        for pattern in &urls.patterns {
            if pattern.is_match(&combined_text) {
                debug!("Matched URL pattern {}", pattern.as_str());
                detected_threats.push(urls.label.clone());
                raw_score = raw_score.saturating_add(urls.weight);
            }
        }

        // Single entry no matter how many keywords are present
        let credential = self.corpus.credential_request();
        if credential.keywords.iter().any(|k| lower_text.contains(k.as_str())) {
            debug!("Matched credential request");
            detected_threats.push(credential.label.clone());
            raw_score = raw_score.saturating_add(credential.weight);
        }

        let result = AnalysisResult::from_matches(raw_score, detected_threats, suspicious_elements);
        info!(
            "Verdict {} (score {}, {} findings)",
            result.verdict(),
            result.score(),
            result.finding_count()
        );
        result
    }

    /// Analyze a prepared input
    pub fn analyze_input(&self, input: &AnalysisInput) -> AnalysisResult {
        self.analyze(&input.subject, &input.body)
    }
}
