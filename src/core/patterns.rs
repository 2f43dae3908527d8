//! Pattern corpus for the content analyzer
//!
//! This module holds the phrase lists and URL patterns used to score email
//! content, along with the configuration format they are loaded from.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Errors raised while building a corpus from configuration
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("Invalid URL pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Category {category:?} contains an empty phrase")]
    EmptyPhrase { category: String },

    #[error("Phrase category with an empty name")]
    EmptyCategory,

    #[error("Duplicate phrase category {0:?}")]
    DuplicateCategory(String),

    #[error("Failed to read corpus file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON in corpus file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where a phrase match is reported in the analysis result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Reported in `detected_threats`
    Threat,
    /// Reported in `suspicious_elements`
    Suspicious,
}

/// One phrase category as it appears in a corpus file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseCategoryConfig {
    pub name: String,
    pub label: String,
    pub severity: Severity,
    pub weight: u32,
    pub phrases: Vec<String>,
}

/// URL pattern block as it appears in a corpus file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlPatternConfig {
    pub label: String,
    pub weight: u32,
    pub patterns: Vec<String>,
}

/// Credential request rule as it appears in a corpus file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialRuleConfig {
    pub label: String,
    pub weight: u32,
    pub keywords: Vec<String>,
}

/// Serializable corpus configuration
///
/// Phrase categories are evaluated in the order they are listed, then the
/// URL patterns, then the credential rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusConfig {
    pub phrase_categories: Vec<PhraseCategoryConfig>,
    pub url_patterns: UrlPatternConfig,
    pub credential_request: CredentialRuleConfig,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for CorpusConfig {
    /// The built-in corpus
    fn default() -> Self {
        Self {
            phrase_categories: vec![
                PhraseCategoryConfig {
                    name: "urgent".to_string(),
                    label: "Urgent language detected".to_string(),
                    severity: Severity::Threat,
                    weight: 15,
                    phrases: strings(&[
                        "act now", "urgent", "immediate", "expire", "limited time", "hurry",
                        "click here", "verify now", "update immediately", "suspend", "frozen",
                    ]),
                },
                PhraseCategoryConfig {
                    name: "financial".to_string(),
                    label: "Financial keyword detected".to_string(),
                    severity: Severity::Threat,
                    weight: 20,
                    phrases: strings(&[
                        "bank account", "credit card", "social security", "tax refund",
                        "lottery", "inheritance", "wire transfer", "bitcoin", "paypal",
                    ]),
                },
                PhraseCategoryConfig {
                    name: "suspicious".to_string(),
                    label: "Suspicious keyword".to_string(),
                    severity: Severity::Suspicious,
                    weight: 10,
                    phrases: strings(&[
                        "congratulations", "winner", "selected", "claim", "reward",
                        "free money", "no questions asked", "confidential",
                    ]),
                },
            ],
            url_patterns: UrlPatternConfig {
                label: "Suspicious URL pattern detected".to_string(),
                weight: 25,
                patterns: strings(&[
                    // IP-literal hosts
                    r"[0-9]+\.[0-9]+\.[0-9]+\.[0-9]+",
                    // URL shorteners
                    r"bit\.ly|tinyurl|t\.co",
                    // High-abuse TLDs; only the first branch carries the host prefix
                    r"[a-z0-9-]+\.tk|\.ml|\.ga|\.cf",
                ]),
            },
            credential_request: CredentialRuleConfig {
                label: "Password/login information requested".to_string(),
                weight: 20,
                keywords: strings(&["password", "login"]),
            },
        }
    }
}

/// A validated phrase category
#[derive(Debug, Clone)]
pub struct PhraseCategory {
    pub name: String,
    pub label: String,
    pub severity: Severity,
    pub weight: u32,
    /// Lowercased literal substrings
    pub phrases: Vec<String>,
}

/// A compiled URL pattern block
#[derive(Debug, Clone)]
pub struct UrlPatterns {
    pub label: String,
    pub weight: u32,
    pub patterns: Vec<Regex>,
}

/// A validated credential request rule
#[derive(Debug, Clone)]
pub struct CredentialRule {
    pub label: String,
    pub weight: u32,
    /// Lowercased keywords; any one of them triggers the rule once
    pub keywords: Vec<String>,
}

/// Immutable, validated corpus consumed by the analyzer
#[derive(Debug, Clone)]
pub struct PatternCorpus {
    phrase_categories: Vec<PhraseCategory>,
    url_patterns: UrlPatterns,
    credential_request: CredentialRule,
}

impl PatternCorpus {
    /// Validate a configuration and compile its URL patterns
    ///
    /// # Arguments
    ///
    /// * `config` - Corpus configuration
    ///
    /// # Returns
    ///
    /// The compiled corpus, or the first validation error found
    pub fn from_config(config: &CorpusConfig) -> Result<Self, CorpusError> {
        let mut seen = HashSet::new();
        let mut phrase_categories = Vec::with_capacity(config.phrase_categories.len());

        for category in &config.phrase_categories {
            let name = category.name.trim();
            if name.is_empty() {
                return Err(CorpusError::EmptyCategory);
            }
            if !seen.insert(name.to_string()) {
                return Err(CorpusError::DuplicateCategory(name.to_string()));
            }

            phrase_categories.push(PhraseCategory {
                name: name.to_string(),
                label: category.label.clone(),
                severity: category.severity,
                weight: category.weight,
                phrases: normalize_phrases(name, &category.phrases)?,
            });
        }

        let patterns = config
            .url_patterns
            .patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| CorpusError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let credential = &config.credential_request;
        let corpus = Self {
            phrase_categories,
            url_patterns: UrlPatterns {
                label: config.url_patterns.label.clone(),
                weight: config.url_patterns.weight,
                patterns,
            },
            credential_request: CredentialRule {
                label: credential.label.clone(),
                weight: credential.weight,
                keywords: normalize_phrases("credential_request", &credential.keywords)?,
            },
        };

        debug!("Built corpus with {} detection patterns", corpus.pattern_count());
        Ok(corpus)
    }

    pub fn phrase_categories(&self) -> &[PhraseCategory] {
        &self.phrase_categories
    }

    pub fn url_patterns(&self) -> &UrlPatterns {
        &self.url_patterns
    }

    pub fn credential_request(&self) -> &CredentialRule {
        &self.credential_request
    }

    /// Look up a phrase category by name
    pub fn category(&self, name: &str) -> Option<&PhraseCategory> {
        self.phrase_categories.iter().find(|c| c.name == name)
    }

    /// Total number of detection patterns across all categories
    pub fn pattern_count(&self) -> usize {
        let phrases: usize = self.phrase_categories.iter().map(|c| c.phrases.len()).sum();
        phrases + self.url_patterns.patterns.len() + self.credential_request.keywords.len()
    }
}

/// Lowercase phrases, rejecting empty and whitespace-only ones
///
/// Surrounding spaces are kept so a phrase like `" win "` only matches a
/// whole word. An empty phrase is a substring of every text and would fire on
/// all input.
fn normalize_phrases(category: &str, phrases: &[String]) -> Result<Vec<String>, CorpusError> {
    phrases
        .iter()
        .map(|phrase| {
            if phrase.trim().is_empty() {
                Err(CorpusError::EmptyPhrase { category: category.to_string() })
            } else {
                Ok(phrase.to_lowercase())
            }
        })
        .collect()
}

/// Load and compile a corpus from a JSON file
///
/// # Arguments
///
/// * `path` - Path to the corpus configuration file
///
/// # Returns
///
/// The compiled corpus
pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<PatternCorpus, CorpusError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)?;
    let config: CorpusConfig = serde_json::from_str(&raw)?;
    let corpus = PatternCorpus::from_config(&config)?;
    info!("Loaded corpus from {}", path.display());
    Ok(corpus)
}

lazy_static! {
    /// Built-in corpus shared process-wide
    pub static ref DEFAULT_CORPUS: Arc<PatternCorpus> = Arc::new(
        PatternCorpus::from_config(&CorpusConfig::default())
            .expect("built-in corpus must compile")
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_corpus_compiles() {
        let corpus = &*DEFAULT_CORPUS;
        let names: Vec<_> = corpus.phrase_categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["urgent", "financial", "suspicious"]);
        assert_eq!(corpus.url_patterns().patterns.len(), 3);
        // 11 urgent + 9 financial + 8 suspicious + 3 URL + 2 credential keywords
        assert_eq!(corpus.pattern_count(), 33);
    }

    #[test]
    fn test_default_weights() {
        let corpus = &*DEFAULT_CORPUS;
        assert_eq!(corpus.category("urgent").map(|c| c.weight), Some(15));
        assert_eq!(corpus.category("financial").map(|c| c.weight), Some(20));
        assert_eq!(corpus.category("suspicious").map(|c| c.weight), Some(10));
        assert_eq!(corpus.url_patterns().weight, 25);
        assert_eq!(corpus.credential_request().weight, 20);
    }

    #[test]
    fn test_tld_alternation_binds_loosely() {
        let tld = &DEFAULT_CORPUS.url_patterns().patterns[2];
        assert!(tld.is_match("visit evil.tk now"));
        // Bare ".ml" matches without any host in front of it
        assert!(tld.is_match("see .ml"));
        assert!(!tld.is_match("example.com"));
    }

    #[test]
    fn test_ip_pattern_ascii_digits_only() {
        let ip = &DEFAULT_CORPUS.url_patterns().patterns[0];
        assert!(ip.is_match("http://10.0.0.1/"));
        assert!(!ip.is_match("١.٢.٣.٤"));
    }

    #[test]
    fn test_phrases_are_lowercased_keeping_spaces() {
        let mut config = CorpusConfig::default();
        config.phrase_categories[0].phrases = vec![" WIN ".to_string(), "Act Now".to_string()];
        let corpus = PatternCorpus::from_config(&config).unwrap();
        assert_eq!(
            corpus.phrase_categories()[0].phrases,
            vec![" win ".to_string(), "act now".to_string()]
        );
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = CorpusConfig::default();
        config.url_patterns.patterns.push("([unclosed".to_string());
        assert!(matches!(
            PatternCorpus::from_config(&config),
            Err(CorpusError::InvalidPattern { .. })
        ));

        let mut config = CorpusConfig::default();
        config.phrase_categories[1].phrases.push("   ".to_string());
        assert!(matches!(
            PatternCorpus::from_config(&config),
            Err(CorpusError::EmptyPhrase { .. })
        ));

        let mut config = CorpusConfig::default();
        config.phrase_categories[2].name = "urgent".to_string();
        assert!(matches!(
            PatternCorpus::from_config(&config),
            Err(CorpusError::DuplicateCategory(name)) if name == "urgent"
        ));

        let mut config = CorpusConfig::default();
        config.phrase_categories[0].name = String::new();
        assert!(matches!(
            PatternCorpus::from_config(&config),
            Err(CorpusError::EmptyCategory)
        ));
    }

    #[test]
    fn test_config_json_round_trip_keeps_order() {
        let json = serde_json::to_string(&CorpusConfig::default()).unwrap();
        assert!(json.contains(r#""severity":"threat""#));
        let parsed: CorpusConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, CorpusConfig::default());
    }
}
