//! Verdict classification
//!
//! Maps a raw (unclamped) score onto the three-way verdict.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw score at or above which content is classified as phishing
pub const PHISHING_THRESHOLD: u32 = 40;

/// Raw score at or above which content is classified as suspicious
pub const SUSPICIOUS_THRESHOLD: u32 = 20;

/// Upper bound of the reported score
pub const MAX_SCORE: u32 = 100;

/// Three-way classification of analyzed content, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Safe,
    Suspicious,
    Phishing,
}

impl Verdict {
    /// Classify a raw score. Must be called before the score is clamped.
    pub fn from_raw_score(raw_score: u32) -> Self {
        if raw_score >= PHISHING_THRESHOLD {
            Verdict::Phishing
        } else if raw_score >= SUSPICIOUS_THRESHOLD {
            Verdict::Suspicious
        } else {
            Verdict::Safe
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Safe => "safe",
            Verdict::Suspicious => "suspicious",
            Verdict::Phishing => "phishing",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clamp a raw score into the reported range
pub fn clamp_score(raw_score: u32) -> u32 {
    raw_score.min(MAX_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_partition() {
        for raw in 0..=300 {
            let verdict = Verdict::from_raw_score(raw);
            let expected = if raw < 20 {
                Verdict::Safe
            } else if raw < 40 {
                Verdict::Suspicious
            } else {
                Verdict::Phishing
            };
            assert_eq!(verdict, expected, "raw score {}", raw);
        }
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(Verdict::from_raw_score(19), Verdict::Safe);
        assert_eq!(Verdict::from_raw_score(20), Verdict::Suspicious);
        assert_eq!(Verdict::from_raw_score(39), Verdict::Suspicious);
        assert_eq!(Verdict::from_raw_score(40), Verdict::Phishing);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp_score(0), 0);
        assert_eq!(clamp_score(100), 100);
        assert_eq!(clamp_score(140), 100);
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(serde_json::to_string(&Verdict::Safe).unwrap(), r#""safe""#);
        assert_eq!(serde_json::to_string(&Verdict::Phishing).unwrap(), r#""phishing""#);
        assert!(Verdict::Phishing > Verdict::Suspicious);
        assert_eq!(Verdict::Suspicious.to_string(), "suspicious");
    }
}
