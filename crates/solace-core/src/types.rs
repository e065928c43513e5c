use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// UTC timestamp used on every recorded entry.
pub type Timestamp = DateTime<Utc>;

// =============================================================================
// Sentiment
// =============================================================================

/// Sentiment label attached to a message.
///
/// The three known labels are counted by the dashboard tally. Any other label
/// a classifier backend emits is carried through unchanged as `Other` and is
/// skipped by aggregation rather than treated as an error.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    Other(String),
}

impl SentimentLabel {
    /// Parse a raw classifier label. Known labels match case-insensitively.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "POSITIVE" => SentimentLabel::Positive,
            "NEGATIVE" => SentimentLabel::Negative,
            "NEUTRAL" => SentimentLabel::Neutral,
            _ => SentimentLabel::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SentimentLabel::Positive => "POSITIVE",
            SentimentLabel::Negative => "NEGATIVE",
            SentimentLabel::Neutral => "NEUTRAL",
            SentimentLabel::Other(raw) => raw,
        }
    }

    pub fn is_negative(&self) -> bool {
        matches!(self, SentimentLabel::Negative)
    }

    /// True for the three labels the tally counts.
    pub fn is_known(&self) -> bool {
        !matches!(self, SentimentLabel::Other(_))
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for SentimentLabel {
    fn from(raw: String) -> Self {
        SentimentLabel::parse(&raw)
    }
}

impl From<&str> for SentimentLabel {
    fn from(raw: &str) -> Self {
        SentimentLabel::parse(raw)
    }
}

impl From<SentimentLabel> for String {
    fn from(label: SentimentLabel) -> Self {
        match label {
            SentimentLabel::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// Structured result of sentiment classification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Judgment {
    pub label: SentimentLabel,
    /// Classifier confidence in `[0, 1]`, rounded to two decimals.
    pub confidence: f64,
}

impl Judgment {
    /// Build a judgment, clamping the score to `[0, 1]` and rounding it to
    /// two decimal places. Non-finite scores become `0.0`.
    pub fn new(label: impl Into<SentimentLabel>, score: f64) -> Self {
        let clamped = if score.is_finite() {
            score.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            label: label.into(),
            confidence: (clamped * 100.0).round() / 100.0,
        }
    }

    pub fn is_negative(&self) -> bool {
        self.label.is_negative()
    }

    /// Human-readable form shown on the chat page, e.g.
    /// `Sentiment: NEGATIVE (Confidence: 0.98)`.
    ///
    /// Display only. Nothing parses this string back.
    pub fn display(&self) -> String {
        format!(
            "Sentiment: {} (Confidence: {})",
            self.label, self.confidence
        )
    }
}

/// Per-label counts over the whole transcript. Derived on read, never stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentTally {
    #[serde(rename = "POSITIVE")]
    pub positive: u64,
    #[serde(rename = "NEGATIVE")]
    pub negative: u64,
    #[serde(rename = "NEUTRAL")]
    pub neutral: u64,
}

impl SentimentTally {
    /// Count one label. Unrecognized labels are ignored.
    pub fn add(&mut self, label: &SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
            SentimentLabel::Other(_) => {}
        }
    }

    pub fn total(&self) -> u64 {
        self.positive + self.negative + self.neutral
    }
}

// =============================================================================
// Recorded entries
// =============================================================================

/// One prompt/reply/judgment exchange. Immutable once appended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub id: Uuid,
    /// Arrival number, strictly increasing across the process lifetime.
    pub seq: u64,
    pub user_id: String,
    pub prompt: String,
    pub reply: String,
    pub sentiment_label: SentimentLabel,
    pub confidence: f64,
    pub recorded_at: Timestamp,
}

impl TranscriptEntry {
    pub fn judgment(&self) -> Judgment {
        Judgment {
            label: self.sentiment_label.clone(),
            confidence: self.confidence,
        }
    }
}

/// A negative exchange escalated for operator attention.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConcernEntry {
    pub id: Uuid,
    /// `seq` of the transcript entry this concern was derived from.
    pub transcript_seq: u64,
    pub user_id: String,
    pub text: String,
    pub recorded_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_parse_known_case_insensitive() {
        assert_eq!(SentimentLabel::parse("POSITIVE"), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::parse("negative"), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::parse(" Neutral "), SentimentLabel::Neutral);
    }

    #[test]
    fn test_label_parse_unknown_passes_through() {
        let label = SentimentLabel::parse("LABEL_1");
        assert_eq!(label, SentimentLabel::Other("LABEL_1".to_string()));
        assert_eq!(label.as_str(), "LABEL_1");
        assert!(!label.is_known());
        assert!(!label.is_negative());
    }

    #[test]
    fn test_label_serializes_as_plain_string() {
        let json = serde_json::to_string(&SentimentLabel::Negative).unwrap();
        assert_eq!(json, "\"NEGATIVE\"");

        let other: SentimentLabel = serde_json::from_str("\"mixed\"").unwrap();
        assert_eq!(other, SentimentLabel::Other("mixed".to_string()));
        assert_eq!(serde_json::to_string(&other).unwrap(), "\"mixed\"");
    }

    #[test]
    fn test_judgment_rounds_to_two_decimals() {
        let j = Judgment::new("POSITIVE", 0.998_76);
        assert_eq!(j.confidence, 1.0);
        let j = Judgment::new("NEGATIVE", 0.934_9);
        assert_eq!(j.confidence, 0.93);
    }

    #[test]
    fn test_judgment_clamps_out_of_range_scores() {
        assert_eq!(Judgment::new("NEUTRAL", 1.7).confidence, 1.0);
        assert_eq!(Judgment::new("NEUTRAL", -0.2).confidence, 0.0);
        assert_eq!(Judgment::new("NEUTRAL", f64::NAN).confidence, 0.0);
    }

    #[test]
    fn test_judgment_display() {
        let j = Judgment::new("NEGATIVE", 0.98);
        assert_eq!(j.display(), "Sentiment: NEGATIVE (Confidence: 0.98)");
        assert!(j.is_negative());
    }

    #[test]
    fn test_tally_counts_known_labels_only() {
        let mut tally = SentimentTally::default();
        for label in ["POSITIVE", "NEGATIVE", "NEUTRAL", "NEGATIVE", "LABEL_0"] {
            tally.add(&SentimentLabel::parse(label));
        }
        assert_eq!(
            tally,
            SentimentTally {
                positive: 1,
                negative: 2,
                neutral: 1
            }
        );
        assert_eq!(tally.total(), 4);
    }

    #[test]
    fn test_tally_serializes_with_upper_case_keys() {
        let tally = SentimentTally {
            positive: 3,
            negative: 1,
            neutral: 0,
        };
        let value = serde_json::to_value(tally).unwrap();
        assert_eq!(value["POSITIVE"], 3);
        assert_eq!(value["NEGATIVE"], 1);
        assert_eq!(value["NEUTRAL"], 0);
    }

    #[test]
    fn test_transcript_entry_judgment() {
        let entry = TranscriptEntry {
            id: Uuid::new_v4(),
            seq: 0,
            user_id: "admin".to_string(),
            prompt: "hi".to_string(),
            reply: "hello".to_string(),
            sentiment_label: SentimentLabel::Neutral,
            confidence: 0.5,
            recorded_at: Utc::now(),
        };
        assert_eq!(entry.judgment(), Judgment::new("NEUTRAL", 0.5));
    }
}
