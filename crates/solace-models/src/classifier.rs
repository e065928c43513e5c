//! Sentiment classifier adapter.
//!
//! - `HttpClassifier` calls a hosted sentiment-analysis endpoint (Hugging Face
//!   Inference API shape) and keeps the top-scoring label.
//! - `LexiconClassifier` scores text against small positive/negative word
//!   lists. Used when no endpoint is configured and in tests.

use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use solace_core::config::ModelsConfig;
use solace_core::Judgment;

use crate::error::ModelError;
use crate::http::Endpoint;

/// Sentiment classifier.
///
/// Implementations must return a [`Judgment`] whose confidence is already
/// normalized (see [`Judgment::new`]). Unrecognized labels are passed
/// through, not rejected.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Classify `text`.
    async fn classify(&self, text: &str) -> Result<Judgment, ModelError>;
}

// ---------------------------------------------------------------------------
// HttpClassifier
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassifierResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
    Failed { error: String },
}

impl ClassifierResponse {
    fn into_judgment(self) -> Result<Judgment, ModelError> {
        let candidates = match self {
            ClassifierResponse::Nested(batches) => batches.into_iter().next().unwrap_or_default(),
            ClassifierResponse::Flat(scores) => scores,
            ClassifierResponse::Failed { error } => return Err(ModelError::Unavailable(error)),
        };

        candidates
            .into_iter()
            .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))
            .map(|best| Judgment::new(best.label, best.score))
            .ok_or_else(|| ModelError::InvalidResponse("no labels in response".to_string()))
    }
}

/// Classifier backed by a hosted sentiment endpoint.
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    endpoint: Endpoint,
}

impl HttpClassifier {
    pub fn new(url: &str, token: Option<String>, timeout: Duration) -> Result<Self, ModelError> {
        Ok(Self {
            endpoint: Endpoint::new(url, token, timeout)?,
        })
    }

    pub fn from_config(config: &ModelsConfig) -> Result<Self, ModelError> {
        Self::new(
            &config.classifier_url,
            config.api_token.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn classify(&self, text: &str) -> Result<Judgment, ModelError> {
        let response: ClassifierResponse = self
            .endpoint
            .post_json(&serde_json::json!({ "inputs": text }))
            .await?;
        let judgment = response.into_judgment()?;
        tracing::debug!(
            label = %judgment.label,
            confidence = judgment.confidence,
            "Hosted classifier judgment"
        );
        Ok(judgment)
    }
}

// ---------------------------------------------------------------------------
// LexiconClassifier
// ---------------------------------------------------------------------------

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "happy", "glad", "love", "loved", "like", "enjoy", "enjoyed", "excellent",
    "amazing", "wonderful", "fantastic", "better", "best", "thanks", "thank", "grateful",
    "helpful", "calm", "relaxed", "hopeful", "excited", "pleased", "awesome", "nice", "fine",
    "proud", "confident", "safe",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "sad", "angry", "hate", "hated", "awful", "terrible", "horrible", "worse", "worst",
    "upset", "anxious", "anxiety", "depressed", "lonely", "alone", "afraid", "scared", "tired",
    "stressed", "hopeless", "worried", "hurt", "pain", "cry", "crying", "miserable", "unhappy",
    "frustrated", "overwhelmed", "broken", "useless", "annoyed", "disappointed",
];

const NEGATIONS: &[&str] = &["not", "no", "never", "dont", "don't", "isnt", "isn't", "cant", "can't"];

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z']+").unwrap());

/// Word-list sentiment classifier.
///
/// Counts positive and negative words, flipping the polarity of a word that
/// directly follows a negation. Ties and texts with no hits are `NEUTRAL`
/// at confidence 0.5; otherwise confidence grows with the margin, reaching
/// 1.0 when every hit agrees.
#[derive(Debug, Clone)]
pub struct LexiconClassifier {
    positive: HashSet<&'static str>,
    negative: HashSet<&'static str>,
    negations: HashSet<&'static str>,
}

impl LexiconClassifier {
    pub fn new() -> Self {
        Self {
            positive: POSITIVE_WORDS.iter().copied().collect(),
            negative: NEGATIVE_WORDS.iter().copied().collect(),
            negations: NEGATIONS.iter().copied().collect(),
        }
    }

    /// Synchronous scoring used by the async trait method.
    pub fn score(&self, text: &str) -> Judgment {
        let lowered = text.to_lowercase();
        let mut positive = 0u32;
        let mut negative = 0u32;
        let mut negate_next = false;

        for word in WORD_RE.find_iter(&lowered).map(|m| m.as_str()) {
            if self.negations.contains(word) {
                negate_next = true;
                continue;
            }
            let polarity = if self.positive.contains(word) {
                1i8
            } else if self.negative.contains(word) {
                -1i8
            } else {
                0
            };
            let polarity = if negate_next { -polarity } else { polarity };
            match polarity {
                1 => positive += 1,
                -1 => negative += 1,
                _ => {}
            }
            negate_next = false;
        }

        let hits = positive + negative;
        if hits == 0 || positive == negative {
            return Judgment::new("NEUTRAL", 0.5);
        }

        let margin = f64::from(positive.abs_diff(negative)) / f64::from(hits);
        let label = if positive > negative {
            "POSITIVE"
        } else {
            "NEGATIVE"
        };
        Judgment::new(label, 0.5 + margin / 2.0)
    }
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Classifier for LexiconClassifier {
    fn name(&self) -> &'static str {
        "lexicon"
    }

    async fn classify(&self, text: &str) -> Result<Judgment, ModelError> {
        if text.trim().is_empty() {
            return Err(ModelError::EmptyInput);
        }
        Ok(self.score(text))
    }
}
