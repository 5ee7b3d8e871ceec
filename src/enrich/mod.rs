// src/enrich/mod.rs
// Sentiment enrichment passes. Each pass annotates the whole batch in place
// and owns a disjoint set of fields, so application order does not matter.

pub mod polarity;
pub mod vader;

use serde::{Deserialize, Serialize};

/// Sentiment label attached to a headline. `Error` is only ever produced by
/// the polarity pass, for the one record whose scoring failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    Error,
}

/// One headline with both sentiment annotations. Serialized field names follow
/// the wire contract consumed by the HTTP layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedHeadline {
    #[serde(rename = "Headline")]
    pub headline: String,
    #[serde(rename = "Vader Sentiment Score")]
    pub vader_score: f64,
    #[serde(rename = "Vader Sentiment")]
    pub vader_label: Sentiment,
    #[serde(rename = "TextBlob Sentiment")]
    pub textblob_label: Sentiment,
}

impl EnrichedHeadline {
    /// Unscored record: zero compound score, all labels Neutral.
    pub fn seed(headline: String) -> Self {
        Self {
            headline,
            vader_score: 0.0,
            vader_label: Sentiment::Neutral,
            textblob_label: Sentiment::Neutral,
        }
    }
}

/// An enrichment pass over a seeded batch. Total: a pass never drops records
/// and never aborts the batch.
pub trait SentimentPass: Send + Sync {
    fn annotate(&self, batch: &mut [EnrichedHeadline]);
    fn name(&self) -> &'static str;
}

/// Seed a batch of headlines for annotation. Empty input stays empty.
pub fn seed_batch(headlines: Vec<String>) -> Vec<EnrichedHeadline> {
    headlines.into_iter().map(EnrichedHeadline::seed).collect()
}

/// Compound-score thresholds: ±0.05 band around zero is Neutral.
pub fn label_from_compound(score: f64) -> Sentiment {
    if score > 0.05 {
        Sentiment::Positive
    } else if score < -0.05 {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

/// Polarity mapping is sign-based: exactly zero is Neutral.
pub fn label_from_polarity(polarity: f64) -> Sentiment {
    if polarity > 0.0 {
        Sentiment::Positive
    } else if polarity < 0.0 {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

/// Alphanumeric tokens, lower-cased. Apostrophes split contractions, which is
/// why the negator set below carries stems like "isn".
pub(crate) fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
}

pub(crate) fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "none"
            | "neither"
            | "nor"
            | "cannot"
            | "without"
            | "hardly"
            | "isn"
            | "wasn"
            | "aren"
            | "weren"
            | "don"
            | "didn"
            | "doesn"
            | "couldn"
            | "wouldn"
            | "shouldn"
    )
}
