// src/enrich/polarity.rs
// Polarity-based pass: mean word polarity from a separate pattern lexicon,
// mapped to a label by sign. The model sits behind a trait so a failing
// scorer can be injected in tests; a per-headline failure marks that one
// record `Error` and the batch continues.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::enrich::{is_negator, label_from_polarity, tokenize, EnrichedHeadline, Sentiment, SentimentPass};
use crate::error::EnrichError;

static PATTERN: Lazy<HashMap<String, f64>> = Lazy::new(|| {
    let raw = include_str!("../../pattern_lexicon.json");
    serde_json::from_str::<HashMap<String, f64>>(raw).expect("valid pattern lexicon")
});

/// Inputs past this length are refused rather than scored.
pub const MAX_INPUT_CHARS: usize = 2000;

/// Negated polarities are halved and flipped, not fully inverted.
const NEGATION_SCALAR: f64 = -0.5;

/// Scores one text into a polarity in [-1, 1], or fails for that text alone.
pub trait PolarityModel: Send + Sync {
    fn polarity(&self, text: &str) -> Result<f64, EnrichError>;
}

/// Pattern-lexicon model: average polarity over matched words, zero when
/// nothing matches.
#[derive(Debug, Clone, Default)]
pub struct PatternPolarity;

impl PatternPolarity {
    pub fn new() -> Self {
        Self
    }
}

impl PolarityModel for PatternPolarity {
    fn polarity(&self, text: &str) -> Result<f64, EnrichError> {
        let len = text.chars().count();
        if len > MAX_INPUT_CHARS {
            return Err(EnrichError::InputTooLong {
                len,
                max: MAX_INPUT_CHARS,
            });
        }

        let tokens: Vec<String> = tokenize(text).collect();
        let mut sum = 0.0_f64;
        let mut hits = 0_usize;

        for i in 0..tokens.len() {
            let Some(&p) = PATTERN.get(tokens[i].as_str()) else {
                continue;
            };
            let negated = (1..=2).any(|k| i >= k && is_negator(&tokens[i - k]));
            sum += if negated { p * NEGATION_SCALAR } else { p };
            hits += 1;
        }

        if hits == 0 {
            Ok(0.0)
        } else {
            Ok(sum / hits as f64)
        }
    }
}

pub struct PolarityPass<M: PolarityModel> {
    model: M,
}

impl<M: PolarityModel> PolarityPass<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }
}

impl Default for PolarityPass<PatternPolarity> {
    fn default() -> Self {
        Self::new(PatternPolarity::new())
    }
}

impl<M: PolarityModel> SentimentPass for PolarityPass<M> {
    fn annotate(&self, batch: &mut [EnrichedHeadline]) {
        for rec in batch {
            rec.textblob_label = match self.model.polarity(&rec.headline) {
                Ok(p) => label_from_polarity(p),
                Err(e) => {
                    tracing::error!(headline = %rec.headline, error = %e, "polarity scoring failed");
                    Sentiment::Error
                }
            };
        }
    }

    fn name(&self) -> &'static str {
        "polarity"
    }
}
