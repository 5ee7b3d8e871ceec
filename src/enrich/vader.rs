// src/enrich/vader.rs
// Lexicon/compound-score pass. Valence lexicon with negation and booster
// handling, normalized into [-1, 1]. Pure function of the text.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::enrich::{is_negator, label_from_compound, tokenize, EnrichedHeadline, SentimentPass};

static LEXICON: Lazy<HashMap<String, f64>> = Lazy::new(|| {
    let raw = include_str!("../../compound_lexicon.json");
    serde_json::from_str::<HashMap<String, f64>>(raw).expect("valid compound lexicon")
});

/// Negated valences keep most of their weight but flip sign.
const NEGATION_SCALAR: f64 = -0.74;
/// Booster words shift the following valence away from zero by this much.
const BOOSTER_DELTA: f64 = 0.293;
/// Dampeners pull it back toward zero.
const DAMPENER_DELTA: f64 = -0.293;
/// Normalization constant for the compound score.
const ALPHA: f64 = 15.0;

#[derive(Debug, Clone, Default)]
pub struct VaderAnalyzer;

impl VaderAnalyzer {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn word_valence(&self, w: &str) -> f64 {
        *LEXICON.get(w).unwrap_or(&0.0)
    }

    /// Compound polarity of `text` in [-1, 1]. Zero when no lexicon word hits.
    ///
    /// Negation: a negator within the previous 1..=3 tokens flips the valence
    /// (scaled, not a clean inversion). A booster or dampener directly before
    /// the scored word shifts its magnitude.
    pub fn compound(&self, text: &str) -> f64 {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut total = 0.0_f64;

        for i in 0..tokens.len() {
            let mut valence = self.word_valence(&tokens[i]);
            if valence == 0.0 {
                continue;
            }

            if i >= 1 {
                valence += modifier_delta(&tokens[i - 1]) * valence.signum();
            }

            let negated = (1..=3).any(|k| i >= k && is_negator(&tokens[i - k]));
            if negated {
                valence *= NEGATION_SCALAR;
            }

            total += valence;
        }

        if total == 0.0 {
            return 0.0;
        }
        (total / (total * total + ALPHA).sqrt()).clamp(-1.0, 1.0)
    }
}

fn modifier_delta(tok: &str) -> f64 {
    match tok {
        "very" | "extremely" | "hugely" | "sharply" | "strongly" | "massively"
        | "significantly" | "remarkably" => BOOSTER_DELTA,
        "slightly" | "somewhat" | "marginally" | "mildly" => DAMPENER_DELTA,
        _ => 0.0,
    }
}

impl SentimentPass for VaderAnalyzer {
    fn annotate(&self, batch: &mut [EnrichedHeadline]) {
        for rec in batch {
            rec.vader_score = self.compound(&rec.headline);
            rec.vader_label = label_from_compound(rec.vader_score);
        }
    }

    fn name(&self) -> &'static str {
        "vader"
    }
}
