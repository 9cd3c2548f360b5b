//! Sentiment classification
//!
//! The engine talks to classifiers through [`SentimentClassifier`]; the
//! built-in [`LexiconClassifier`] is a wordlist scorer good enough to keep
//! the pipeline self-contained. Classifier failures never fail a run: the
//! engine records the comment as ambiguous and moves on.

use crate::errors::Result;
use crate::types::{Sentiment, SentimentLabel};
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Scores a single comment's text. Pure and synchronous from the core's
/// perspective; implementations must be cheap enough to call per comment.
pub trait SentimentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<Sentiment>;
}

static POSITIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "amazing", "awesome", "beautiful", "best", "brilliant", "cool", "enjoyed", "excellent",
        "fantastic", "favorite", "fun", "funny", "good", "great", "happy", "helpful", "incredible",
        "insightful", "interesting", "love", "loved", "lovely", "masterpiece", "nice", "perfect",
        "thanks", "underrated", "wholesome", "wonderful", "wow",
    ]
    .into_iter()
    .collect()
});

static NEGATIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "annoying", "awful", "bad", "boring", "clickbait", "cringe", "disappointing", "dislike",
        "dull", "garbage", "hate", "hated", "horrible", "misleading", "overrated", "pathetic",
        "pointless", "sad", "scam", "stupid", "terrible", "trash", "ugly", "useless", "waste",
        "worst", "wrong",
    ]
    .into_iter()
    .collect()
});

static NEGATIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["not", "no", "never", "isnt", "wasnt", "dont", "didnt", "cant", "wont", "nothing"]
        .into_iter()
        .collect()
});

/// Wordlist-based classifier producing a signed score in [-1, 1].
///
/// Score is the balance of positive vs. negative hits; a negation flips
/// the hit that follows it. When both polarities are present and neither
/// clearly wins, the text is labeled ambiguous, mirroring the
/// low-confidence cutoff of the model this replaces.
pub struct LexiconClassifier {
    ambiguous_band: f64,
}

impl LexiconClassifier {
    pub fn new() -> Self {
        Self {
            ambiguous_band: 0.6,
        }
    }

    fn tokenize(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .map(|t| t.replace('\'', ""))
            .filter(|t| !t.is_empty())
            .collect()
    }
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentClassifier for LexiconClassifier {
    fn classify(&self, text: &str) -> Result<Sentiment> {
        let tokens = Self::tokenize(text);

        let mut positive_hits = 0.0_f64;
        let mut negative_hits = 0.0_f64;
        let mut negated = false;

        for token in &tokens {
            if NEGATIONS.contains(token.as_str()) {
                negated = true;
                continue;
            }
            if POSITIVE_WORDS.contains(token.as_str()) {
                if negated {
                    negative_hits += 1.0;
                } else {
                    positive_hits += 1.0;
                }
                negated = false;
            } else if NEGATIVE_WORDS.contains(token.as_str()) {
                if negated {
                    positive_hits += 1.0;
                } else {
                    negative_hits += 1.0;
                }
                negated = false;
            }
        }

        let hits = positive_hits + negative_hits;
        if hits == 0.0 {
            return Ok(Sentiment {
                label: SentimentLabel::Neutral,
                score: 0.0,
            });
        }

        let score = (positive_hits - negative_hits) / hits;
        let mixed = positive_hits > 0.0 && negative_hits > 0.0;

        let label = if mixed && score.abs() < self.ambiguous_band {
            SentimentLabel::Ambiguous
        } else if score > 0.0 {
            SentimentLabel::Positive
        } else if score < 0.0 {
            SentimentLabel::Negative
        } else {
            // Exactly balanced and not caught by the band above can only
            // happen with a zero band; treat it as ambiguous anyway.
            SentimentLabel::Ambiguous
        };

        Ok(Sentiment { label, score })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Sentiment {
        LexiconClassifier::new().classify(text).unwrap()
    }

    #[test]
    fn praise_scores_positive() {
        let s = classify("This video was amazing, best explanation I've seen!");
        assert_eq!(s.label, SentimentLabel::Positive);
        assert!(s.score > 0.0);
    }

    #[test]
    fn complaints_score_negative() {
        let s = classify("terrible clickbait, waste of time");
        assert_eq!(s.label, SentimentLabel::Negative);
        assert!(s.score < 0.0);
    }

    #[test]
    fn no_signal_is_neutral() {
        let s = classify("I watched this on a train yesterday");
        assert_eq!(s.label, SentimentLabel::Neutral);
        assert_eq!(s.score, 0.0);
    }

    #[test]
    fn negation_flips_polarity() {
        let s = classify("not good at all");
        assert_eq!(s.label, SentimentLabel::Negative);
    }

    #[test]
    fn mixed_signals_are_ambiguous() {
        let s = classify("great footage but terrible audio");
        assert_eq!(s.label, SentimentLabel::Ambiguous);
        assert!(s.score.abs() < 0.6);
    }

    #[test]
    fn scores_stay_in_bounds() {
        for text in [
            "love love love",
            "hate hate hate hate",
            "good bad good bad good",
            "",
        ] {
            let s = classify(text);
            assert!((-1.0..=1.0).contains(&s.score), "score out of bounds for {:?}", text);
        }
    }
}
