//! Derived metric formulas: engagement, controversiality, headline
//!
//! All functions here are pure; the aggregation engine calls them every
//! time a comment is recorded so derived values never go stale.

use crate::aggregates::SentimentTotals;
use crate::config::HeadlineThresholds;
use crate::errors::{CoreError, Result};
use crate::types::{EngagementLevel, SentimentHeadline, SentimentLabel};
use once_cell::sync::Lazy;
use regex::Regex;

static VIDEO_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:v=|/)([0-9A-Za-z_-]{11})(?:[?&#/]|$)").unwrap());
static BARE_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9A-Za-z_-]{11}$").unwrap());

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Pull the 11-character video id out of a YouTube URL. A bare id is
/// accepted as-is; anything else is rejected before any state mutation.
pub fn extract_video_id(url: &str) -> Result<String> {
    let trimmed = url.trim();
    if BARE_ID_RE.is_match(trimmed) {
        return Ok(trimmed.to_string());
    }
    VIDEO_ID_RE
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| CoreError::InvalidUrl(format!("no video id in '{}'", url)))
}

/// Likes plus comments over views, as a percentage with one decimal.
pub fn engagement_rate(view_count: u64, like_count: u64, comment_count: u64) -> f64 {
    round1((like_count + comment_count) as f64 / view_count.max(1) as f64 * 100.0)
}

pub fn engagement_level(rate: f64, thresholds: &HeadlineThresholds) -> EngagementLevel {
    if rate >= thresholds.high_engagement_min {
        EngagementLevel::High
    } else if rate >= thresholds.medium_engagement_min {
        EngagementLevel::Medium
    } else {
        EngagementLevel::Low
    }
}

/// Dispersion of the positive/negative split: 0 when one polarity holds
/// everything (or nothing is polarized yet), 1 when perfectly split.
pub fn controversiality(totals: &SentimentTotals) -> f64 {
    let pos = totals.get(SentimentLabel::Positive) as f64;
    let neg = totals.get(SentimentLabel::Negative) as f64;
    if pos + neg == 0.0 {
        return 0.0;
    }
    round3(1.0 - (pos - neg).abs() / (pos + neg))
}

/// Label holding the largest bucket. Ties resolve in a fixed label order
/// so the result is deterministic.
pub fn dominant_label(totals: &SentimentTotals) -> Option<SentimentLabel> {
    if totals.sum() == 0 {
        return None;
    }
    let mut best = SentimentLabel::Positive;
    for label in SentimentLabel::ALL {
        if totals.get(label) > totals.get(best) {
            best = label;
        }
    }
    Some(best)
}

/// Priority rule for the one-word headline: controversial beats viral
/// beats boring beats the dominant sentiment label.
pub fn classify_headline(
    totals: &SentimentTotals,
    controversiality_score: f64,
    engagement_rate: f64,
    thresholds: &HeadlineThresholds,
) -> SentimentHeadline {
    let total = totals.sum();
    if total == 0 {
        return SentimentHeadline::Neutral;
    }

    let pos_ratio = totals.get(SentimentLabel::Positive) as f64 / total as f64;
    let neg_ratio = totals.get(SentimentLabel::Negative) as f64 / total as f64;
    let dominant = dominant_label(totals);

    // Both polarities must be genuinely represented, otherwise a handful
    // of polarized comments under a sea of neutral ones would dominate.
    if controversiality_score > thresholds.controversial_min
        && pos_ratio > thresholds.contested_ratio_min
        && neg_ratio > thresholds.contested_ratio_min
    {
        return SentimentHeadline::Controversial;
    }

    if engagement_rate > thresholds.viral_engagement_min
        && dominant == Some(SentimentLabel::Positive)
    {
        return SentimentHeadline::Viral;
    }

    if engagement_rate < thresholds.boring_engagement_max {
        return SentimentHeadline::Boring;
    }

    match dominant {
        Some(SentimentLabel::Positive) => SentimentHeadline::Positive,
        Some(SentimentLabel::Negative) => SentimentHeadline::Negative,
        _ => SentimentHeadline::Neutral,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn totals(positive: u64, neutral: u64, negative: u64, ambiguous: u64) -> SentimentTotals {
        let mut t = SentimentTotals::default();
        for _ in 0..positive {
            t.increment(SentimentLabel::Positive);
        }
        for _ in 0..neutral {
            t.increment(SentimentLabel::Neutral);
        }
        for _ in 0..negative {
            t.increment(SentimentLabel::Negative);
        }
        for _ in 0..ambiguous {
            t.increment(SentimentLabel::Ambiguous);
        }
        t
    }

    #[test]
    fn extracts_id_from_common_url_shapes() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s",
            "dQw4w9WgXcQ",
        ] {
            assert_eq!(extract_video_id(url).unwrap(), "dQw4w9WgXcQ");
        }
    }

    #[test]
    fn rejects_malformed_urls() {
        assert!(extract_video_id("https://example.com/nothing-here").is_err());
        assert!(extract_video_id("short").is_err());
    }

    #[test]
    fn engagement_rate_survives_zero_views() {
        assert_eq!(engagement_rate(0, 5, 5), 1000.0);
        assert_eq!(engagement_rate(1000, 20, 10), 3.0);
    }

    #[test]
    fn unanimous_distribution_is_not_controversial() {
        assert_eq!(controversiality(&totals(10, 0, 0, 0)), 0.0);
        assert_eq!(controversiality(&totals(0, 7, 0, 3)), 0.0);
    }

    #[test]
    fn even_split_is_maximally_controversial() {
        assert_eq!(controversiality(&totals(5, 0, 5, 0)), 1.0);
    }

    #[test]
    fn moderate_split_falls_back_to_dominant_label() {
        // 6 positive / 3 negative / 1 neutral: controversiality is 0.667,
        // below the 0.7 cutoff, so with unremarkable engagement the
        // headline falls back to the dominant label.
        let t = totals(6, 1, 3, 0);
        let c = controversiality(&t);
        assert!((c - 0.667).abs() < 1e-9);

        let thresholds = HeadlineThresholds::default();
        let headline = classify_headline(&t, c, 1.0, &thresholds);
        assert_eq!(headline, SentimentHeadline::Positive);
    }

    #[test]
    fn controversial_beats_viral() {
        let thresholds = HeadlineThresholds::default();
        let t = totals(5, 0, 5, 0);
        let headline = classify_headline(&t, controversiality(&t), 10.0, &thresholds);
        assert_eq!(headline, SentimentHeadline::Controversial);
    }

    #[test]
    fn polarized_sliver_under_neutral_majority_is_not_controversial() {
        let thresholds = HeadlineThresholds::default();
        let t = totals(2, 96, 2, 0);
        let c = controversiality(&t);
        assert_eq!(c, 1.0);
        let headline = classify_headline(&t, c, 1.0, &thresholds);
        assert_eq!(headline, SentimentHeadline::Neutral);
    }

    #[test]
    fn high_engagement_positive_video_goes_viral() {
        let thresholds = HeadlineThresholds::default();
        let t = totals(6, 3, 1, 0);
        let headline = classify_headline(&t, controversiality(&t), 5.0, &thresholds);
        assert_eq!(headline, SentimentHeadline::Viral);
    }

    #[test]
    fn low_engagement_video_is_boring() {
        let thresholds = HeadlineThresholds::default();
        // Mostly neutral; the polarized sliver is split but too small for
        // the controversial headline, and engagement is under the floor.
        let t = totals(1, 8, 1, 0);
        let headline = classify_headline(&t, controversiality(&t), 0.2, &thresholds);
        assert_eq!(headline, SentimentHeadline::Boring);
    }

    #[test]
    fn empty_distribution_is_neutral() {
        let thresholds = HeadlineThresholds::default();
        let headline = classify_headline(&SentimentTotals::default(), 0.0, 0.0, &thresholds);
        assert_eq!(headline, SentimentHeadline::Neutral);
    }

    proptest! {
        #[test]
        fn controversiality_stays_in_unit_interval(
            pos in 0u64..5000,
            neu in 0u64..5000,
            neg in 0u64..5000,
            amb in 0u64..5000,
        ) {
            let c = controversiality(&totals(pos, neu, neg, amb));
            prop_assert!((0.0..=1.0).contains(&c));
        }

        #[test]
        fn headline_is_deterministic(
            pos in 0u64..200,
            neu in 0u64..200,
            neg in 0u64..200,
            rate in 0.0f64..50.0,
        ) {
            let thresholds = HeadlineThresholds::default();
            let t = totals(pos, neu, neg, 0);
            let c = controversiality(&t);
            let a = classify_headline(&t, c, rate, &thresholds);
            let b = classify_headline(&t, c, rate, &thresholds);
            prop_assert_eq!(a, b);
        }
    }
}
