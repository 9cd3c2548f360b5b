//! Running per-video aggregates
//!
//! The store applies every classified comment through [`VideoAggregates::record`]
//! under the video's write lock, so `sum(sentiment_totals) == total_analyzed`
//! holds at every instant a reader can observe.

use crate::config::HeadlineThresholds;
use crate::metrics;
use crate::types::{EngagementLevel, SentimentHeadline, SentimentLabel};
use serde::{Deserialize, Serialize};

/// Count of classified comments per sentiment label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentTotals {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
    pub ambiguous: u64,
}

impl SentimentTotals {
    pub fn get(&self, label: SentimentLabel) -> u64 {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Neutral => self.neutral,
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Ambiguous => self.ambiguous,
        }
    }

    pub fn increment(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Neutral => self.neutral += 1,
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Ambiguous => self.ambiguous += 1,
        }
    }

    pub fn sum(&self) -> u64 {
        self.positive + self.neutral + self.negative + self.ambiguous
    }
}

/// View/like/comment counts feeding the engagement metrics.
#[derive(Debug, Clone, Copy)]
pub struct EngagementStats {
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
}

/// The complete rollup served for one video.
#[derive(Debug, Clone, Serialize)]
pub struct VideoAggregates {
    pub sentiment_totals: SentimentTotals,
    /// Running mean of the signed per-comment scores.
    pub average_score: f64,
    pub engagement_rate: f64,
    pub engagement_label: EngagementLevel,
    pub controversiality_score: f64,
    pub sentiment_headline: SentimentHeadline,
    #[serde(skip)]
    score_sum: f64,
}

impl VideoAggregates {
    pub fn new(stats: EngagementStats, thresholds: &HeadlineThresholds) -> Self {
        let mut aggregates = VideoAggregates {
            sentiment_totals: SentimentTotals::default(),
            average_score: 0.0,
            engagement_rate: 0.0,
            engagement_label: EngagementLevel::Low,
            controversiality_score: 0.0,
            sentiment_headline: SentimentHeadline::Neutral,
            score_sum: 0.0,
        };
        aggregates.refresh_engagement(stats, thresholds);
        aggregates
    }

    /// Fold one classified comment into the rollup. Exactly-once delivery
    /// is the caller's responsibility (the store's seen-id set).
    pub fn record(
        &mut self,
        label: SentimentLabel,
        score: f64,
        stats: EngagementStats,
        thresholds: &HeadlineThresholds,
    ) {
        self.sentiment_totals.increment(label);
        self.score_sum += score;
        self.average_score = self.score_sum / self.sentiment_totals.sum() as f64;
        self.refresh_engagement(stats, thresholds);
    }

    /// Recompute everything derived from the engagement counts and the
    /// current distribution. Called on metadata refresh as well, since a
    /// new view count moves the engagement rate.
    pub fn refresh_engagement(&mut self, stats: EngagementStats, thresholds: &HeadlineThresholds) {
        self.engagement_rate =
            metrics::engagement_rate(stats.view_count, stats.like_count, stats.comment_count);
        self.engagement_label = metrics::engagement_level(self.engagement_rate, thresholds);
        self.controversiality_score = metrics::controversiality(&self.sentiment_totals);
        self.sentiment_headline = metrics::classify_headline(
            &self.sentiment_totals,
            self.controversiality_score,
            self.engagement_rate,
            thresholds,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> EngagementStats {
        EngagementStats {
            view_count: 10_000,
            like_count: 50,
            comment_count: 50,
        }
    }

    #[test]
    fn totals_sum_matches_recorded_count() {
        let thresholds = HeadlineThresholds::default();
        let mut aggregates = VideoAggregates::new(stats(), &thresholds);

        let script = [
            (SentimentLabel::Positive, 0.8),
            (SentimentLabel::Positive, 0.9),
            (SentimentLabel::Negative, -0.7),
            (SentimentLabel::Neutral, 0.0),
            (SentimentLabel::Ambiguous, 0.0),
        ];
        for (label, score) in script {
            aggregates.record(label, score, stats(), &thresholds);
        }

        assert_eq!(aggregates.sentiment_totals.sum(), 5);
        assert_eq!(aggregates.sentiment_totals.positive, 2);
        assert_eq!(aggregates.sentiment_totals.negative, 1);
        assert!((aggregates.average_score - 0.2).abs() < 1e-9);
    }

    #[test]
    fn spec_distribution_lands_on_positive_headline() {
        // 6 positive, 3 negative, 1 neutral with unremarkable engagement.
        let thresholds = HeadlineThresholds::default();
        let mut aggregates = VideoAggregates::new(stats(), &thresholds);

        for _ in 0..6 {
            aggregates.record(SentimentLabel::Positive, 0.9, stats(), &thresholds);
        }
        for _ in 0..3 {
            aggregates.record(SentimentLabel::Negative, -0.9, stats(), &thresholds);
        }
        aggregates.record(SentimentLabel::Neutral, 0.0, stats(), &thresholds);

        assert_eq!(
            aggregates.sentiment_totals,
            SentimentTotals {
                positive: 6,
                neutral: 1,
                negative: 3,
                ambiguous: 0
            }
        );
        assert!(aggregates.controversiality_score < 0.7);
        assert!(aggregates.controversiality_score > 0.0);
        assert_eq!(aggregates.sentiment_headline, SentimentHeadline::Positive);
    }

    #[test]
    fn engagement_refresh_moves_rate_and_label() {
        let thresholds = HeadlineThresholds::default();
        let mut aggregates = VideoAggregates::new(stats(), &thresholds);
        assert_eq!(aggregates.engagement_label, EngagementLevel::Medium);

        aggregates.refresh_engagement(
            EngagementStats {
                view_count: 1_000,
                like_count: 25,
                comment_count: 10,
            },
            &thresholds,
        );
        assert_eq!(aggregates.engagement_rate, 3.5);
        assert_eq!(aggregates.engagement_label, EngagementLevel::High);
    }
}
