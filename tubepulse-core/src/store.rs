//! In-memory keyed store of videos, comments and their analysis runs
//!
//! One `VideoEntry` bundles everything mutable about a video behind a
//! single `RwLock`, so the ingestion task's writes are atomic with respect
//! to readers: a snapshot can never observe sentiment totals whose sum
//! disagrees with `total_analyzed`. The outer map only grows; entries are
//! never deleted.

use crate::aggregates::{EngagementStats, VideoAggregates};
use crate::config::HeadlineThresholds;
use crate::errors::{CoreError, Result};
use crate::metrics::round1;
use crate::types::{
    AnalysisRun, AnalysisState, Comment, RawComment, Sentiment, Video, VideoMetadata,
};
use chrono::{Duration as ChronoDuration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Consistent point-in-time view of one video.
#[derive(Debug, Clone)]
pub struct VideoSnapshot {
    pub video: Video,
    pub run: AnalysisRun,
    pub aggregates: VideoAggregates,
}

struct VideoEntry {
    video: Video,
    run: AnalysisRun,
    comments: Vec<Comment>,
    seen: HashSet<String>,
    aggregates: VideoAggregates,
}

impl VideoEntry {
    fn stats(&self) -> EngagementStats {
        EngagementStats {
            view_count: self.video.view_count,
            like_count: self.video.like_count,
            comment_count: self.video.comment_count,
        }
    }

    fn snapshot(&self) -> VideoSnapshot {
        VideoSnapshot {
            video: self.video.clone(),
            run: self.run.clone(),
            aggregates: self.aggregates.clone(),
        }
    }
}

pub struct VideoStore {
    thresholds: HeadlineThresholds,
    inner: RwLock<HashMap<String, Arc<RwLock<VideoEntry>>>>,
}

impl VideoStore {
    pub fn new(thresholds: HeadlineThresholds) -> Self {
        Self {
            thresholds,
            inner: RwLock::new(HashMap::new()),
        }
    }

    async fn entry(&self, video_id: &str) -> Option<Arc<RwLock<VideoEntry>>> {
        self.inner.read().await.get(video_id).cloned()
    }

    pub async fn contains(&self, video_id: &str) -> bool {
        self.inner.read().await.contains_key(video_id)
    }

    /// Insert a new video with a pending run. Returns false (and leaves
    /// the existing entry untouched) if the video is already tracked, so
    /// exactly one concurrent caller wins the right to spawn ingestion.
    pub async fn insert_new(&self, meta: VideoMetadata, title_sentiment: Sentiment) -> bool {
        let mut map = self.inner.write().await;
        if map.contains_key(&meta.video_id) {
            return false;
        }

        let now = Utc::now();
        let video = Video {
            video_id: meta.video_id.clone(),
            title: meta.title,
            channel_id: meta.channel_id,
            channel_name: meta.channel_name,
            thumbnail_url: meta.thumbnail_url,
            view_count: meta.view_count,
            like_count: meta.like_count,
            comment_count: meta.comment_count,
            published_at: meta.published_at,
            view_change_pct: 0.0,
            trend: "New".to_string(),
            trend_explanation: "First analysis".to_string(),
            title_sentiment,
            fetched_at: now,
        };
        let run = AnalysisRun::new(&meta.video_id, meta.comment_count);
        let stats = EngagementStats {
            view_count: video.view_count,
            like_count: video.like_count,
            comment_count: video.comment_count,
        };
        let entry = VideoEntry {
            aggregates: VideoAggregates::new(stats, &self.thresholds),
            video,
            run,
            comments: Vec::new(),
            seen: HashSet::new(),
        };
        map.insert(meta.video_id, Arc::new(RwLock::new(entry)));
        true
    }

    /// Refresh counts from a new metadata fetch. Raises `total_expected`
    /// for a live run and recomputes the engagement-derived aggregates.
    pub async fn refresh_metadata(&self, video_id: &str, meta: VideoMetadata) -> Result<()> {
        let entry = self
            .entry(video_id)
            .await
            .ok_or_else(|| CoreError::NotFound(video_id.to_string()))?;
        let mut e = entry.write().await;

        let old_views = e.video.view_count;
        e.video.view_change_pct =
            round1((meta.view_count as f64 - old_views as f64) / old_views.max(1) as f64 * 100.0);
        if e.video.view_change_pct > 0.0 {
            e.video.trend = "Growing".to_string();
            e.video.trend_explanation = format!(
                "View count up {:.1}% since last fetch",
                e.video.view_change_pct
            );
        } else if e.video.view_change_pct < 0.0 {
            e.video.trend = "Declining".to_string();
            e.video.trend_explanation = format!(
                "View count down {:.1}% since last fetch",
                e.video.view_change_pct.abs()
            );
        } else {
            e.video.trend = "Steady".to_string();
            e.video.trend_explanation = "No view count change since last fetch".to_string();
        }

        e.video.title = meta.title;
        e.video.thumbnail_url = meta.thumbnail_url;
        e.video.view_count = meta.view_count;
        e.video.like_count = meta.like_count;
        e.video.comment_count = meta.comment_count;

        if e.run.state != AnalysisState::Completed {
            e.run.total_expected = meta.comment_count.max(e.run.total_analyzed);
        }

        let stats = e.stats();
        e.aggregates.refresh_engagement(stats, &self.thresholds);
        Ok(())
    }

    /// Record one classified comment, exactly once. Returns false for a
    /// duplicate id (the source is at-least-once per cursor).
    pub async fn record_classified(
        &self,
        video_id: &str,
        raw: RawComment,
        sentiment: Sentiment,
    ) -> Result<bool> {
        let entry = self
            .entry(video_id)
            .await
            .ok_or_else(|| CoreError::NotFound(video_id.to_string()))?;
        let mut e = entry.write().await;

        if !e.seen.insert(raw.comment_id.clone()) {
            debug!(video_id, comment_id = %raw.comment_id, "skipping duplicate comment");
            return Ok(false);
        }

        let stats = e.stats();
        e.aggregates
            .record(sentiment.label, sentiment.score, stats, &self.thresholds);
        e.comments.push(Comment {
            comment_id: raw.comment_id,
            author: raw.author,
            text: raw.text,
            like_count: raw.like_count,
            published_at: raw.published_at,
            sentiment_label: sentiment.label,
            sentiment_score: sentiment.score,
        });

        e.run.total_analyzed += 1;
        if e.run.total_analyzed > e.run.total_expected {
            e.run.total_expected = e.run.total_analyzed;
        }
        e.run.last_update = Utc::now();
        Ok(true)
    }

    /// Checkpoint the run after a successfully processed page: persist the
    /// next cursor and refresh the rate-based completion estimate.
    pub async fn update_progress(
        &self,
        video_id: &str,
        cursor: Option<String>,
        rate_per_sec: Option<f64>,
    ) {
        if let Some(entry) = self.entry(video_id).await {
            let mut e = entry.write().await;
            e.run.cursor = cursor;
            e.run.last_update = Utc::now();

            let remaining = e.run.total_expected.saturating_sub(e.run.total_analyzed);
            e.run.estimated_completion = match rate_per_sec {
                Some(rate) if rate > 0.0 && remaining > 0 => {
                    let secs = (remaining as f64 / rate).ceil() as i64;
                    Some(Utc::now() + ChronoDuration::seconds(secs))
                }
                _ => None,
            };
        }
    }

    pub async fn mark_in_progress(&self, video_id: &str) {
        if let Some(entry) = self.entry(video_id).await {
            let mut e = entry.write().await;
            if e.run.state != AnalysisState::Completed {
                e.run.state = AnalysisState::InProgress;
                e.run.last_update = Utc::now();
            }
        }
    }

    /// Terminal success: every page the source reported has been consumed,
    /// so the expected count is reconciled down to what was actually
    /// analyzable (the source counts replies we never fetch).
    pub async fn mark_completed(&self, video_id: &str) {
        if let Some(entry) = self.entry(video_id).await {
            let mut e = entry.write().await;
            e.run.state = AnalysisState::Completed;
            e.run.total_expected = e.run.total_analyzed;
            e.run.cursor = None;
            e.run.last_update = Utc::now();
            e.run.estimated_completion = None;
            e.run.last_error = None;
        }
    }

    /// Failure keeps the last successful cursor for resumption and never
    /// touches the aggregates already committed.
    pub async fn mark_failed(&self, video_id: &str, error: String) {
        if let Some(entry) = self.entry(video_id).await {
            let mut e = entry.write().await;
            if e.run.state != AnalysisState::Completed {
                e.run.state = AnalysisState::Failed;
                e.run.last_error = Some(error);
                e.run.last_update = Utc::now();
                e.run.estimated_completion = None;
            }
        }
    }

    /// Claim a failed run for resumption. Returns the cursor to resume
    /// from when the claim succeeds; None when the run is already live or
    /// completed (the caller attaches instead of spawning).
    pub async fn try_resume(&self, video_id: &str) -> Result<Option<Option<String>>> {
        let entry = self
            .entry(video_id)
            .await
            .ok_or_else(|| CoreError::NotFound(video_id.to_string()))?;
        let mut e = entry.write().await;
        if e.run.state == AnalysisState::Failed {
            e.run.state = AnalysisState::Pending;
            e.run.last_error = None;
            e.run.last_update = Utc::now();
            Ok(Some(e.run.cursor.clone()))
        } else {
            Ok(None)
        }
    }

    pub async fn snapshot(&self, video_id: &str) -> Option<VideoSnapshot> {
        let entry = self.entry(video_id).await?;
        let e = entry.read().await;
        Some(e.snapshot())
    }

    /// Snapshot plus the classified comments, taken under one read lock.
    pub async fn comments(&self, video_id: &str) -> Option<(VideoSnapshot, Vec<Comment>)> {
        let entry = self.entry(video_id).await?;
        let e = entry.read().await;
        Some((e.snapshot(), e.comments.clone()))
    }

    pub async fn list_snapshots(&self) -> Vec<VideoSnapshot> {
        let entries: Vec<_> = self.inner.read().await.values().cloned().collect();
        let mut snapshots = Vec::with_capacity(entries.len());
        for entry in entries {
            snapshots.push(entry.read().await.snapshot());
        }
        snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SentimentLabel;
    use chrono::TimeZone;

    fn meta(video_id: &str, comment_count: u64) -> VideoMetadata {
        VideoMetadata {
            video_id: video_id.to_string(),
            title: "title".to_string(),
            channel_id: "chan".to_string(),
            channel_name: "Channel".to_string(),
            thumbnail_url: "https://img".to_string(),
            view_count: 1000,
            like_count: 10,
            comment_count,
            published_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn raw(id: &str) -> RawComment {
        RawComment {
            comment_id: id.to_string(),
            author: "a".to_string(),
            text: "t".to_string(),
            like_count: 0,
            published_at: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
        }
    }

    fn positive() -> Sentiment {
        Sentiment {
            label: SentimentLabel::Positive,
            score: 0.8,
        }
    }

    #[tokio::test]
    async fn insert_is_first_writer_wins() {
        let store = VideoStore::new(HeadlineThresholds::default());
        assert!(store.insert_new(meta("v1", 5), positive()).await);
        assert!(!store.insert_new(meta("v1", 5), positive()).await);
    }

    #[tokio::test]
    async fn totals_sum_always_matches_total_analyzed() {
        let store = VideoStore::new(HeadlineThresholds::default());
        store.insert_new(meta("v1", 10), positive()).await;

        for i in 0..7 {
            store
                .record_classified("v1", raw(&format!("c{}", i)), positive())
                .await
                .unwrap();
            let snap = store.snapshot("v1").await.unwrap();
            assert_eq!(snap.aggregates.sentiment_totals.sum(), snap.run.total_analyzed);
        }
    }

    #[tokio::test]
    async fn duplicate_comments_are_recorded_once() {
        let store = VideoStore::new(HeadlineThresholds::default());
        store.insert_new(meta("v1", 10), positive()).await;

        assert!(store.record_classified("v1", raw("c1"), positive()).await.unwrap());
        assert!(!store.record_classified("v1", raw("c1"), positive()).await.unwrap());

        let snap = store.snapshot("v1").await.unwrap();
        assert_eq!(snap.run.total_analyzed, 1);
        assert_eq!(snap.aggregates.sentiment_totals.positive, 1);
    }

    #[tokio::test]
    async fn expected_total_rises_when_source_undercounts() {
        let store = VideoStore::new(HeadlineThresholds::default());
        store.insert_new(meta("v1", 1), positive()).await;

        store.record_classified("v1", raw("c1"), positive()).await.unwrap();
        store.record_classified("v1", raw("c2"), positive()).await.unwrap();

        let snap = store.snapshot("v1").await.unwrap();
        assert_eq!(snap.run.total_expected, 2);
        assert!(snap.run.total_analyzed <= snap.run.total_expected);
    }

    #[tokio::test]
    async fn completion_reconciles_expected_count() {
        let store = VideoStore::new(HeadlineThresholds::default());
        store.insert_new(meta("v1", 100), positive()).await;
        store.record_classified("v1", raw("c1"), positive()).await.unwrap();

        store.mark_completed("v1").await;
        let snap = store.snapshot("v1").await.unwrap();
        assert_eq!(snap.run.state, AnalysisState::Completed);
        assert_eq!(snap.run.total_expected, 1);
        assert!(!snap.run.has_more());
    }

    #[tokio::test]
    async fn only_failed_runs_can_be_claimed_for_resume() {
        let store = VideoStore::new(HeadlineThresholds::default());
        store.insert_new(meta("v1", 10), positive()).await;
        store.mark_in_progress("v1").await;

        assert!(store.try_resume("v1").await.unwrap().is_none());

        store.update_progress("v1", Some("tok-3".to_string()), None).await;
        store.mark_failed("v1", "boom".to_string()).await;

        let cursor = store.try_resume("v1").await.unwrap();
        assert_eq!(cursor, Some(Some("tok-3".to_string())));
        // The claim flipped the state; a second claim attaches instead.
        assert!(store.try_resume("v1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn metadata_refresh_tracks_view_trend() {
        let store = VideoStore::new(HeadlineThresholds::default());
        store.insert_new(meta("v1", 10), positive()).await;

        let mut newer = meta("v1", 12);
        newer.view_count = 1500;
        store.refresh_metadata("v1", newer).await.unwrap();

        let snap = store.snapshot("v1").await.unwrap();
        assert_eq!(snap.video.view_count, 1500);
        assert_eq!(snap.video.view_change_pct, 50.0);
        assert_eq!(snap.video.trend, "Growing");
        assert_eq!(snap.run.total_expected, 12);
    }

    #[tokio::test]
    async fn failure_preserves_committed_aggregates() {
        let store = VideoStore::new(HeadlineThresholds::default());
        store.insert_new(meta("v1", 10), positive()).await;
        store.record_classified("v1", raw("c1"), positive()).await.unwrap();

        store.mark_failed("v1", "network".to_string()).await;
        let snap = store.snapshot("v1").await.unwrap();
        assert_eq!(snap.run.state, AnalysisState::Failed);
        assert_eq!(snap.run.last_error.as_deref(), Some("network"));
        assert_eq!(snap.aggregates.sentiment_totals.sum(), 1);
        assert_eq!(snap.run.total_analyzed, 1);
    }
}
