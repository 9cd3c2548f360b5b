//! Read-only query service over store snapshots
//!
//! Filtering and sorting apply to classified comments only, and always to
//! a consistent snapshot: partial data from an in-progress or failed run
//! is served as-is rather than blocking or erroring.

use crate::aggregates::SentimentTotals;
use crate::errors::{CoreError, Result};
use crate::store::{VideoSnapshot, VideoStore};
use crate::types::{AnalysisRun, AnalysisState, Comment, SentimentLabel};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    PublishedAt,
    LikeCount,
    Sentiment,
}

impl std::str::FromStr for SortBy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "published_at" => Ok(SortBy::PublishedAt),
            "like_count" => Ok(SortBy::LikeCount),
            "sentiment" => Ok(SortBy::Sentiment),
            other => Err(CoreError::InvalidParameter(format!(
                "invalid sort_by: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl std::str::FromStr for SortOrder {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(CoreError::InvalidParameter(format!(
                "invalid sort_order: {}",
                other
            ))),
        }
    }
}

/// Filter/sort/pagination parameters for a comment listing.
#[derive(Debug, Clone)]
pub struct CommentQuery {
    pub offset: usize,
    pub limit: usize,
    pub sentiment: Option<SentimentLabel>,
    pub author: Option<String>,
    pub phrase: Option<String>,
    pub min_likes: Option<u64>,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

impl Default for CommentQuery {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 100,
            sentiment: None,
            author: None,
            phrase: None,
            min_likes: None,
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl CommentQuery {
    fn matches(&self, comment: &Comment) -> bool {
        if let Some(label) = self.sentiment {
            if comment.sentiment_label != label {
                return false;
            }
        }
        if let Some(min) = self.min_likes {
            if comment.like_count < min {
                return false;
            }
        }
        if let Some(author) = &self.author {
            if !comment
                .author
                .to_lowercase()
                .contains(&author.to_lowercase())
            {
                return false;
            }
        }
        if let Some(phrase) = &self.phrase {
            if !comment.text.to_lowercase().contains(&phrase.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

/// A page of comments plus the context the client overlays it against.
/// `sentiment_totals` always covers the full unfiltered classified set.
#[derive(Debug, Clone)]
pub struct CommentsView {
    pub video_id: String,
    pub comments: Vec<Comment>,
    pub sentiment_totals: SentimentTotals,
    pub total_available: u64,
    pub total_expected: u64,
    pub offset: usize,
    pub limit: usize,
    pub has_more: bool,
    pub analysis_state: AnalysisState,
}

/// A page of video summaries, most recently analyzed first.
#[derive(Debug, Clone)]
pub struct VideoList {
    pub videos: Vec<VideoSnapshot>,
    pub offset: usize,
    pub limit: usize,
    pub total: u64,
    pub has_more: bool,
}

/// The lightweight shape served for time-series rendering.
#[derive(Debug, Clone)]
pub struct ChartPoint {
    pub comment_id: String,
    pub published_at: DateTime<Utc>,
    pub sentiment_label: SentimentLabel,
}

pub struct QueryService {
    store: Arc<VideoStore>,
}

impl QueryService {
    pub fn new(store: Arc<VideoStore>) -> Self {
        Self { store }
    }

    /// Videos with a live or finished analysis, most recently analyzed
    /// first. Pending and failed runs stay off the list until they make
    /// progress again.
    pub async fn list_videos(&self, offset: usize, limit: usize) -> VideoList {
        let mut snapshots: Vec<VideoSnapshot> = self
            .store
            .list_snapshots()
            .await
            .into_iter()
            .filter(|s| {
                matches!(
                    s.run.state,
                    AnalysisState::InProgress | AnalysisState::Completed
                )
            })
            .collect();

        snapshots.sort_by(|a, b| {
            b.run
                .last_update
                .cmp(&a.run.last_update)
                .then_with(|| a.video.video_id.cmp(&b.video.video_id))
        });

        let total = snapshots.len() as u64;
        let videos: Vec<VideoSnapshot> = snapshots.into_iter().skip(offset).take(limit).collect();
        VideoList {
            videos,
            offset,
            limit,
            total,
            has_more: (offset + limit) < total as usize,
        }
    }

    pub async fn get_video(&self, video_id: &str) -> Result<VideoSnapshot> {
        self.store
            .snapshot(video_id)
            .await
            .ok_or_else(|| CoreError::NotFound(video_id.to_string()))
    }

    pub async fn list_comments(&self, video_id: &str, query: &CommentQuery) -> Result<CommentsView> {
        let (snapshot, comments) = self
            .store
            .comments(video_id)
            .await
            .ok_or_else(|| CoreError::NotFound(video_id.to_string()))?;

        let mut filtered: Vec<Comment> = comments
            .into_iter()
            .filter(|c| query.matches(c))
            .collect();

        filtered.sort_by(|a, b| {
            let primary = match query.sort_by {
                SortBy::PublishedAt => a.published_at.cmp(&b.published_at),
                SortBy::LikeCount => a.like_count.cmp(&b.like_count),
                SortBy::Sentiment => a
                    .sentiment_score
                    .partial_cmp(&b.sentiment_score)
                    .unwrap_or(Ordering::Equal),
            };
            let primary = match query.sort_order {
                SortOrder::Asc => primary,
                SortOrder::Desc => primary.reverse(),
            };
            primary.then_with(|| a.comment_id.cmp(&b.comment_id))
        });

        let total_available = filtered.len() as u64;
        let page: Vec<Comment> = filtered
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect();

        Ok(CommentsView {
            video_id: video_id.to_string(),
            comments: page,
            sentiment_totals: snapshot.aggregates.sentiment_totals,
            total_available,
            total_expected: snapshot.run.total_expected,
            offset: query.offset,
            limit: query.limit,
            has_more: (query.offset + query.limit) < total_available as usize,
            analysis_state: snapshot.run.state,
        })
    }

    /// Every classified comment in time-ascending order, trimmed to the
    /// fields the chart needs.
    pub async fn chart_comments(&self, video_id: &str) -> Result<Vec<ChartPoint>> {
        let (_, comments) = self
            .store
            .comments(video_id)
            .await
            .ok_or_else(|| CoreError::NotFound(video_id.to_string()))?;

        let mut points: Vec<ChartPoint> = comments
            .into_iter()
            .map(|c| ChartPoint {
                comment_id: c.comment_id,
                published_at: c.published_at,
                sentiment_label: c.sentiment_label,
            })
            .collect();
        points.sort_by(|a, b| {
            a.published_at
                .cmp(&b.published_at)
                .then_with(|| a.comment_id.cmp(&b.comment_id))
        });
        Ok(points)
    }

    pub async fn progress(&self, video_id: &str) -> Result<AnalysisRun> {
        self.store
            .snapshot(video_id)
            .await
            .map(|s| s.run)
            .ok_or_else(|| CoreError::NotFound(video_id.to_string()))
    }
}
