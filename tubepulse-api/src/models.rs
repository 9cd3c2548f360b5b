//! Request/response models for the HTTP surface
//!
//! Enum-valued fields are serialized as their snake_case wire names, the
//! shapes the polling frontend already consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tubepulse_core::{
    AnalysisRun, Comment, CommentsView, SentimentTotals, VideoList, VideoSnapshot,
};
use utoipa::{IntoParams, ToSchema};

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema)]
pub struct SentimentTotalsDto {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
    pub ambiguous: u64,
}

impl From<SentimentTotals> for SentimentTotalsDto {
    fn from(t: SentimentTotals) -> Self {
        Self {
            positive: t.positive,
            neutral: t.neutral,
            negative: t.negative,
            ambiguous: t.ambiguous,
        }
    }
}

/// Full metadata + current aggregates + analysis state for one video.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VideoResponse {
    pub id: String,
    pub title: String,
    pub channel_id: String,
    pub channel_name: String,
    pub thumbnail_url: String,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub published_at: DateTime<Utc>,

    pub view_change_pct: f64,
    pub sentiment_label: String,
    pub sentiment_positive_pct: f64,
    pub engagement_level: String,
    pub engagement_pct: f64,
    pub trend: String,
    pub trend_explanation: String,

    pub sentiment_totals: SentimentTotalsDto,
    pub controversiality_score: f64,
    pub sentiment_headline: String,

    pub analysis_state: String,
    pub total_analyzed: u64,
    pub fetched_at: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
}

impl VideoResponse {
    pub fn from_snapshot(snapshot: &VideoSnapshot) -> Self {
        let video = &snapshot.video;
        let run = &snapshot.run;
        let aggregates = &snapshot.aggregates;
        Self {
            id: video.video_id.clone(),
            title: video.title.clone(),
            channel_id: video.channel_id.clone(),
            channel_name: video.channel_name.clone(),
            thumbnail_url: video.thumbnail_url.clone(),
            view_count: video.view_count,
            like_count: video.like_count,
            comment_count: video.comment_count,
            published_at: video.published_at,
            view_change_pct: video.view_change_pct,
            sentiment_label: video.title_sentiment.label.to_string(),
            // Signed score mapped onto the 0-100 display scale.
            sentiment_positive_pct: round1((video.title_sentiment.score + 1.0) / 2.0 * 100.0),
            engagement_level: aggregates.engagement_label.to_string(),
            engagement_pct: aggregates.engagement_rate,
            trend: video.trend.clone(),
            trend_explanation: video.trend_explanation.clone(),
            sentiment_totals: aggregates.sentiment_totals.into(),
            controversiality_score: aggregates.controversiality_score,
            sentiment_headline: aggregates.sentiment_headline.to_string(),
            analysis_state: run.state.to_string(),
            total_analyzed: run.total_analyzed,
            fetched_at: video.fetched_at,
            last_update: run.last_update,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnalyzedVideoSummary {
    pub video_id: String,
    pub title: String,
    pub channel_name: String,
    pub thumbnail_url: String,
    pub published_at: DateTime<Utc>,
    pub view_count: u64,
    pub comment_count: u64,
    pub total_analyzed: u64,
    pub analysis_state: String,
    pub sentiment_totals: SentimentTotalsDto,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnalyzedVideoList {
    pub videos: Vec<AnalyzedVideoSummary>,
    pub offset: usize,
    pub limit: usize,
    pub total: u64,
    pub has_more: bool,
}

impl AnalyzedVideoList {
    pub fn from_list(list: &VideoList) -> Self {
        Self {
            videos: list
                .videos
                .iter()
                .map(|s| AnalyzedVideoSummary {
                    video_id: s.video.video_id.clone(),
                    title: s.video.title.clone(),
                    channel_name: s.video.channel_name.clone(),
                    thumbnail_url: s.video.thumbnail_url.clone(),
                    published_at: s.video.published_at,
                    view_count: s.video.view_count,
                    comment_count: s.video.comment_count,
                    total_analyzed: s.run.total_analyzed,
                    analysis_state: s.run.state.to_string(),
                    sentiment_totals: s.aggregates.sentiment_totals.into(),
                })
                .collect(),
            offset: list.offset,
            limit: list.limit,
            total: list.total,
            has_more: list.has_more,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CommentDto {
    pub comment_id: String,
    pub text: String,
    pub author: String,
    pub sentiment_label: String,
    pub sentiment_score: f64,
    pub like_count: u64,
    pub published_at: DateTime<Utc>,
}

impl From<&Comment> for CommentDto {
    fn from(c: &Comment) -> Self {
        Self {
            comment_id: c.comment_id.clone(),
            text: c.text.clone(),
            author: c.author.clone(),
            sentiment_label: c.sentiment_label.to_string(),
            sentiment_score: c.sentiment_score,
            like_count: c.like_count,
            published_at: c.published_at,
        }
    }
}

/// A filtered page of comments overlaid against the video's unfiltered
/// sentiment totals and live analysis state.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CommentsResponse {
    pub video_id: String,
    pub comments: Vec<CommentDto>,
    pub sentiment_totals: SentimentTotalsDto,
    pub total_available: u64,
    pub total_expected: u64,
    pub offset: usize,
    pub limit: usize,
    pub has_more: bool,
    pub analysis_state: String,
}

impl CommentsResponse {
    pub fn from_view(view: &CommentsView) -> Self {
        Self {
            video_id: view.video_id.clone(),
            comments: view.comments.iter().map(CommentDto::from).collect(),
            sentiment_totals: view.sentiment_totals.into(),
            total_available: view.total_available,
            total_expected: view.total_expected,
            offset: view.offset,
            limit: view.limit,
            has_more: view.has_more,
            analysis_state: view.analysis_state.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChartComment {
    pub comment_id: String,
    pub published_at: DateTime<Utc>,
    pub sentiment_label: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChartCommentsResponse {
    pub video_id: String,
    pub comments: Vec<ChartComment>,
}

/// Snapshot of a run's progress, polled by the client while it waits.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnalysisProgress {
    pub video_id: String,
    pub state: String,
    pub total_analyzed: u64,
    pub total_expected: u64,
    pub last_update: DateTime<Utc>,
    pub estimated_completion: Option<DateTime<Utc>>,
    pub has_more: bool,
}

impl From<&AnalysisRun> for AnalysisProgress {
    fn from(run: &AnalysisRun) -> Self {
        Self {
            video_id: run.video_id.clone(),
            state: run.state.to_string(),
            total_analyzed: run.total_analyzed,
            total_expected: run.total_expected,
            last_update: run.last_update,
            estimated_completion: run.estimated_completion,
            has_more: run.has_more(),
        }
    }
}

// Query parameter models

#[derive(Debug, Deserialize, IntoParams)]
pub struct VideosQuery {
    /// Video URL to trigger-or-fetch; omit to list analyzed videos.
    pub url: Option<String>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CommentsQueryParams {
    pub url: String,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
    pub sentiment: Option<String>,
    pub author: Option<String>,
    pub phrase: Option<String>,
    pub min_likes: Option<u64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct UrlQuery {
    pub url: String,
}
