//! Domain types shared across the analysis pipeline

use crate::errors::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sentiment classification of a single piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
    Ambiguous,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 4] = [
        SentimentLabel::Positive,
        SentimentLabel::Neutral,
        SentimentLabel::Negative,
        SentimentLabel::Ambiguous,
    ];
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "positive"),
            SentimentLabel::Neutral => write!(f, "neutral"),
            SentimentLabel::Negative => write!(f, "negative"),
            SentimentLabel::Ambiguous => write!(f, "ambiguous"),
        }
    }
}

impl std::str::FromStr for SentimentLabel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(SentimentLabel::Positive),
            "neutral" => Ok(SentimentLabel::Neutral),
            "negative" => Ok(SentimentLabel::Negative),
            "ambiguous" => Ok(SentimentLabel::Ambiguous),
            other => Err(CoreError::InvalidParameter(format!(
                "invalid sentiment label: {}",
                other
            ))),
        }
    }
}

/// Lifecycle state of a video's analysis run.
///
/// Transitions are monotonic (pending -> in_progress -> completed) except
/// that `failed` can be entered from any non-terminal state and left again
/// through an explicit resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisState {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl AnalysisState {
    pub fn is_terminal(self) -> bool {
        matches!(self, AnalysisState::Completed)
    }
}

impl std::fmt::Display for AnalysisState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisState::Pending => write!(f, "pending"),
            AnalysisState::InProgress => write!(f, "in_progress"),
            AnalysisState::Completed => write!(f, "completed"),
            AnalysisState::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for AnalysisState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AnalysisState::Pending),
            "in_progress" => Ok(AnalysisState::InProgress),
            "completed" => Ok(AnalysisState::Completed),
            "failed" => Ok(AnalysisState::Failed),
            other => Err(CoreError::InvalidParameter(format!(
                "invalid analysis state: {}",
                other
            ))),
        }
    }
}

/// Engagement tier derived from the engagement rate via fixed thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementLevel {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for EngagementLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngagementLevel::High => write!(f, "high"),
            EngagementLevel::Medium => write!(f, "medium"),
            EngagementLevel::Low => write!(f, "low"),
        }
    }
}

/// Coarse one-word summary combining sentiment distribution with
/// engagement and volume signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentHeadline {
    Positive,
    Neutral,
    Negative,
    Controversial,
    Viral,
    Boring,
}

impl std::fmt::Display for SentimentHeadline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SentimentHeadline::Positive => write!(f, "positive"),
            SentimentHeadline::Neutral => write!(f, "neutral"),
            SentimentHeadline::Negative => write!(f, "negative"),
            SentimentHeadline::Controversial => write!(f, "controversial"),
            SentimentHeadline::Viral => write!(f, "viral"),
            SentimentHeadline::Boring => write!(f, "boring"),
        }
    }
}

/// Output of a classifier call: label plus a signed score in [-1, 1]
/// (negative values lean negative, magnitude is strength of evidence).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub score: f64,
}

impl Sentiment {
    /// Sentinel value recorded when the classifier itself errors on a
    /// comment: low-confidence ambiguous, score 0.
    pub fn ambiguous_sentinel() -> Self {
        Sentiment {
            label: SentimentLabel::Ambiguous,
            score: 0.0,
        }
    }
}

/// Video metadata as returned by the source platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub video_id: String,
    pub title: String,
    pub channel_id: String,
    pub channel_name: String,
    pub thumbnail_url: String,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub published_at: DateTime<Utc>,
}

/// A tracked video. Created on first analysis request, counts refreshed
/// on subsequent requests, never deleted.
#[derive(Debug, Clone)]
pub struct Video {
    pub video_id: String,
    pub title: String,
    pub channel_id: String,
    pub channel_name: String,
    pub thumbnail_url: String,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub published_at: DateTime<Utc>,
    /// Percent change in view count since the previous metadata refresh.
    pub view_change_pct: f64,
    pub trend: String,
    pub trend_explanation: String,
    /// Sentiment of the video title itself, shown alongside the rollups.
    pub title_sentiment: Sentiment,
    pub fetched_at: DateTime<Utc>,
}

/// An unclassified comment as delivered by the source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawComment {
    pub comment_id: String,
    pub author: String,
    pub text: String,
    pub like_count: u64,
    pub published_at: DateTime<Utc>,
}

/// A fully classified comment. Comments are only stored once classified;
/// there is no externally visible partial state.
#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub comment_id: String,
    pub author: String,
    pub text: String,
    pub like_count: u64,
    pub published_at: DateTime<Utc>,
    pub sentiment_label: SentimentLabel,
    pub sentiment_score: f64,
}

/// One page of comments from the source, with the cursor for the next
/// page (None when the source has no more pages).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentPage {
    pub comments: Vec<RawComment>,
    pub next_cursor: Option<String>,
}

/// Ingestion/classification progress for one video.
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub run_id: Uuid,
    pub video_id: String,
    pub state: AnalysisState,
    pub total_analyzed: u64,
    /// Best-known total comment count from the source. Raised to
    /// `total_analyzed` if the source undercounts; reconciled downward on
    /// completion (the source count includes replies we never fetch).
    pub total_expected: u64,
    /// Resume position: the next page to fetch. Only meaningful while the
    /// run is not completed.
    pub cursor: Option<String>,
    pub started_at: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
    pub estimated_completion: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl AnalysisRun {
    pub fn new(video_id: &str, total_expected: u64) -> Self {
        let now = Utc::now();
        AnalysisRun {
            run_id: Uuid::new_v4(),
            video_id: video_id.to_string(),
            state: AnalysisState::Pending,
            total_analyzed: 0,
            total_expected,
            cursor: None,
            started_at: now,
            last_update: now,
            estimated_completion: None,
            last_error: None,
        }
    }

    /// True while more comments are expected than have been analyzed.
    pub fn has_more(&self) -> bool {
        self.state != AnalysisState::Completed && self.total_analyzed < self.total_expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn sentiment_label_round_trips_through_strings() {
        for label in SentimentLabel::ALL {
            assert_eq!(SentimentLabel::from_str(&label.to_string()).unwrap(), label);
        }
        assert!(SentimentLabel::from_str("enthusiastic").is_err());
    }

    #[test]
    fn analysis_state_parses_wire_names() {
        assert_eq!(
            AnalysisState::from_str("in_progress").unwrap(),
            AnalysisState::InProgress
        );
        assert!(AnalysisState::from_str("running").is_err());
    }

    #[test]
    fn fresh_run_expects_more_work() {
        let run = AnalysisRun::new("abc", 10);
        assert_eq!(run.state, AnalysisState::Pending);
        assert!(run.has_more());
    }
}
