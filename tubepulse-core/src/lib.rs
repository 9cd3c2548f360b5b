//! TubePulse: YouTube comment sentiment aggregation core
//!
//! Ingests a video's comments in the background, classifies each one, and
//! keeps per-video rollups (sentiment totals, engagement, controversiality,
//! headline) that stay consistent while analysis is still running. Queries
//! are served from consistent snapshots with partial-completion semantics.

pub mod aggregates;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod errors;
pub mod metrics;
pub mod query;
pub mod source;
pub mod store;
pub mod types;

// Re-exports
pub use aggregates::{EngagementStats, SentimentTotals, VideoAggregates};
pub use classifier::{LexiconClassifier, SentimentClassifier};
pub use config::{AnalysisConfig, HeadlineThresholds, YouTubeConfig};
pub use engine::AnalysisEngine;
pub use errors::{CoreError, Result};
pub use metrics::extract_video_id;
pub use query::{
    ChartPoint, CommentQuery, CommentsView, QueryService, SortBy, SortOrder, VideoList,
};
pub use source::{CommentSource, YouTubeSource};
pub use store::{VideoSnapshot, VideoStore};
pub use types::{
    AnalysisRun, AnalysisState, Comment, CommentPage, EngagementLevel, RawComment, Sentiment,
    SentimentHeadline, SentimentLabel, Video, VideoMetadata,
};

use std::sync::Arc;

/// Wires the store, engine and query service together over a source and
/// classifier. The HTTP layer holds one of these per process.
pub struct TubePulse {
    pub store: Arc<VideoStore>,
    pub engine: Arc<AnalysisEngine>,
    pub query: Arc<QueryService>,
}

impl TubePulse {
    pub fn new(
        source: Arc<dyn CommentSource>,
        classifier: Arc<dyn SentimentClassifier>,
        config: AnalysisConfig,
        thresholds: HeadlineThresholds,
    ) -> Self {
        let store = Arc::new(VideoStore::new(thresholds));
        let engine = Arc::new(AnalysisEngine::new(
            store.clone(),
            source,
            classifier,
            config,
        ));
        let query = Arc::new(QueryService::new(store.clone()));
        Self {
            store,
            engine,
            query,
        }
    }
}
