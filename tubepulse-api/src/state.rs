//! Shared application state wired into every handler

use crate::config::ApiConfig;
use crate::metrics::ServiceMetrics;
use std::sync::Arc;
use tubepulse_core::{
    AnalysisConfig, AnalysisEngine, CommentSource, HeadlineThresholds, LexiconClassifier,
    QueryService, TubePulse, VideoStore, YouTubeSource,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<VideoStore>,
    pub engine: Arc<AnalysisEngine>,
    pub query: Arc<QueryService>,
    pub metrics: Arc<ServiceMetrics>,
}

impl AppState {
    /// Production wiring: YouTube source + the built-in classifier.
    pub fn from_config(config: &ApiConfig) -> tubepulse_core::Result<Self> {
        let source = Arc::new(YouTubeSource::new(config.youtube.clone())?);
        Ok(Self::with_source(
            source,
            config.analysis.clone(),
            config.thresholds.clone(),
        ))
    }

    /// Wiring point for tests: any source implementation will do.
    pub fn with_source(
        source: Arc<dyn CommentSource>,
        analysis: AnalysisConfig,
        thresholds: HeadlineThresholds,
    ) -> Self {
        let core = TubePulse::new(
            source,
            Arc::new(LexiconClassifier::new()),
            analysis,
            thresholds,
        );
        // Registration only fails on duplicate metric names, which would
        // be a programming error.
        let metrics = Arc::new(ServiceMetrics::new().expect("metrics registry"));
        Self {
            store: core.store,
            engine: core.engine,
            query: core.query,
            metrics,
        }
    }
}
