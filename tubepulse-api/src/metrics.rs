//! Prometheus metrics for the service
//!
//! A small registry: request counters bumped by the handlers and gauges
//! refreshed from store state when the endpoint is scraped.

use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use std::time::Instant;

pub struct ServiceMetrics {
    registry: Registry,
    analysis_requests: IntCounter,
    comment_queries: IntCounter,
    resumed_runs: IntCounter,
    videos_tracked: IntGauge,
    comments_classified: IntGauge,
    started_at: Instant,
}

impl ServiceMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let analysis_requests = IntCounter::new(
            "tubepulse_analysis_requests_total",
            "Analysis trigger-or-fetch requests served",
        )?;
        let comment_queries = IntCounter::new(
            "tubepulse_comment_queries_total",
            "Comment listing requests served",
        )?;
        let resumed_runs = IntCounter::new(
            "tubepulse_resumed_runs_total",
            "Failed runs explicitly resumed",
        )?;
        let videos_tracked =
            IntGauge::new("tubepulse_videos_tracked", "Videos known to the store")?;
        let comments_classified = IntGauge::new(
            "tubepulse_comments_classified",
            "Classified comments across all videos",
        )?;

        registry.register(Box::new(analysis_requests.clone()))?;
        registry.register(Box::new(comment_queries.clone()))?;
        registry.register(Box::new(resumed_runs.clone()))?;
        registry.register(Box::new(videos_tracked.clone()))?;
        registry.register(Box::new(comments_classified.clone()))?;

        Ok(Self {
            registry,
            analysis_requests,
            comment_queries,
            resumed_runs,
            videos_tracked,
            comments_classified,
            started_at: Instant::now(),
        })
    }

    pub fn record_analysis_request(&self) {
        self.analysis_requests.inc();
    }

    pub fn record_comment_query(&self) {
        self.comment_queries.inc();
    }

    pub fn record_resume(&self) {
        self.resumed_runs.inc();
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn render(&self, videos_tracked: i64, comments_classified: i64) -> prometheus::Result<String> {
        self.videos_tracked.set(videos_tracked);
        self.comments_classified.set(comments_classified);

        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_rendered_output() {
        let metrics = ServiceMetrics::new().unwrap();
        metrics.record_analysis_request();
        metrics.record_comment_query();
        metrics.record_comment_query();

        let text = metrics.render(3, 42).unwrap();
        assert!(text.contains("tubepulse_analysis_requests_total 1"));
        assert!(text.contains("tubepulse_comment_queries_total 2"));
        assert!(text.contains("tubepulse_videos_tracked 3"));
        assert!(text.contains("tubepulse_comments_classified 42"));
    }
}
