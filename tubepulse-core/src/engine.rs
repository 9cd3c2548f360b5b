//! Analysis state machine
//!
//! One background ingestion task per video walks the source's comment
//! pages in cursor order, classifies each comment and records it through
//! the store. Requests never wait for a run to finish; they observe
//! whatever progress exists. Classification order is the source's stable
//! cursor order, independent of any display sort, which makes a failed
//! run resumable from its checkpoint without gaps or duplicates.

use crate::classifier::SentimentClassifier;
use crate::config::AnalysisConfig;
use crate::errors::{CoreError, Result};
use crate::source::CommentSource;
use crate::store::{VideoSnapshot, VideoStore};
use crate::types::{CommentPage, Sentiment};
use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::sleep;
use tracing::{debug, info, warn};

pub struct AnalysisEngine {
    store: Arc<VideoStore>,
    source: Arc<dyn CommentSource>,
    classifier: Arc<dyn SentimentClassifier>,
    config: AnalysisConfig,
}

impl AnalysisEngine {
    pub fn new(
        store: Arc<VideoStore>,
        source: Arc<dyn CommentSource>,
        classifier: Arc<dyn SentimentClassifier>,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            store,
            source,
            classifier,
            config,
        }
    }

    /// Trigger-or-attach: create the video and start ingestion on first
    /// sight, otherwise refresh its counts and return current progress.
    /// Idempotent — concurrent callers for the same unanalyzed video end
    /// up with exactly one ingestion task.
    pub async fn request_analysis(&self, video_id: &str) -> Result<VideoSnapshot> {
        if self.store.contains(video_id).await {
            match self.source.fetch_video_metadata(video_id).await {
                Ok(meta) => {
                    self.store.refresh_metadata(video_id, meta).await?;
                }
                Err(e) => {
                    debug!(video_id, error = %e, "metadata refresh failed, serving stored counts");
                }
            }
            return self.snapshot(video_id).await;
        }

        let meta = self.source.fetch_video_metadata(video_id).await?;
        let title_sentiment = self
            .classifier
            .classify(&meta.title)
            .unwrap_or_else(|e| {
                warn!(video_id, error = %e, "title classification failed");
                Sentiment::ambiguous_sentinel()
            });

        // First writer wins; a concurrent request that lost the race
        // attaches to the entry the winner created.
        if self.store.insert_new(meta, title_sentiment).await {
            self.spawn_ingestion(video_id.to_string(), None);
        }
        self.snapshot(video_id).await
    }

    /// Resume a failed run from its last checkpoint. Live and completed
    /// runs are returned as-is; unknown videos are an error.
    pub async fn continue_analysis(&self, video_id: &str) -> Result<VideoSnapshot> {
        if let Some(cursor) = self.store.try_resume(video_id).await? {
            info!(video_id, ?cursor, "resuming failed analysis run");
            self.spawn_ingestion(video_id.to_string(), cursor);
        }
        self.snapshot(video_id).await
    }

    async fn snapshot(&self, video_id: &str) -> Result<VideoSnapshot> {
        self.store
            .snapshot(video_id)
            .await
            .ok_or_else(|| CoreError::NotFound(video_id.to_string()))
    }

    fn spawn_ingestion(&self, video_id: String, cursor: Option<String>) {
        let store = self.store.clone();
        let source = self.source.clone();
        let classifier = self.classifier.clone();
        let config = self.config.clone();
        tokio::spawn(async move {
            run_ingestion(store, source, classifier, config, video_id, cursor).await;
        });
    }
}

async fn run_ingestion(
    store: Arc<VideoStore>,
    source: Arc<dyn CommentSource>,
    classifier: Arc<dyn SentimentClassifier>,
    config: AnalysisConfig,
    video_id: String,
    mut cursor: Option<String>,
) {
    info!(video_id = %video_id, "starting comment analysis");
    store.mark_in_progress(&video_id).await;

    let started = Instant::now();
    let mut analyzed_in_task: u64 = 0;

    loop {
        if !config.page_delay.is_zero() {
            sleep(config.page_delay).await;
        }

        let page =
            match fetch_page_with_retry(source.as_ref(), &config, &video_id, cursor.as_deref())
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    warn!(video_id = %video_id, error = %e, "comment ingestion failed");
                    store.mark_failed(&video_id, e.to_string()).await;
                    return;
                }
            };

        for raw in page.comments {
            let sentiment = match classifier.classify(&raw.text) {
                Ok(s) => s,
                Err(e) => {
                    warn!(
                        video_id = %video_id,
                        comment_id = %raw.comment_id,
                        error = %e,
                        "classifier failed, recording as ambiguous"
                    );
                    Sentiment::ambiguous_sentinel()
                }
            };
            match store.record_classified(&video_id, raw, sentiment).await {
                Ok(true) => analyzed_in_task += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(video_id = %video_id, error = %e, "failed to record comment");
                }
            }
        }

        cursor = page.next_cursor;
        let elapsed = started.elapsed().as_secs_f64();
        let rate = if elapsed > 0.0 && analyzed_in_task > 0 {
            Some(analyzed_in_task as f64 / elapsed)
        } else {
            None
        };
        store.update_progress(&video_id, cursor.clone(), rate).await;

        if cursor.is_none() {
            break;
        }
    }

    store.mark_completed(&video_id).await;
    info!(video_id = %video_id, analyzed = analyzed_in_task, "completed comment analysis");
}

/// Fetch one page, retrying transient source errors with exponential
/// backoff up to the configured attempt bound. Permanent errors and
/// exhausted retries propagate and fail the run.
async fn fetch_page_with_retry(
    source: &dyn CommentSource,
    config: &AnalysisConfig,
    video_id: &str,
    cursor: Option<&str>,
) -> Result<CommentPage> {
    let mut policy = ExponentialBackoff {
        initial_interval: config.initial_backoff,
        max_interval: config.max_backoff,
        max_elapsed_time: None,
        ..ExponentialBackoff::default()
    };

    let mut attempt = 0;
    loop {
        attempt += 1;
        match source.fetch_comment_page(video_id, cursor).await {
            Ok(page) => return Ok(page),
            Err(e) if e.is_transient() && attempt < config.max_fetch_attempts => {
                let delay = policy.next_backoff().unwrap_or(config.max_backoff);
                warn!(
                    video_id,
                    attempt,
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "transient source error, backing off"
                );
                sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
