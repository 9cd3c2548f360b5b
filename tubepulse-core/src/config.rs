//! Configuration for the analysis pipeline
//!
//! Headline and engagement cutoffs are policy, not contract: they are
//! plain config values with defaults matching the shipped behavior.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning for the background ingestion loop.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Comments requested per source page.
    pub page_size: u32,
    /// Attempts per page before the run is marked failed.
    pub max_fetch_attempts: u32,
    /// First retry delay; doubles per attempt up to `max_backoff`.
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// Pause between pages so we stay inside the source's rate limits.
    pub page_delay: Duration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            max_fetch_attempts: 4,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            page_delay: Duration::from_secs(1),
        }
    }
}

impl AnalysisConfig {
    /// Config suitable for tests: no inter-page delay, fast retries.
    pub fn fast() -> Self {
        Self {
            page_delay: Duration::ZERO,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
            ..Self::default()
        }
    }
}

/// Thresholds feeding the engagement label and sentiment headline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlineThresholds {
    /// Controversiality above which a video is headlined "controversial",
    /// provided both polarities are genuinely represented.
    pub controversial_min: f64,
    /// Minimum share each polarity needs for the controversial headline.
    pub contested_ratio_min: f64,
    /// Engagement rate (percent) above which a positively received video
    /// is headlined "viral".
    pub viral_engagement_min: f64,
    /// Engagement rate below which a video is headlined "boring".
    pub boring_engagement_max: f64,
    /// Engagement rate cutoffs for the high/medium/low label.
    pub high_engagement_min: f64,
    pub medium_engagement_min: f64,
}

impl Default for HeadlineThresholds {
    fn default() -> Self {
        Self {
            // A 60/30 split scores 0.667 and should still read as a
            // moderate majority; even splits score 1.0 and trip this.
            controversial_min: 0.7,
            contested_ratio_min: 0.2,
            viral_engagement_min: 3.0,
            boring_engagement_max: 0.5,
            high_engagement_min: 3.0,
            medium_engagement_min: 0.5,
        }
    }
}

/// Connection settings for the YouTube Data API.
#[derive(Debug, Clone)]
pub struct YouTubeConfig {
    /// Base URL, overridable so tests can point at a local mock server.
    pub api_base: String,
    pub api_key: String,
    pub page_size: u32,
    pub timeout: Duration,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_base: "https://www.googleapis.com/youtube/v3".to_string(),
            api_key: String::new(),
            page_size: 100,
            timeout: Duration::from_secs(30),
        }
    }
}

impl YouTubeConfig {
    /// Read the API key (and optional base override) from the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(key) = std::env::var("YOUTUBE_API_KEY") {
            config.api_key = key;
        }
        if let Ok(base) = std::env::var("YOUTUBE_API_BASE") {
            config.api_base = base;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds_are_ordered_sanely() {
        let t = HeadlineThresholds::default();
        assert!(t.medium_engagement_min < t.high_engagement_min);
        assert!(t.boring_engagement_max <= t.medium_engagement_min);
        assert!(t.boring_engagement_max < t.viral_engagement_min);
    }

    #[test]
    fn fast_config_disables_page_delay() {
        assert!(AnalysisConfig::fast().page_delay.is_zero());
    }
}
