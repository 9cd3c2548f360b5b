//! Service configuration, environment-driven

use tubepulse_core::{AnalysisConfig, HeadlineThresholds, YouTubeConfig};

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_address: String,
    /// Origin allowed by CORS; None falls back to a permissive policy for
    /// local development.
    pub frontend_origin: Option<String>,
    pub youtube: YouTubeConfig,
    pub analysis: AnalysisConfig,
    pub thresholds: HeadlineThresholds,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            frontend_origin: None,
            youtube: YouTubeConfig::default(),
            analysis: AnalysisConfig::default(),
            thresholds: HeadlineThresholds::default(),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(addr) = std::env::var("BIND_ADDRESS") {
            config.bind_address = addr;
        }
        if let Ok(origin) = std::env::var("FRONTEND_ORIGIN") {
            config.frontend_origin = Some(origin);
        }
        config.youtube = YouTubeConfig::from_env();
        config
    }
}
