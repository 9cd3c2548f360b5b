//! Source fetcher: raw video metadata and comment pages
//!
//! The engine consumes sources through [`CommentSource`]; the production
//! implementation talks to the YouTube Data API v3. Pages are keyed by the
//! API's opaque `nextPageToken`, which is stable across retries, so the
//! engine can resume a failed run from its last checkpoint. Delivery is
//! at-least-once; the store dedupes by comment id.

use crate::config::YouTubeConfig;
use crate::errors::{CoreError, Result};
use crate::types::{CommentPage, RawComment, VideoMetadata};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

#[async_trait]
pub trait CommentSource: Send + Sync {
    async fn fetch_video_metadata(&self, video_id: &str) -> Result<VideoMetadata>;

    /// Fetch one page of top-level comments. `cursor == None` means the
    /// first page; must be idempotent per cursor.
    async fn fetch_comment_page(
        &self,
        video_id: &str,
        cursor: Option<&str>,
    ) -> Result<CommentPage>;
}

/// YouTube Data API v3 client.
pub struct YouTubeSource {
    client: Client,
    config: YouTubeConfig,
}

impl YouTubeSource {
    pub fn new(config: YouTubeConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn map_status(status: StatusCode, context: &str, body: String) -> CoreError {
        if status == StatusCode::NOT_FOUND {
            CoreError::NotFound(context.to_string())
        } else if status.is_server_error()
            || status == StatusCode::TOO_MANY_REQUESTS
            || status == StatusCode::FORBIDDEN
        {
            // Quota exhaustion surfaces as 403; treat it like any other
            // transient outage and let the retry policy decide.
            CoreError::SourceUnavailable(format!("{}: API error {}: {}", context, status, body))
        } else {
            CoreError::Other(format!("{}: API error {}: {}", context, status, body))
        }
    }
}

#[async_trait]
impl CommentSource for YouTubeSource {
    async fn fetch_video_metadata(&self, video_id: &str) -> Result<VideoMetadata> {
        debug!(video_id, "fetching video metadata");
        let url = format!("{}/videos", self.config.api_base);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("part", "snippet,statistics"),
                ("id", video_id),
                ("key", self.config.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| CoreError::SourceUnavailable(format!("videos.list: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_status(status, "videos.list", body));
        }

        let body: VideoListResponse = response
            .json()
            .await
            .map_err(|e| CoreError::Other(format!("videos.list: malformed response: {}", e)))?;

        let item = body
            .items
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::NotFound(video_id.to_string()))?;

        let thumbnail_url = item
            .snippet
            .thumbnails
            .high
            .or(item.snippet.thumbnails.default_res)
            .map(|t| t.url)
            .unwrap_or_default();

        Ok(VideoMetadata {
            video_id: video_id.to_string(),
            title: item.snippet.title,
            channel_id: item.snippet.channel_id,
            channel_name: item.snippet.channel_title,
            thumbnail_url,
            view_count: parse_count(item.statistics.view_count),
            like_count: parse_count(item.statistics.like_count),
            comment_count: parse_count(item.statistics.comment_count),
            published_at: item.snippet.published_at,
        })
    }

    async fn fetch_comment_page(
        &self,
        video_id: &str,
        cursor: Option<&str>,
    ) -> Result<CommentPage> {
        debug!(video_id, ?cursor, "fetching comment page");
        let url = format!("{}/commentThreads", self.config.api_base);
        let page_size = self.config.page_size.to_string();
        let mut query = vec![
            ("part", "snippet".to_string()),
            ("videoId", video_id.to_string()),
            ("maxResults", page_size),
            ("textFormat", "plainText".to_string()),
            ("key", self.config.api_key.clone()),
        ];
        if let Some(token) = cursor {
            query.push(("pageToken", token.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| CoreError::SourceUnavailable(format!("commentThreads.list: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_status(status, "commentThreads.list", body));
        }

        let body: ThreadListResponse = response.json().await.map_err(|e| {
            CoreError::Other(format!("commentThreads.list: malformed response: {}", e))
        })?;

        let comments = body
            .items
            .into_iter()
            .map(|thread| {
                let top = thread.snippet.top_level_comment;
                RawComment {
                    comment_id: top.id,
                    author: top.snippet.author_display_name,
                    text: top.snippet.text_display,
                    like_count: top.snippet.like_count,
                    published_at: top.snippet.published_at,
                }
            })
            .collect();

        Ok(CommentPage {
            comments,
            next_cursor: body.next_page_token,
        })
    }
}

/// The API reports statistics counts as decimal strings.
fn parse_count(raw: Option<String>) -> u64 {
    raw.and_then(|s| s.parse().ok()).unwrap_or(0)
}

#[derive(Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Deserialize)]
struct VideoItem {
    snippet: VideoSnippet,
    #[serde(default)]
    statistics: VideoStatistics,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: String,
    channel_id: String,
    channel_title: String,
    published_at: DateTime<Utc>,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Deserialize, Default)]
struct Thumbnails {
    #[serde(default)]
    high: Option<Thumbnail>,
    #[serde(default, rename = "default")]
    default_res: Option<Thumbnail>,
}

#[derive(Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    #[serde(default)]
    view_count: Option<String>,
    #[serde(default)]
    like_count: Option<String>,
    #[serde(default)]
    comment_count: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadListResponse {
    #[serde(default)]
    items: Vec<Thread>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct Thread {
    snippet: ThreadSnippet,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadSnippet {
    top_level_comment: TopLevelComment,
}

#[derive(Deserialize)]
struct TopLevelComment {
    id: String,
    snippet: CommentSnippet,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    #[serde(default)]
    text_display: String,
    #[serde(default)]
    author_display_name: String,
    #[serde(default)]
    like_count: u64,
    published_at: DateTime<Utc>,
}
