use actix_web::{http::StatusCode, test};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::Arc;
use tubepulse_api::api::create_app;
use tubepulse_api::models::{
    AnalysisProgress, AnalyzedVideoList, ChartCommentsResponse, CommentsResponse, VideoResponse,
};
use tubepulse_api::state::AppState;
use tubepulse_core::{
    AnalysisConfig, CommentPage, CommentSource, CoreError, HeadlineThresholds, RawComment,
    VideoMetadata,
};

const VIDEO_ID: &str = "abc123def45";
const VIDEO_URL: &str = "https://www.youtube.com/watch?v=abc123def45";

/// In-memory source serving a fixed comment set in two pages.
struct FixtureSource;

fn fixture_comments() -> Vec<Vec<RawComment>> {
    let at = |minute: u32| Utc.with_ymd_and_hms(2024, 2, 1, 10, minute, 0).unwrap();
    vec![
        vec![
            RawComment {
                comment_id: "c1".to_string(),
                author: "alice".to_string(),
                text: "amazing video, loved every minute".to_string(),
                like_count: 12,
                published_at: at(0),
            },
            RawComment {
                comment_id: "c2".to_string(),
                author: "bob".to_string(),
                text: "terrible clickbait".to_string(),
                like_count: 15,
                published_at: at(1),
            },
            RawComment {
                comment_id: "c3".to_string(),
                author: "carol".to_string(),
                text: "watching this during lunch".to_string(),
                like_count: 2,
                published_at: at(2),
            },
        ],
        vec![
            RawComment {
                comment_id: "c4".to_string(),
                author: "dave".to_string(),
                text: "great explanation, thanks".to_string(),
                like_count: 7,
                published_at: at(3),
            },
            RawComment {
                comment_id: "c5".to_string(),
                author: "erin".to_string(),
                text: "this was awful".to_string(),
                like_count: 3,
                published_at: at(4),
            },
        ],
    ]
}

#[async_trait]
impl CommentSource for FixtureSource {
    async fn fetch_video_metadata(&self, video_id: &str) -> tubepulse_core::Result<VideoMetadata> {
        if video_id != VIDEO_ID {
            return Err(CoreError::NotFound(video_id.to_string()));
        }
        Ok(VideoMetadata {
            video_id: video_id.to_string(),
            title: "A wonderful documentary".to_string(),
            channel_id: "chan-1".to_string(),
            channel_name: "Docs Channel".to_string(),
            thumbnail_url: "https://img.example/hq.jpg".to_string(),
            view_count: 10_000,
            like_count: 150,
            comment_count: 5,
            published_at: Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
        })
    }

    async fn fetch_comment_page(
        &self,
        _video_id: &str,
        cursor: Option<&str>,
    ) -> tubepulse_core::Result<CommentPage> {
        let pages = fixture_comments();
        let index: usize = match cursor {
            None => 0,
            Some(token) => token.trim_start_matches("page-").parse().unwrap_or(0),
        };
        let next_cursor = if index + 1 < pages.len() {
            Some(format!("page-{}", index + 1))
        } else {
            None
        };
        Ok(CommentPage {
            comments: pages.into_iter().nth(index).unwrap_or_default(),
            next_cursor,
        })
    }
}

fn test_state() -> AppState {
    AppState::with_source(
        Arc::new(FixtureSource),
        AnalysisConfig::fast(),
        HeadlineThresholds::default(),
    )
}

async fn wait_for_completion<S, B, E>(app: &S) -> AnalysisProgress
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<B>,
        Error = E,
    >,
    B: actix_web::body::MessageBody,
    E: std::fmt::Debug,
{
    for _ in 0..500 {
        let req = test::TestRequest::get()
            .uri(&format!("/analysis-progress/{}", VIDEO_ID))
            .to_request();
        let resp = test::call_service(app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let progress: AnalysisProgress = test::read_body_json(resp).await;
        if progress.state == "completed" {
            return progress;
        }
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }
    panic!("analysis never completed");
}

#[tokio::test]
async fn test_videos_by_url_triggers_analysis() {
    // Given a fresh service
    let app = test::init_service(create_app(test_state(), None)).await;

    // When requesting a video by URL
    let req = test::TestRequest::get()
        .uri(&format!("/videos?url={}", VIDEO_URL))
        .to_request();
    let resp = test::call_service(&app, req).await;

    // Then the video is returned with a live analysis state
    assert_eq!(resp.status(), StatusCode::OK);
    let body: VideoResponse = test::read_body_json(resp).await;
    assert_eq!(body.id, VIDEO_ID);
    assert_eq!(body.title, "A wonderful documentary");
    assert!(["pending", "in_progress", "completed"].contains(&body.analysis_state.as_str()));

    // And the run eventually completes with every comment classified
    let progress = wait_for_completion(&app).await;
    assert_eq!(progress.total_analyzed, 5);
    assert_eq!(progress.total_expected, 5);
    assert!(!progress.has_more);
}

#[tokio::test]
async fn test_malformed_url_is_rejected() {
    let app = test::init_service(create_app(test_state(), None)).await;

    let req = test::TestRequest::get()
        .uri("/videos?url=gibberish")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_video_progress_is_404() {
    let app = test::init_service(create_app(test_state(), None)).await;

    let req = test::TestRequest::get()
        .uri("/analysis-progress/zzzzzzzzzzz")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_comments_filtering_and_totals() {
    let app = test::init_service(create_app(test_state(), None)).await;

    // Given a completed analysis
    let req = test::TestRequest::get()
        .uri(&format!("/videos?url={}", VIDEO_URL))
        .to_request();
    test::call_service(&app, req).await;
    wait_for_completion(&app).await;

    // When filtering to well-liked negative comments
    let req = test::TestRequest::get()
        .uri(&format!(
            "/comments?url={}&sentiment=negative&min_likes=10",
            VIDEO_URL
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;

    // Then only the matching comment is available, while the totals still
    // cover the whole classified set
    assert_eq!(resp.status(), StatusCode::OK);
    let body: CommentsResponse = test::read_body_json(resp).await;
    assert_eq!(body.total_available, 1);
    assert_eq!(body.comments.len(), 1);
    assert_eq!(body.comments[0].comment_id, "c2");
    assert_eq!(body.sentiment_totals.positive, 2);
    assert_eq!(body.sentiment_totals.negative, 2);
    assert_eq!(body.sentiment_totals.neutral, 1);
    assert_eq!(body.analysis_state, "completed");
    assert!(!body.has_more);
}

#[tokio::test]
async fn test_comments_pagination_invariant() {
    let app = test::init_service(create_app(test_state(), None)).await;

    let req = test::TestRequest::get()
        .uri(&format!("/videos?url={}", VIDEO_URL))
        .to_request();
    test::call_service(&app, req).await;
    wait_for_completion(&app).await;

    let req = test::TestRequest::get()
        .uri(&format!("/comments?url={}&offset=0&limit=2", VIDEO_URL))
        .to_request();
    let body: CommentsResponse = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body.total_available, 5);
    assert_eq!(body.comments.len(), 2);
    assert!(body.has_more);

    let req = test::TestRequest::get()
        .uri(&format!("/comments?url={}&offset=4&limit=2", VIDEO_URL))
        .to_request();
    let body: CommentsResponse = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body.comments.len(), 1);
    assert!(!body.has_more);
}

#[tokio::test]
async fn test_invalid_sentiment_filter_is_rejected() {
    let app = test::init_service(create_app(test_state(), None)).await;

    let req = test::TestRequest::get()
        .uri(&format!("/comments?url={}&sentiment=angry", VIDEO_URL))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chart_data_is_time_ascending() {
    let app = test::init_service(create_app(test_state(), None)).await;

    let req = test::TestRequest::get()
        .uri(&format!("/videos?url={}", VIDEO_URL))
        .to_request();
    test::call_service(&app, req).await;
    wait_for_completion(&app).await;

    let req = test::TestRequest::get()
        .uri(&format!("/chart-data?url={}", VIDEO_URL))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: ChartCommentsResponse = test::read_body_json(resp).await;
    assert_eq!(body.video_id, VIDEO_ID);
    assert_eq!(body.comments.len(), 5);
    for pair in body.comments.windows(2) {
        assert!(pair[0].published_at <= pair[1].published_at);
    }
}

#[tokio::test]
async fn test_video_list_includes_analyzed_video() {
    let app = test::init_service(create_app(test_state(), None)).await;

    let req = test::TestRequest::get()
        .uri(&format!("/videos?url={}", VIDEO_URL))
        .to_request();
    test::call_service(&app, req).await;
    wait_for_completion(&app).await;

    let req = test::TestRequest::get().uri("/videos").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: AnalyzedVideoList = test::read_body_json(resp).await;
    assert_eq!(body.total, 1);
    assert_eq!(body.videos[0].video_id, VIDEO_ID);
    assert_eq!(body.videos[0].total_analyzed, 5);
    assert!(!body.has_more);
}

#[tokio::test]
async fn test_continue_on_completed_run_is_a_no_op() {
    let app = test::init_service(create_app(test_state(), None)).await;

    let req = test::TestRequest::get()
        .uri(&format!("/videos?url={}", VIDEO_URL))
        .to_request();
    test::call_service(&app, req).await;
    wait_for_completion(&app).await;

    let req = test::TestRequest::post()
        .uri(&format!("/analyze/continue/{}", VIDEO_ID))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: AnalysisProgress = test::read_body_json(resp).await;
    assert_eq!(body.state, "completed");
    assert_eq!(body.total_analyzed, 5);
}

#[tokio::test]
async fn test_health_and_metrics_endpoints() {
    let app = test::init_service(create_app(test_state(), None)).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/monitoring/health").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/monitoring/metrics").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("tubepulse_videos_tracked"));
}
