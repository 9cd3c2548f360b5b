use crate::errors::ApiError;
use crate::models::{AnalyzedVideoList, VideoResponse, VideosQuery};
use crate::state::AppState;
use actix_web::{get, web, HttpResponse};
use tubepulse_core::extract_video_id;

const DEFAULT_LIST_LIMIT: usize = 20;
const MAX_LIST_LIMIT: usize = 100;

/// Trigger-or-fetch a single video analysis, or list analyzed videos
///
/// With `url`, the video is looked up and a background analysis run is
/// started on first sight; the response reflects whatever progress exists.
/// Without `url`, returns analyzed videos, most recently analyzed first.
#[utoipa::path(
    get,
    path = "/videos",
    tag = "videos",
    params(VideosQuery),
    responses(
        (status = 200, description = "Video with current aggregates, or a summary page", body = VideoResponse),
        (status = 400, description = "Malformed video URL"),
        (status = 404, description = "Video does not exist at the source"),
        (status = 500, description = "Internal server error")
    )
)]
#[get("/videos")]
pub async fn videos_endpoint(
    query: web::Query<VideosQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    if let Some(url) = &query.url {
        let video_id = extract_video_id(url)?;
        let snapshot = state.engine.request_analysis(&video_id).await?;
        state.metrics.record_analysis_request();
        return Ok(HttpResponse::Ok().json(VideoResponse::from_snapshot(&snapshot)));
    }

    let offset = query.offset.unwrap_or(0);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);
    let list = state.query.list_videos(offset, limit).await;
    Ok(HttpResponse::Ok().json(AnalyzedVideoList::from_list(&list)))
}
