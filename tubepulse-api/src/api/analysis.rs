use crate::errors::ApiError;
use crate::models::AnalysisProgress;
use crate::state::AppState;
use actix_web::{get, post, web, HttpResponse};

/// Progress snapshot for a video's analysis run
///
/// Polled by the client. A stalled run shows up through `last_update`
/// staleness and a missing completion estimate; a failed run carries
/// `state = "failed"` here rather than an HTTP error, so the client can
/// keep showing partial data and offer a resume.
#[utoipa::path(
    get,
    path = "/analysis-progress/{video_id}",
    tag = "analysis",
    params(("video_id" = String, Path, description = "Video id")),
    responses(
        (status = 200, description = "Current run progress", body = AnalysisProgress),
        (status = 404, description = "Video has not been analyzed"),
        (status = 500, description = "Internal server error")
    )
)]
#[get("/analysis-progress/{video_id}")]
pub async fn analysis_progress_endpoint(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let video_id = path.into_inner();
    let run = state.query.progress(&video_id).await?;
    Ok(HttpResponse::Ok().json(AnalysisProgress::from(&run)))
}

/// Resume a failed analysis run from its last checkpoint
///
/// Idempotent: live and completed runs are returned as-is.
#[utoipa::path(
    post,
    path = "/analyze/continue/{video_id}",
    tag = "analysis",
    params(("video_id" = String, Path, description = "Video id")),
    responses(
        (status = 200, description = "Progress after the resume was scheduled", body = AnalysisProgress),
        (status = 404, description = "Video has not been analyzed"),
        (status = 500, description = "Internal server error")
    )
)]
#[post("/analyze/continue/{video_id}")]
pub async fn continue_analysis_endpoint(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let video_id = path.into_inner();
    let snapshot = state.engine.continue_analysis(&video_id).await?;
    state.metrics.record_resume();
    Ok(HttpResponse::Ok().json(AnalysisProgress::from(&snapshot.run)))
}
