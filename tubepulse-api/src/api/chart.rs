use crate::errors::ApiError;
use crate::models::{ChartComment, ChartCommentsResponse, UrlQuery};
use crate::state::AppState;
use actix_web::{get, web, HttpResponse};
use tubepulse_core::extract_video_id;

/// Lightweight time-series data for chart rendering
///
/// Every classified comment, time-ascending, trimmed to the fields the
/// chart needs. Deliberately uncapped: the chart wants the whole series.
#[utoipa::path(
    get,
    path = "/chart-data",
    tag = "comments",
    params(UrlQuery),
    responses(
        (status = 200, description = "All classified comments for charting", body = ChartCommentsResponse),
        (status = 400, description = "Malformed video URL"),
        (status = 404, description = "Video has not been analyzed"),
        (status = 500, description = "Internal server error")
    )
)]
#[get("/chart-data")]
pub async fn chart_data_endpoint(
    query: web::Query<UrlQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let video_id = extract_video_id(&query.url)?;
    let points = state.query.chart_comments(&video_id).await?;

    let comments = points
        .into_iter()
        .map(|p| ChartComment {
            comment_id: p.comment_id,
            published_at: p.published_at,
            sentiment_label: p.sentiment_label.to_string(),
        })
        .collect();

    Ok(HttpResponse::Ok().json(ChartCommentsResponse {
        video_id,
        comments,
    }))
}
