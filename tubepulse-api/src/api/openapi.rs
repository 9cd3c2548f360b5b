use crate::models::*;
use actix_web::HttpResponse;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::videos::videos_endpoint,
        crate::api::comments::comments_endpoint,
        crate::api::chart::chart_data_endpoint,
        crate::api::analysis::analysis_progress_endpoint,
        crate::api::analysis::continue_analysis_endpoint
    ),
    components(
        schemas(
            VideoResponse,
            AnalyzedVideoSummary,
            AnalyzedVideoList,
            SentimentTotalsDto,
            CommentDto,
            CommentsResponse,
            ChartComment,
            ChartCommentsResponse,
            AnalysisProgress
        )
    ),
    tags(
        (name = "videos", description = "Video analysis and summaries"),
        (name = "comments", description = "Comment views and chart data"),
        (name = "analysis", description = "Run progress and resumption")
    ),
    info(
        title = "TubePulse API",
        version = "0.1.0",
        description = "YouTube comment sentiment analysis service",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
