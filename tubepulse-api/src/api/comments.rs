use crate::errors::ApiError;
use crate::models::{CommentsQueryParams, CommentsResponse};
use crate::state::AppState;
use actix_web::{get, web, HttpResponse};
use tubepulse_core::{extract_video_id, CommentQuery, SentimentLabel, SortBy, SortOrder};

const DEFAULT_COMMENT_LIMIT: usize = 100;
const MAX_COMMENT_LIMIT: usize = 500;

impl CommentsQueryParams {
    /// Validate and translate the wire parameters. Rejection happens here,
    /// before any state is touched.
    fn to_core(&self) -> Result<CommentQuery, ApiError> {
        let sentiment = self
            .sentiment
            .as_deref()
            .map(str::parse::<SentimentLabel>)
            .transpose()?;
        let sort_by = self
            .sort_by
            .as_deref()
            .map(str::parse::<SortBy>)
            .transpose()?
            .unwrap_or_default();
        let sort_order = self
            .sort_order
            .as_deref()
            .map(str::parse::<SortOrder>)
            .transpose()?
            .unwrap_or_default();

        Ok(CommentQuery {
            offset: self.offset.unwrap_or(0),
            limit: self
                .limit
                .unwrap_or(DEFAULT_COMMENT_LIMIT)
                .clamp(1, MAX_COMMENT_LIMIT),
            sentiment,
            author: self.author.clone(),
            phrase: self.phrase.clone(),
            min_likes: self.min_likes,
            sort_by,
            sort_order,
        })
    }
}

/// Filtered, sorted, paginated comments for a video
///
/// Filters apply to classified comments only; `sentiment_totals` always
/// covers the full unfiltered classified set so the client can overlay
/// the filtered page against the video-wide distribution. Queries against
/// an in-progress or failed run return whatever has been classified.
#[utoipa::path(
    get,
    path = "/comments",
    tag = "comments",
    params(CommentsQueryParams),
    responses(
        (status = 200, description = "One page of comments with totals", body = CommentsResponse),
        (status = 400, description = "Malformed URL or filter parameter"),
        (status = 404, description = "Video has not been analyzed"),
        (status = 500, description = "Internal server error")
    )
)]
#[get("/comments")]
pub async fn comments_endpoint(
    params: web::Query<CommentsQueryParams>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let video_id = extract_video_id(&params.url)?;
    let query = params.to_core()?;

    let view = state.query.list_comments(&video_id, &query).await?;
    state.metrics.record_comment_query();
    Ok(HttpResponse::Ok().json(CommentsResponse::from_view(&view)))
}
