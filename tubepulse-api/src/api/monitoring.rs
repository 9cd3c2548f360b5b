use crate::state::AppState;
use actix_web::{web, HttpResponse, Result as ActixResult};

// Prometheus metrics endpoint
pub async fn metrics(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let snapshots = state.store.list_snapshots().await;
    let videos_tracked = snapshots.len() as i64;
    let comments_classified: i64 = snapshots.iter().map(|s| s.run.total_analyzed as i64).sum();

    match state.metrics.render(videos_tracked, comments_classified) {
        Ok(text) => Ok(HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4; charset=utf-8")
            .body(text)),
        Err(e) => Ok(HttpResponse::InternalServerError().json(serde_json::json!({
            "error": "Failed to render metrics",
            "details": e.to_string()
        }))),
    }
}

// Health check endpoint
pub async fn health(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let snapshots = state.store.list_snapshots().await;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "uptime_seconds": state.metrics.uptime_seconds(),
        "videos_tracked": snapshots.len(),
    })))
}

// Readiness probe: the store is in-memory, so once the process answers it
// can serve requests.
pub async fn ready() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ready",
        "message": "Service is ready to accept requests"
    })))
}

// Liveness probe
pub async fn live() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "alive",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
