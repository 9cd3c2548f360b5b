use crate::config::ApiConfig;
use crate::state::AppState;
use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use tracing_actix_web::TracingLogger;

pub mod analysis;
pub mod chart;
pub mod comments;
pub mod monitoring;
pub mod openapi;
pub mod videos;

pub fn create_app(
    state: AppState,
    frontend_origin: Option<String>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    // The frontend polls from another port, so CORS is part of the
    // contract; a pinned origin in production, permissive for local dev.
    let cors = match frontend_origin {
        Some(origin) => Cors::default()
            .allowed_origin(&origin)
            .allow_any_method()
            .allow_any_header(),
        None => Cors::permissive(),
    };

    App::new()
        .wrap(TracingLogger::default())
        .wrap(cors)
        .app_data(web::Data::new(state))
        .service(videos::videos_endpoint)
        .service(comments::comments_endpoint)
        .service(chart::chart_data_endpoint)
        .service(analysis::analysis_progress_endpoint)
        .service(analysis::continue_analysis_endpoint)
        .service(
            web::scope("/monitoring")
                .route("/metrics", web::get().to(monitoring::metrics))
                .route("/health", web::get().to(monitoring::health))
                .route("/ready", web::get().to(monitoring::ready))
                .route("/live", web::get().to(monitoring::live)),
        )
        .route("/api-docs/openapi.json", web::get().to(openapi::openapi_json))
}

pub async fn start_server(config: ApiConfig) -> std::io::Result<()> {
    let state = AppState::from_config(&config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    let origin = config.frontend_origin.clone();

    HttpServer::new(move || create_app(state.clone(), origin.clone()))
        .bind(&config.bind_address)?
        .run()
        .await
}
