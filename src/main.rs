use axum::{Router, http::header};
use roomsplit::{
    api::{handlers::api_routes, openapi::ApiDoc},
    config::CONFIG,
    core::services::{RoomsplitService, ServiceConfig},
    infrastructure::{
        cache::in_memory::InMemoryCache, logging::in_memory::InMemoryLogging,
        notifications::in_memory::InMemoryNotifier, storage::in_memory::InMemoryStorage,
    },
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_new(&CONFIG.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    info!(config = ?*CONFIG, "starting roomsplit");

    let service = Arc::new(RoomsplitService::new(
        InMemoryStorage::new(),
        InMemoryLogging::new(),
        InMemoryCache::new(),
        InMemoryNotifier::new(),
        ServiceConfig::from(&*CONFIG),
    ));

    let app = Router::new()
        .nest("/api", api_routes(service))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CompressionLayer::new()) // Gzip compression
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([http::Method::GET, http::Method::POST, http::Method::PUT])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], CONFIG.port));
    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
