//! HTTP surface for lessons, words, study decks and app settings.

#![forbid(unsafe_code)]

use std::sync::Arc;

use axum::Router;
use axum::http::{Method, header};
use axum::routing::{get, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod state;

pub use config::Config;
pub use error::ApiError;
pub use state::AppState;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_origin(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api_routes())
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/lessons",
            get(handlers::lessons::list_lessons).post(handlers::lessons::create_lesson),
        )
        .route(
            "/lessons/{id}",
            get(handlers::lessons::get_lesson)
                .put(handlers::lessons::update_lesson)
                .delete(handlers::lessons::delete_lesson),
        )
        .route(
            "/lessons/{id}/words",
            get(handlers::words::list_words).post(handlers::words::create_word),
        )
        .route(
            "/lessons/{id}/words/{word_id}",
            put(handlers::words::update_word).delete(handlers::words::delete_word),
        )
        .route("/lessons/{id}/deck", get(handlers::deck::get_deck))
        .route(
            "/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_setting),
        )
}

/// Bind `addr` and serve until Ctrl-C.
///
/// # Errors
///
/// Returns the I/O error if binding or serving fails.
pub async fn serve(app_state: Arc<AppState>, addr: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("server listening on {}", listener.local_addr()?);
    axum::serve(listener, create_router(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
