pub mod config;
pub mod draft;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::ApiError;

use axum::{
    Router,
    routing::{get, post},
};

use services::FreshdeskClient;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub freshdesk: FreshdeskClient,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/freshdesk/webhook",
            post(handlers::webhook::freshdesk_webhook),
        )
        .route("/healthz", get(handlers::health::healthz))
        .with_state(state)
}
