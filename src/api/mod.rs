//! HTTP bridge module
//!
//! Exposes the message protocol and the tab event feed to the browser
//! extension over loopback HTTP.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::background::Background;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(background: Arc<Background>) -> Router {
    Router::new()
        .route("/message", post(message_handler))
        .route("/events", get(events_handler))
        .route("/tabs/updated", post(tab_updated_handler))
        .route("/tabs/activated", post(tab_activated_handler))
        .route("/tabs/removed", post(tab_removed_handler))
        .route("/status", get(status_handler))
        .route("/site-timers", get(site_timers_handler))
        .route("/badge", get(badge_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(background)
}
