//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event as SseEvent, KeepAlive, Sse},
        IntoResponse, Json, Response,
    },
};
use futures::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, warn};

use crate::{
    background::{Background, TabEvent},
    protocol::{dispatch, Request},
    services::Tab,
    tasks::SiteTimers,
};
use super::responses::{HealthResponse, StatusResponse, TabRef};

/// Handle POST /message - Answer a protocol command
pub async fn message_handler(
    State(background): State<Arc<Background>>,
    Json(request): Json<Request>,
) -> Response {
    match dispatch(&background, request) {
        Some(response) => Json(response).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Handle GET /events - Stream broadcasts as server-sent events
pub async fn events_handler(
    State(background): State<Arc<Background>>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    debug!("UI context subscribed to events");
    let events = background.state.bus.subscribe();

    let stream = stream::unfold(events, |mut events| async move {
        loop {
            match events.recv().await {
                Ok(event) => match SseEvent::default().event(event.name()).json_data(&event) {
                    Ok(sse) => return Some((Ok(sse), events)),
                    Err(e) => warn!("Failed to encode {}: {}", event.name(), e),
                },
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event stream lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Handle POST /tabs/updated - A tab changed or navigated
pub async fn tab_updated_handler(
    State(background): State<Arc<Background>>,
    Json(tab): Json<Tab>,
) -> StatusCode {
    background.handle_tab_event(TabEvent::Updated(tab));
    StatusCode::NO_CONTENT
}

/// Handle POST /tabs/activated - Focus moved to another tab
pub async fn tab_activated_handler(
    State(background): State<Arc<Background>>,
    Json(tab): Json<TabRef>,
) -> StatusCode {
    background.handle_tab_event(TabEvent::Activated(tab.tab_id));
    StatusCode::NO_CONTENT
}

/// Handle POST /tabs/removed - A tab was closed
pub async fn tab_removed_handler(
    State(background): State<Arc<Background>>,
    Json(tab): Json<TabRef>,
) -> StatusCode {
    background.handle_tab_event(TabEvent::Removed(tab.tab_id));
    StatusCode::NO_CONTENT
}

/// Handle GET /status - Return current background state
pub async fn status_handler(
    State(background): State<Arc<Background>>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = match background.timer.state() {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to get timer state: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let state = &background.state;
    let (last_command, last_command_time) = state.get_last_command();

    Ok(Json(StatusResponse {
        timer,
        settings: state.settings(),
        badge: state.badge(),
        active_tab: background.tracker.active_tab(),
        tracked_site: background.tracker.counting_host(),
        uptime: state.get_uptime(),
        last_command,
        last_command_time,
    }))
}

/// Handle GET /site-timers - Seconds spent per distracting site today
pub async fn site_timers_handler(State(background): State<Arc<Background>>) -> Json<SiteTimers> {
    Json(background.tracker.site_timers())
}

/// Handle GET /badge - Current countdown text
pub async fn badge_handler(State(background): State<Arc<Background>>) -> String {
    background.state.badge()
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
