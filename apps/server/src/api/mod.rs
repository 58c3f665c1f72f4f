use std::{convert::Infallible, sync::Arc, time::Duration};

use crate::{config::Config, main_lib::AppState, models::StateEvent};
use axum::{
    extract::State,
    http::HeaderValue,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures::stream::Stream;
use tokio_stream::{wrappers::WatchStream, StreamExt};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod assets;
mod portfolio;

/// Name of the server-sent event carrying a state snapshot
pub const PORTFOLIO_STATE_EVENT: &str = "portfolio:state";

pub async fn healthz() -> &'static str {
    "ok"
}

/// Streams every state the coordinator publishes, starting with the current one.
async fn events_stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let updates = WatchStream::new(state.coordinator.subscribe());
    let stream = updates.filter_map(|snapshot| {
        match SseEvent::default()
            .event(PORTFOLIO_STATE_EVENT)
            .json_data(StateEvent::from(&snapshot))
        {
            Ok(event) => Some(Ok(event)),
            Err(err) => {
                tracing::error!("Failed to serialize portfolio state event: {}", err);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin {}", o);
                    None
                }
            })
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins)
    };

    let api = Router::new()
        .route("/healthz", get(healthz))
        .route("/events", get(events_stream))
        .merge(assets::router())
        .merge(portfolio::router());

    Router::new()
        .nest("/api/v1", api)
        .with_state(state)
        .layer(cors)
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}
