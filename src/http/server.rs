//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Wire transport, cache, source clients and aggregator from config
//! - Create the Axum router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, panic recovery)
//! - Serve on a listener until the shutdown signal

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::aggregate::{AggregateQuery, Aggregator};
use crate::cache::CacheAside;
use crate::config::AppConfig;
use crate::http::recovery::catch_panic_layer;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::observability::metrics;
use crate::outcome::Outcome;
use crate::sources::{NewsClient, PlaylistClient, WeatherClient};
use crate::stats::LatencyTracker;
use crate::transport::build_transport;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    pub tracker: Arc<LatencyTracker>,
}

impl AppState {
    /// Build every component from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, ServerError> {
        let tracker = Arc::new(LatencyTracker::new());
        let transport = build_transport(config, tracker.clone())?;
        let cache = CacheAside::shared(config.cache.lock_timeout());

        let weather = WeatherClient::new(
            transport.clone(),
            cache.clone(),
            config.weather.clone(),
            config.cache.weather_ttl(),
        );
        let news = NewsClient::new(transport.clone(), config.news.clone());
        let playlist = PlaylistClient::new(
            transport,
            cache,
            config.playlist.clone(),
            config.cache.token_ttl(),
        );

        let aggregator = Aggregator::new(
            Arc::new(weather),
            Arc::new(news),
            Arc::new(playlist),
            config.weather.location.clone(),
            config.news.query.clone(),
        )
        .with_source_timeout(config.timeouts.source());

        Ok(Self {
            aggregator: Arc::new(aggregator),
            tracker,
        })
    }
}

/// HTTP server for the aggregator.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig) -> Result<Self, ServerError> {
        let state = AppState::from_config(&config)?;
        let router = build_router(state, config.timeouts.request());
        Ok(Self { router, config })
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/aggregate", get(aggregate_handler))
        .route("/statistics", get(statistics_handler))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(catch_panic_layer())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id(request.headers()),
            )
        }))
        .layer(propagate_request_id_layer())
        .layer(set_request_id_layer())
}

/// `GET /aggregate?sortBy=&filterBy=`
async fn aggregate_handler(
    State(state): State<AppState>,
    Query(query): Query<AggregateQuery>,
) -> Response {
    let outcome = state.aggregator.aggregate(query).await;

    let response = match outcome {
        Outcome::Success(aggregate) => (StatusCode::OK, Json(aggregate)).into_response(),
        failure @ Outcome::Failure(_) => {
            (StatusCode::SERVICE_UNAVAILABLE, Json(failure)).into_response()
        }
    };
    metrics::record_aggregate(response.status().as_u16());
    response
}

/// `GET /statistics`
async fn statistics_handler(State(state): State<AppState>) -> Response {
    if state.tracker.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }
    Json(state.tracker.snapshot()).into_response()
}

async fn health_handler() -> &'static str {
    "ok"
}
