//! ScholarFlow API Gateway
//!
//! The main entry point for all external API requests.
//! Handles:
//! - Role-based authorization
//! - Rate limiting
//! - Request routing
//! - Observability (logging, metrics, tracing)

mod handlers;
mod middleware;

use axum::{
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use scholarflow_common::{
    config::AppConfig,
    metrics::{GATEWAY_BUCKETS, LATENCY_BUCKETS},
};
use scholarflow_workflow::{
    payment::{HttpGateway, PaymentGateway, SandboxGateway},
    ManuscriptStore, PaymentGate, WorkflowEngine,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, Level};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<ManuscriptStore>,
    pub engine: Arc<WorkflowEngine>,
    pub gate: Arc<PaymentGate>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(true)
        .json()
        .init();

    info!("Starting ScholarFlow API Gateway v{}", scholarflow_common::VERSION);

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        e
    })?;

    let config = Arc::new(config);

    // Initialize metrics
    scholarflow_common::metrics::register_metrics();

    let metrics_addr = SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .set_buckets_for_metric(
            Matcher::Full("scholarflow_request_duration_seconds".to_string()),
            LATENCY_BUCKETS,
        )?
        .set_buckets_for_metric(
            Matcher::Full("scholarflow_gateway_duration_seconds".to_string()),
            GATEWAY_BUCKETS,
        )?
        .install()?;
    info!("Metrics exporter listening on {}", metrics_addr);

    // Create app state
    let state = build_state(config.clone())?;

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Wire the store, workflow engine, and payment gate together
fn build_state(config: Arc<AppConfig>) -> Result<AppState, scholarflow_common::errors::AppError> {
    let store = Arc::new(ManuscriptStore::new());
    let engine = Arc::new(WorkflowEngine::new(
        store.clone(),
        &config.review,
        &config.payment,
    ));

    let gateway: Arc<dyn PaymentGateway> =
        if config.payment.key_id.is_some() && config.payment.key_secret.is_some() {
            Arc::new(HttpGateway::from_config(&config.payment)?)
        } else {
            info!("No payment gateway credentials configured, using the sandbox gateway");
            Arc::new(SandboxGateway::new())
        };
    let secret = config
        .payment
        .key_secret
        .clone()
        .unwrap_or_else(|| "sandbox".to_string());
    let gate = Arc::new(PaymentGate::new(
        store.clone(),
        gateway,
        secret,
        config.payment.plans.clone(),
    ));

    Ok(AppState {
        config,
        store,
        engine,
        gate,
    })
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // API routes
    let api_routes = Router::new()
        // Health endpoints (no auth)
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        // Manuscript endpoints
        .route("/manuscripts", post(handlers::manuscripts::submit))
        .route("/manuscripts", get(handlers::manuscripts::list))
        .route("/manuscripts/{id}", get(handlers::manuscripts::get))
        .route("/manuscripts/{id}/timeline", get(handlers::manuscripts::timeline))
        .route("/manuscripts/{id}/editor", put(handlers::manuscripts::assign_editor))
        .route("/manuscripts/{id}/resubmit", post(handlers::manuscripts::resubmit))
        // Review endpoints
        .route("/manuscripts/{id}/reviewers", post(handlers::reviews::assign_reviewers))
        .route("/manuscripts/{id}/reviews", post(handlers::reviews::submit_review))
        .route(
            "/manuscripts/{id}/rounds/{round}/close",
            post(handlers::reviews::close_round),
        )
        // Decision endpoint
        .route("/manuscripts/{id}/decision", post(handlers::decisions::record_decision))
        // Payment endpoints
        .route("/manuscripts/{id}/checkout", post(handlers::payments::checkout))
        .route(
            "/manuscripts/{id}/checkout/verify",
            post(handlers::payments::verify),
        )
        // Reporting and navigation
        .route("/dashboard", get(handlers::dashboard::summary))
        .route("/navigation", get(handlers::navigation::menu));

    let mut app = Router::new().nest("/v1", api_routes);

    // Rate limiting
    if state.config.rate_limit.enabled {
        let limiter = middleware::rate_limit::create_rate_limiter(
            state.config.rate_limit.requests_per_second,
            state.config.rate_limit.burst,
        );
        let limit = state.config.rate_limit.requests_per_second;
        app = app.layer(axum::middleware::from_fn(
            move |request: axum::extract::Request, next: axum::middleware::Next| {
            let limiter = limiter.clone();
                async move {
                    middleware::rate_limit::rate_limit_middleware(request, next, limiter, limit)
                        .await
                }
            },
        ));
    }

    // Compose the app
    app.layer(axum::middleware::from_fn(middleware::metrics::track_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
