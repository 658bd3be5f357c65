//! Backend for a personal portfolio site.
//!
//!
//!
//! # General Infrastructure
//! - Single process on a free-tier host that spins down when idle
//! - Serves the built frontend bundle from `STATIC_DIR`
//! - `POST /api/contact` stores the inquiry in SQLite, then emails it to the owner
//! - `GET /api/health` touches the database, polled by our own self-ping task
//!
//!
//!
//! # Contact Flow
//!
//! - Trim, then validate: required fields, email format, lengths
//! - Reject with 400 on the first violation, nothing stored
//! - Store the inquiry, 500 if that fails, no email attempted
//! - Email the owner over SMTP, a failure here still answers 200 with a softer message
//!
//!
//!
//! # Environment
//!
//! | Variable | Default |
//! |---|---|
//! | `PORT` | `5000` |
//! | `DATABASE_PATH` | `portfolio.db` |
//! | `STATIC_DIR` | `frontend/dist` |
//! | `EMAIL_ADDRESS` | unset, disables email |
//! | `EMAIL_PASSWORD` | unset, also read from `/run/secrets/EMAIL_PASSWORD` |
//! | `SMTP_HOST` / `SMTP_PORT` | `smtp.gmail.com` / `587` |
//! | `APP_URL` | `https://portfolio-4s1j.onrender.com` |
//! | `APP_ENV` | `production` |
//!
//! A `.env` file in the working directory (or a parent) is read first. Variables
//! already present in the process environment take precedence.
//!
//!
//!
//! # Setup
//!
//! Run locally with verbose logs.
//! ```sh
//! APP_ENV=development cargo run -p portfolio-backend
//! ```
//!
//! Send a test inquiry to the running server.
//! ```sh
//! cargo run -p tester -- --base-url http://localhost:5000
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    handler::HandlerWithoutStateExt,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod contact;
pub mod database;
pub mod error;
pub mod health;
pub mod mailer;
pub mod pinger;
pub mod routes;
pub mod state;

use config::{Config, DotEnv, Environment};
use error::StartupError;
use pinger::{PING_INTERVAL, PING_TIMEOUT, spawn_prober};
use routes::{contact_handler, health_handler, static_not_found};
use state::AppState;

pub async fn start_server() -> Result<(), StartupError> {
    let dotenv = DotEnv::load();
    let environment = Environment::detect();
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(environment.default_log_filter())),
        )
        .init();
    dotenv.log();

    info!("Initializing state...");
    let config = Config::load()?;
    let state = AppState::new(config)?;

    let client = reqwest::Client::builder().timeout(PING_TIMEOUT).build()?;
    let prober = spawn_prober(client, &state.config.app_url, PING_INTERVAL);

    info!("Starting server...");
    let app = build_router(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    prober.stop().await;
    info!("Server shut down");

    Ok(())
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins()
        .into_iter()
        .filter_map(|origin| {
            HeaderValue::from_str(&origin)
                .map_err(|e| warn!("Skipping CORS origin {origin}: {e}"))
                .ok()
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let api = Router::new()
        .route("/contact", post(contact_handler))
        .route("/health", get(health_handler))
        .layer(cors);

    let assets =
        ServeDir::new(&state.config.static_dir).not_found_service(static_not_found.into_service());

    Router::new()
        .nest("/api", api)
        .fallback_service(assets)
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
