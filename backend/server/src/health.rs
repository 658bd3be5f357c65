use axum::http::StatusCode;
use tracing::error;

use crate::database::Datastore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Health {
    Healthy,
    Unhealthy,
}

impl Health {
    pub fn status(self) -> StatusCode {
        match self {
            Health::Healthy => StatusCode::OK,
            Health::Unhealthy => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Health::Healthy => "healthy",
            Health::Unhealthy => "unhealthy",
        }
    }
}

/// One trivial round-trip against the datastore. Blocking.
pub fn check_health(store: &Datastore) -> Health {
    match store.ping() {
        Ok(()) => Health::Healthy,
        Err(e) => {
            error!("Health check failed: {e}");
            Health::Unhealthy
        }
    }
}
