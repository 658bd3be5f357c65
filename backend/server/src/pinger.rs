//! # Self Ping
//!
//! The host spins the service down after ~15 idle minutes, so we call our own
//! health endpoint every 14.
//!
//! - First ping one full period after start
//! - Failures are logged, the next tick is the retry
//! - [`ProberHandle::stop`] ends the loop, cancelling an in-flight ping, and waits for it
use std::time::Duration;

use reqwest::{Client, StatusCode};
use tokio::{
    sync::oneshot,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};
use tracing::{debug, error, info, warn};

pub const PING_INTERVAL: Duration = Duration::from_secs(14 * 60);
pub const PING_TIMEOUT: Duration = Duration::from_secs(30);
pub const HEALTH_PATH: &str = "/api/health";

pub fn health_url(base_url: &str) -> String {
    format!("{}{HEALTH_PATH}", base_url.trim_end_matches('/'))
}

pub async fn ping(client: &Client, url: &str) -> Result<StatusCode, reqwest::Error> {
    let response = client.get(url).send().await?;

    Ok(response.status())
}

pub struct ProberHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

pub fn spawn_prober(client: Client, base_url: &str, period: Duration) -> ProberHandle {
    let url = health_url(base_url);
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

    info!("Pinging {url} every {}s", period.as_secs());

    let task = tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => break,
                _ = ticker.tick() => {}
            }

            // A slow ping must not hold up shutdown.
            tokio::select! {
                _ = &mut shutdown_rx => break,
                result = ping(&client, &url) => match result {
                    Ok(status) => info!("Ping response: {status}"),
                    Err(e) => error!("Ping failed: {e}"),
                },
            }
        }

        debug!("Prober loop exited");
    });

    ProberHandle {
        shutdown: Some(shutdown_tx),
        task: Some(task),
    }
}

impl ProberHandle {
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Prober task ended abnormally: {e}");
            }
        }

        info!("Prober stopped");
    }
}

impl Drop for ProberHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_url() {
        assert_eq!(
            health_url("https://example.com"),
            "https://example.com/api/health"
        );
        assert_eq!(
            health_url("http://localhost:5000/"),
            "http://localhost:5000/api/health"
        );
    }

    #[tokio::test]
    async fn test_ping_unreachable_is_an_error() {
        let client = Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .expect("client");

        assert!(ping(&client, "http://127.0.0.1:9/api/health").await.is_err());
    }

    #[tokio::test]
    async fn test_stop_before_first_tick() {
        let prober = spawn_prober(Client::new(), "http://127.0.0.1:9", PING_INTERVAL);

        tokio::time::timeout(Duration::from_secs(1), prober.stop())
            .await
            .expect("stop returns promptly");
    }
}
