use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{Router, extract::State, routing::get};
use portfolio::pinger::{HEALTH_PATH, ping, spawn_prober};
use reqwest::{Client, StatusCode};

async fn counting_server() -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));

    let app = Router::new()
        .route(
            HEALTH_PATH,
            get(|State(hits): State<Arc<AtomicUsize>>| async move {
                hits.fetch_add(1, Ordering::SeqCst);
                "ok"
            }),
        )
        .with_state(hits.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });

    (format!("http://{addr}"), hits)
}

#[tokio::test]
async fn ping_reports_status() {
    let (base_url, hits) = counting_server().await;

    let status = ping(&Client::new(), &format!("{base_url}{HEALTH_PATH}"))
        .await
        .expect("ping");

    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn prober_pings_until_stopped() {
    let (base_url, hits) = counting_server().await;

    let prober = spawn_prober(Client::new(), &base_url, Duration::from_millis(50));
    tokio::time::sleep(Duration::from_millis(400)).await;

    tokio::time::timeout(Duration::from_secs(5), prober.stop())
        .await
        .expect("stop returns");

    let after_stop = hits.load(Ordering::SeqCst);
    assert!(after_stop >= 2, "expected repeated pings, got {after_stop}");

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(hits.load(Ordering::SeqCst), after_stop);
}

#[tokio::test]
async fn prober_survives_unreachable_target() {
    let client = Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .expect("client");

    let prober = spawn_prober(client, "http://127.0.0.1:9", Duration::from_millis(20));
    tokio::time::sleep(Duration::from_millis(150)).await;

    tokio::time::timeout(Duration::from_secs(5), prober.stop())
        .await
        .expect("stop returns");
}

#[tokio::test]
async fn stop_cancels_a_hanging_ping() {
    let hits = Arc::new(AtomicUsize::new(0));

    let app = Router::new()
        .route(
            HEALTH_PATH,
            get(|State(hits): State<Arc<AtomicUsize>>| async move {
                hits.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(60)).await;
                "late"
            }),
        )
        .with_state(hits.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });

    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .expect("client");
    let prober = spawn_prober(client, &format!("http://{addr}"), Duration::from_millis(20));

    while hits.load(Ordering::SeqCst) == 0 {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    tokio::time::timeout(Duration::from_secs(1), prober.stop())
        .await
        .expect("stop does not wait for the ping to finish");
}
