#![allow(dead_code)]

use std::{
    net::SocketAddr,
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use portfolio::{
    build_router,
    config::Config,
    contact::NewContact,
    database::Datastore,
    mailer::Notifier,
    state::AppState,
};

pub struct StubNotifier {
    delivered: bool,
    calls: AtomicUsize,
}

impl StubNotifier {
    pub fn delivering() -> Arc<Self> {
        Arc::new(Self {
            delivered: true,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            delivered: false,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Notifier for StubNotifier {
    fn notify(&self, _contact: &NewContact) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.delivered
    }
}

pub fn config_in(dir: &Path) -> Config {
    Config {
        database_path: dir.join("portfolio.db"),
        static_dir: dir.join("dist"),
        ..Config::default()
    }
}

pub fn state_with(dir: &Path, notifier: Arc<StubNotifier>) -> Arc<AppState> {
    AppState::with_notifier(config_in(dir), notifier).expect("init state")
}

/// State whose datastore can never be opened. Skips init on purpose.
pub fn broken_state(dir: &Path, notifier: Arc<StubNotifier>) -> Arc<AppState> {
    let config = config_in(dir);

    Arc::new(AppState {
        store: Datastore::new(dir.join("missing").join("portfolio.db")),
        config,
        notifier,
    })
}

pub async fn serve(state: Arc<AppState>) -> SocketAddr {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });

    addr
}
