//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use httpy::config::HostConfig;
use httpy::lifecycle::{start, Shutdown};
use httpy::worker::WorkerHandle;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// A running host on an ephemeral port. Shuts down when dropped.
pub struct TestHost {
    pub addr: SocketAddr,
    #[allow(dead_code)]
    pub worker: WorkerHandle,
    shutdown: Shutdown,
}

impl TestHost {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestHost {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Initialize `worker` and serve it on `127.0.0.1:0`.
pub async fn start_host(worker: WorkerHandle, config: HostConfig) -> TestHost {
    let server = start(config, worker.clone()).expect("worker should initialize");
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (_, config_updates) = mpsc::unbounded_channel();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    TestHost {
        addr,
        worker,
        shutdown,
    }
}

/// Host config with the given dispatch timeout.
#[allow(dead_code)]
pub fn config_with_timeout(timeout: Duration) -> HostConfig {
    let mut config = HostConfig::default();
    config.dispatch.timeout_ms = timeout.as_millis() as u64;
    config
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}
