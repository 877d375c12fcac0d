//! Shared fixtures: a mock RAG backend with a live relay in front of it.

#![allow(dead_code)]

use std::time::Duration;

use finqa::relay::backend::BackendClient;
use finqa::relay::RelayService;
use wiremock::MockServer;

pub const MAX_UPLOAD_BYTES: usize = 1024 * 1024;

pub struct TestRelay {
    pub backend: MockServer,
    pub relay: RelayService,
    pub url: String,
}

impl TestRelay {
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.url, path)
    }
}

/// Start a wiremock backend and a relay bound to an ephemeral port.
pub async fn start_relay() -> TestRelay {
    let backend = MockServer::start().await;
    let client = BackendClient::new(&backend.uri(), Duration::from_secs(5)).unwrap();

    let mut relay = RelayService::new("127.0.0.1", 0, client, MAX_UPLOAD_BYTES);
    let addr = relay.start().await.unwrap();

    TestRelay {
        backend,
        relay,
        url: format!("http://{addr}"),
    }
}

pub fn http() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}
