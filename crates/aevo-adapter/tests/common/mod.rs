/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for aevo-adapter tests

#![allow(dead_code)]

use std::future::Future;

use aevo_adapter::{AevoClient, ClientConfig, Credentials, Environment};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::WebSocketStream;
use wiremock::MockServer;

/// Well-known development key (anvil account #0)
pub const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
/// Address of `TEST_KEY`
pub const TEST_SIGNER_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
/// Account wallet (anvil account #1), distinct from the signing key
pub const TEST_ADDRESS: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_API_SECRET: &str = "test-api-secret";

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Testnet credentials with an API key pair
pub fn test_credentials() -> Credentials {
    Credentials::new(TEST_KEY, TEST_ADDRESS, TEST_API_KEY, TEST_API_SECRET, "testnet")
        .expect("test credentials")
}

/// Testnet credentials without an API key pair (no `auth` on connect)
pub fn signing_only_credentials() -> Credentials {
    Credentials::new(TEST_KEY, TEST_ADDRESS, "", "", "testnet").expect("test credentials")
}

/// REST client pointed at the mock server
pub fn mock_client(server: &MockServer, credentials: Option<Credentials>) -> AevoClient {
    let mut client = AevoClient::with_config_and_base_url(
        ClientConfig::default(),
        Environment::Testnet,
        &server.uri(),
    )
    .expect("client");
    if let Some(credentials) = credentials {
        client.set_credentials(credentials);
    }
    client
}

/// Accept a single WebSocket connection on a random local port and run
/// `script` against it
pub async fn spawn_ws_server<F, Fut, T>(script: F) -> (String, JoinHandle<T>)
where
    F: FnOnce(WebSocketStream<TcpStream>) -> Fut + Send + 'static,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let ws = tokio_tungstenite::accept_async(stream).await.expect("handshake");
        script(ws).await
    });

    (format!("ws://{}", addr), handle)
}
