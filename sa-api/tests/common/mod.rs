//! Shared test utilities for integration tests.

#![allow(dead_code)]

use std::time::Duration;

use sa_api::{Client, ClientConfig};

pub const API_KEY: &str = "sa_api_key_integration";
pub const USER_ID: &str = "sa_user_id_integration";

/// Run blocking client code off the async runtime. The blocking reqwest
/// client owns its own runtime and must be created and dropped here.
pub async fn run_blocking<T, F>(f: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .expect("blocking task panicked")
}

/// Client without credentials pointed at `base_url`.
pub fn public_client(base_url: &str) -> Client {
    Client::new(ClientConfig::new().with_base_url(base_url)).expect("failed to build client")
}

/// Client with both credentials pointed at `base_url`.
pub fn authed_client(base_url: &str) -> Client {
    Client::new(ClientConfig::with_credentials(API_KEY, USER_ID).with_base_url(base_url))
        .expect("failed to build client")
}

/// Authenticated client with a short default timeout.
pub fn impatient_client(base_url: &str, timeout: Duration) -> Client {
    Client::new(
        ClientConfig::with_credentials(API_KEY, USER_ID)
            .with_base_url(base_url)
            .with_timeout(timeout),
    )
    .expect("failed to build client")
}
