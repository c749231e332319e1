//! Consul KV client for Traefik dynamic configuration
//!
//! The reverse proxy reads its router definitions from Consul's key/value
//! store. This module issues the raw key writes and recursive deletes the
//! routing orchestrator needs.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

/// Key/value store operations the routing orchestrator depends on.
///
/// `delete_recursive` follows an "ensure absent" contract: deleting a key
/// that does not exist is a success.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn put_string(&self, path: &str, value: &str) -> Result<(), ConsulError>;
    async fn delete_recursive(&self, path: &str) -> Result<(), ConsulError>;
}

/// HTTP client for the Consul KV API
#[derive(Clone)]
pub struct ConsulKvClient {
    client: Client,
    base_address: String,
}

impl ConsulKvClient {
    pub fn new(base_address: String) -> Self {
        Self {
            client: Client::new(),
            base_address: base_address.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_address, path)
    }
}

#[async_trait]
impl KvStore for ConsulKvClient {
    async fn put_string(&self, path: &str, value: &str) -> Result<(), ConsulError> {
        let response = self
            .client
            .put(self.url(path))
            .body(value.to_string())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConsulError::UnexpectedStatus { status });
        }

        Ok(())
    }

    async fn delete_recursive(&self, path: &str) -> Result<(), ConsulError> {
        let response = self
            .client
            .delete(self.url(path))
            .query(&[("recurse", "true")])
            .send()
            .await?;

        let status = response.status();
        // Consul's recursive delete is naturally idempotent; normalize a
        // not-found answer to success to keep the "ensure absent" contract.
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            return Err(ConsulError::UnexpectedStatus { status });
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConsulError {
    #[error("Failed to reach Consul: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Consul returned unexpected status {status}")]
    UnexpectedStatus { status: StatusCode },
}
