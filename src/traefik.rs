//! Domain routing orchestration
//!
//! Translates a create/delete intent for one domain into the ordered set of
//! Consul key writes and deletes that make Traefik serve (or stop serving)
//! it. Two key groups exist per domain, `https_<domain>` and `http_<domain>`;
//! switching rule types must leave only the keys the new rule type implies.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::consul::{ConsulError, KvStore};

const WEBSECURE_ENTRY_POINT: &str = "websecure_entry_point";
const WEB_ENTRY_POINT: &str = "web_entry_point";
const LETSENCRYPT_RESOLVER: &str = "letsencryptresolver";
const HTTP_TO_HTTPS_MIDDLEWARE: &str = "http_to_https@file";

/// Traffic rule for a custom domain. Exactly one is active per domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleType {
    /// HTTPS plus an HTTP-to-HTTPS redirect.
    HttpsOnly,
    /// Both protocols served independently, no redirect.
    HttpsAndHttp,
    /// HTTP only; the HTTPS router is removed.
    HttpOnly,
}

/// Issues the ordered store operations for custom domain routes.
///
/// Operations run strictly sequentially. A failure aborts the remaining
/// steps without rolling back what was already applied; a retry of the same
/// call converges because every key write is idempotent.
pub struct DomainRoutingService {
    store: Arc<dyn KvStore>,
}

impl DomainRoutingService {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub async fn create_custom_domain(
        &self,
        domain: &str,
        service: &str,
        rule_type: RuleType,
    ) -> Result<(), ConsulError> {
        match rule_type {
            RuleType::HttpsOnly => {
                self.create_https(domain, service).await?;
                self.create_http(domain, service).await?;
                self.create_redirect_rule(domain).await?;
            }
            RuleType::HttpsAndHttp => {
                self.create_https(domain, service).await?;
                self.create_http(domain, service).await?;
                // Drop any redirect left over from a previous HttpsOnly rule.
                self.delete_redirect_rule(domain).await?;
            }
            RuleType::HttpOnly => {
                self.create_http(domain, service).await?;
                self.delete_redirect_rule(domain).await?;
                self.delete_https(domain).await?;
            }
        }

        Ok(())
    }

    pub async fn delete_custom_domain(&self, domain: &str) -> Result<(), ConsulError> {
        self.delete_https(domain).await?;
        self.delete_http(domain).await?;
        // The middlewares key lives under the HTTP group, but delete it
        // explicitly in case it was written under a different prefix layout.
        self.delete_redirect_rule(domain).await?;
        Ok(())
    }

    async fn create_https(&self, domain: &str, service: &str) -> Result<(), ConsulError> {
        let base = https_router_path(domain);

        self.store
            .put_string(&format!("{base}/entrypoints"), WEBSECURE_ENTRY_POINT)
            .await?;
        self.store
            .put_string(&format!("{base}/tls/certresolver"), LETSENCRYPT_RESOLVER)
            .await?;
        self.store
            .put_string(&format!("{base}/rule"), &host_rule(domain))
            .await?;
        self.store.put_string(&format!("{base}/service"), service).await?;

        Ok(())
    }

    async fn create_http(&self, domain: &str, service: &str) -> Result<(), ConsulError> {
        let base = http_router_path(domain);

        self.store
            .put_string(&format!("{base}/entrypoints"), WEB_ENTRY_POINT)
            .await?;
        self.store.put_string(&format!("{base}/service"), service).await?;
        self.store
            .put_string(&format!("{base}/rule"), &host_rule(domain))
            .await?;

        Ok(())
    }

    async fn create_redirect_rule(&self, domain: &str) -> Result<(), ConsulError> {
        let base = http_router_path(domain);
        self.store
            .put_string(&format!("{base}/middlewares"), HTTP_TO_HTTPS_MIDDLEWARE)
            .await
    }

    async fn delete_https(&self, domain: &str) -> Result<(), ConsulError> {
        self.store.delete_recursive(&https_router_path(domain)).await
    }

    async fn delete_http(&self, domain: &str) -> Result<(), ConsulError> {
        self.store.delete_recursive(&http_router_path(domain)).await
    }

    async fn delete_redirect_rule(&self, domain: &str) -> Result<(), ConsulError> {
        let base = http_router_path(domain);
        self.store.delete_recursive(&format!("{base}/middlewares")).await
    }
}

fn https_router_path(domain: &str) -> String {
    format!("/v1/kv/traefik/http/routers/https_{domain}")
}

fn http_router_path(domain: &str) -> String {
    format!("/v1/kv/traefik/http/routers/http_{domain}")
}

fn host_rule(domain: &str) -> String {
    format!("Host(`{domain}`)")
}
