//! Shared application state

use std::sync::Arc;

use crate::auth::JwtManager;
use crate::config::Config;
use crate::consul::{ConsulKvClient, KvStore};
use crate::dns::{DnsResolutionValidator, DomainIpResolver, SystemIpResolver};
use crate::routing::ServiceNameResolver;
use crate::taxinfo::{DummyTaxInfoProvider, HttpTaxInfoProvider, TaxInfoProvider};
use crate::traefik::DomainRoutingService;

/// Application state shared across request handlers.
///
/// Everything here is immutable after startup; the only mutable state lives
/// in the remote config store.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub jwt: Arc<JwtManager>,
    pub domain_routing: Arc<DomainRoutingService>,
    pub service_resolver: Arc<ServiceNameResolver>,
    pub dns_validator: Arc<DnsResolutionValidator>,
    pub tax_info: Arc<dyn TaxInfoProvider>,
}

impl AppState {
    /// Wire up production collaborators from configuration.
    pub fn new(config: Config) -> Self {
        let store: Arc<dyn KvStore> =
            Arc::new(ConsulKvClient::new(config.consul_base_address.clone()));
        let resolver: Arc<dyn DomainIpResolver> = Arc::new(SystemIpResolver::new());
        Self::with_collaborators(config, store, resolver)
    }

    /// Wire up state around injected store and resolver implementations.
    /// Tests use this to substitute deterministic fixtures.
    pub fn with_collaborators(
        config: Config,
        store: Arc<dyn KvStore>,
        resolver: Arc<dyn DomainIpResolver>,
    ) -> Self {
        let jwt = Arc::new(JwtManager::new(&config.jwt_secret));
        let domain_routing = Arc::new(DomainRoutingService::new(store));
        let service_resolver = Arc::new(ServiceNameResolver::new(config.service_mapping.clone()));
        let dns_validator = Arc::new(DnsResolutionValidator::new(
            resolver,
            config.our_service_ips.iter().copied(),
            config.not_resolving_verdict,
        ));
        let tax_info: Arc<dyn TaxInfoProvider> = if config.taxinfo_use_dummy_data {
            Arc::new(DummyTaxInfoProvider)
        } else {
            Arc::new(HttpTaxInfoProvider::new(
                config.taxinfo_base_url.clone(),
                config.taxinfo_username.clone(),
                config.taxinfo_password.clone(),
            ))
        };

        Self {
            config: Arc::new(config),
            jwt,
            domain_routing,
            service_resolver,
            dns_validator,
            tax_info,
        }
    }
}
