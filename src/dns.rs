//! DNS resolution validation for custom domains
//!
//! Before a route is written, the domain is resolved and classified against
//! the set of IP addresses our edge actually answers on. Resolution that
//! does not point at us is not an error: the configured verdict decides
//! whether the route is created anyway.

use std::collections::HashSet;
use std::net::IpAddr;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::ResolveError;
use trust_dns_resolver::TokioAsyncResolver;

/// Policy applied when a domain does not resolve to our service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnsValidationVerdict {
    /// Register the route anyway (pre-provisioning before DNS propagates).
    Allow,
    /// Skip registration, warn, and still answer success.
    Ignore,
}

impl FromStr for DnsValidationVerdict {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Allow" => Ok(DnsValidationVerdict::Allow),
            "Ignore" => Ok(DnsValidationVerdict::Ignore),
            _ => Err(()),
        }
    }
}

/// Outcome of validating one domain. Produced fresh per call, never cached.
#[derive(Debug, Clone)]
pub struct DnsValidationResult {
    pub domain_name: String,
    pub is_pointing_to_our_service: bool,
    pub verdict: DnsValidationVerdict,
}

/// Address lookup seam, so tests can substitute deterministic fixtures
/// instead of querying live DNS.
#[async_trait]
pub trait DomainIpResolver: Send + Sync {
    async fn lookup_ips(&self, domain_name: &str) -> Result<Vec<IpAddr>, ResolveError>;
}

/// Resolver backed by the system DNS configuration.
pub struct SystemIpResolver {
    resolver: TokioAsyncResolver,
}

impl SystemIpResolver {
    pub fn new() -> Self {
        let resolver = TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|_| {
            TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
        });
        Self { resolver }
    }
}

impl Default for SystemIpResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DomainIpResolver for SystemIpResolver {
    async fn lookup_ips(&self, domain_name: &str) -> Result<Vec<IpAddr>, ResolveError> {
        let lookup = self.resolver.lookup_ip(domain_name).await?;
        Ok(lookup.iter().collect())
    }
}

/// Classifies a domain's resolved addresses against the configured edge IPs.
pub struct DnsResolutionValidator {
    resolver: Arc<dyn DomainIpResolver>,
    our_service_ips: HashSet<IpAddr>,
    not_resolving_verdict: DnsValidationVerdict,
}

impl DnsResolutionValidator {
    pub fn new(
        resolver: Arc<dyn DomainIpResolver>,
        our_service_ips: impl IntoIterator<Item = IpAddr>,
        not_resolving_verdict: DnsValidationVerdict,
    ) -> Self {
        Self {
            resolver,
            our_service_ips: our_service_ips.into_iter().collect(),
            not_resolving_verdict,
        }
    }

    /// Resolve `domain_name` and report whether every resolved address is
    /// one of ours. Resolution failures and empty answers classify as not
    /// pointing to us.
    pub async fn validate(&self, domain_name: &str) -> DnsValidationResult {
        let is_pointing_to_our_service = match self.resolver.lookup_ips(domain_name).await {
            Ok(addresses) => {
                !addresses.is_empty()
                    && addresses.iter().all(|ip| self.our_service_ips.contains(ip))
            }
            Err(err) => {
                tracing::warn!(
                    "Error resolving IP address for {domain_name}, assuming that it is not pointing to our service: {err}"
                );
                false
            }
        };

        DnsValidationResult {
            domain_name: domain_name.to_string(),
            is_pointing_to_our_service,
            verdict: self.not_resolving_verdict,
        }
    }
}
