//! Application configuration

use std::collections::HashMap;
use std::env;
use std::net::IpAddr;

use crate::dns::DnsValidationVerdict;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub bind_address: String,

    // Consul KV store backing the Traefik dynamic configuration
    pub consul_base_address: String,

    // DNS validation
    pub our_service_ips: Vec<IpAddr>,
    pub not_resolving_verdict: DnsValidationVerdict,

    // Public service name -> internal Traefik service name
    pub service_mapping: HashMap<String, String>,

    // Authentication
    pub jwt_secret: String,

    // Tax info provider
    pub taxinfo_use_dummy_data: bool,
    pub taxinfo_base_url: String,
    pub taxinfo_username: String,
    pub taxinfo_password: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Server
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),

            // Consul
            consul_base_address: env::var("CONSUL_BASE_ADDRESS")
                .map_err(|_| ConfigError::Missing("CONSUL_BASE_ADDRESS"))?,

            // DNS validation
            our_service_ips: match env::var("OUR_SERVICE_IPS") {
                Ok(raw) => raw
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| {
                        s.parse::<IpAddr>()
                            .map_err(|_| ConfigError::Invalid("OUR_SERVICE_IPS", "expected a comma-separated list of IP addresses"))
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                Err(_) => Vec::new(),
            },
            not_resolving_verdict: match env::var("NOT_RESOLVING_VERDICT") {
                Ok(raw) => raw.parse().map_err(|_| {
                    ConfigError::Invalid("NOT_RESOLVING_VERDICT", "expected `Allow` or `Ignore`")
                })?,
                Err(_) => DnsValidationVerdict::Allow,
            },

            // Service mapping
            service_mapping: match env::var("SERVICE_MAPPING") {
                Ok(raw) => serde_json::from_str(&raw).map_err(|_| {
                    ConfigError::Invalid("SERVICE_MAPPING", "expected a JSON object of string to string")
                })?,
                Err(_) => HashMap::new(),
            },

            // Authentication
            jwt_secret: {
                let secret =
                    env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
                // Reject keys too short to be a real signing secret
                if secret.len() < 32 {
                    return Err(ConfigError::WeakSecret(
                        "JWT_SECRET must be at least 32 characters",
                    ));
                }
                secret
            },

            // Tax info provider
            taxinfo_use_dummy_data: env::var("TAXINFO_USE_DUMMY_DATA")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            taxinfo_base_url: env::var("TAXINFO_BASE_URL").unwrap_or_default(),
            taxinfo_username: env::var("TAXINFO_USERNAME").unwrap_or_default(),
            taxinfo_password: env::var("TAXINFO_PASSWORD").unwrap_or_default(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
    #[error("Weak secret: {0}")]
    WeakSecret(&'static str),
}
