//! Public service name resolution
//!
//! Callers speak in public-facing service names ("relay-tracking"); Traefik
//! routes reference internal service identifiers. The mapping is a static
//! table loaded once from configuration.

use std::collections::HashMap;

/// Maps public service names to internal Traefik service names.
///
/// Exact key match only; no case normalization.
pub struct ServiceNameResolver {
    mapping: HashMap<String, String>,
}

impl ServiceNameResolver {
    pub fn new(mapping: HashMap<String, String>) -> Self {
        Self { mapping }
    }

    pub fn resolve(&self, public_name: &str) -> Option<&str> {
        self.mapping.get(public_name).map(String::as_str)
    }
}
