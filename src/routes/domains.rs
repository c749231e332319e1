//! Custom domain route management
//!
//! These endpoints register and remove the Traefik routes that make a
//! customer-owned domain (e.g. news.customer.com) reach one of our
//! services.

use axum::extract::{Extension, Path, State};
use axum::Json;
use serde::Deserialize;

use crate::dns::DnsValidationVerdict;
use crate::error::{ApiError, ApiResult};
use crate::traefik::RuleType;
use crate::{auth::AuthUser, state::AppState};

#[derive(Debug, Deserialize)]
pub struct DomainConfiguration {
    /// Public-facing service name, resolved against the configured mapping
    pub service: String,
    #[serde(rename = "ruleType")]
    pub rule_type: RuleType,
}

/// Register the Traefik routes for a custom domain
pub async fn create_custom_domain(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(domain_name): Path<String>,
    Json(configuration): Json<DomainConfiguration>,
) -> ApiResult<&'static str> {
    if !auth_user.is_superuser {
        return Err(ApiError::Forbidden);
    }

    let service_name = state
        .service_resolver
        .resolve(&configuration.service)
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "Cannot find the service called: {}",
                configuration.service
            ))
        })?
        .to_string();

    let validation = state.dns_validator.validate(&domain_name).await;

    if validation.is_pointing_to_our_service {
        state
            .domain_routing
            .create_custom_domain(&domain_name, &service_name, configuration.rule_type)
            .await?;
    } else {
        match validation.verdict {
            DnsValidationVerdict::Allow => {
                tracing::warn!(
                    "{domain_name} does not resolve to our service IP address, but it will be registered. Result: {validation:?}"
                );
                state
                    .domain_routing
                    .create_custom_domain(&domain_name, &service_name, configuration.rule_type)
                    .await?;
            }
            DnsValidationVerdict::Ignore => {
                tracing::warn!(
                    "{domain_name} does not resolve to our service IP address, it will not be registered. Result: {validation:?}"
                );
            }
        }
    }

    Ok("Custom Domain Created")
}

/// Remove every Traefik route for a custom domain
pub async fn delete_custom_domain(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(domain_name): Path<String>,
) -> ApiResult<&'static str> {
    if !auth_user.is_superuser {
        return Err(ApiError::Forbidden);
    }

    state.domain_routing.delete_custom_domain(&domain_name).await?;

    Ok("Custom Domain Deleted")
}

/// Report whether a domain currently resolves to our service
pub async fn validate_ip_resolution(
    State(state): State<AppState>,
    Path(domain_name): Path<String>,
) -> ApiResult<String> {
    let validation = state.dns_validator.validate(&domain_name).await;

    if !validation.is_pointing_to_our_service {
        return Err(ApiError::BadRequest(format!(
            "{domain_name} does not resolve to our service IP address"
        )));
    }

    Ok(format!("{domain_name} resolves to our service IP address"))
}
