//! API routes

pub mod domains;
pub mod health;
pub mod taxinfo;

use axum::{
    http::Method,
    middleware,
    routing::{get, put},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{auth::require_auth, state::AppState};

/// Create all API routes
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(home))
        .route("/health", get(health::health));

    let protected_routes = Router::new()
        .route("/taxinfo/by-cuit/:cuit", get(taxinfo::tax_info_by_cuit))
        .route("/:domain_name/_ip-resolution", get(domains::validate_ip_resolution))
        .route(
            "/:domain_name",
            put(domains::create_custom_domain).delete(domains::delete_custom_domain),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

async fn home() -> &'static str {
    "Custom Domain Service"
}

// The dashboard calls this API cross-origin with credentials, so the origin
// and headers are mirrored rather than wildcarded.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_methods([Method::GET, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_credentials(true)
}
