//! Custom Domain API library
//!
//! Registers, validates, and removes Traefik custom domain routes held in a
//! Consul key/value store, and exposes a taxpayer lookup by CUIT.

pub mod auth;
pub mod config;
pub mod consul;
pub mod dns;
pub mod error;
pub mod routes;
pub mod routing;
pub mod state;
pub mod taxinfo;
pub mod traefik;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use state::AppState;
