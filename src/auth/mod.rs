//! Authentication for the custom domain API

pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, JwtError, JwtManager};
pub use middleware::{require_auth, AuthUser};
