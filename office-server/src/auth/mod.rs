//! Authentication and authorization
//!
//! - [`JwtService`] - token issue/validation
//! - [`CurrentUser`] - authenticated caller
//! - [`require_auth`] - authentication middleware
//! - [`require_roles`] - role gate middleware
//! - [`cookie`] - signed auth cookie
//! - [`password`] - argon2 hashing

pub mod cookie;
pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{
    ADMIN, HR_ADMIN, HR_ADMIN_PM, PM_ADMIN, PM_ONLY, STAFF, authenticate, require_auth,
    require_roles,
};
