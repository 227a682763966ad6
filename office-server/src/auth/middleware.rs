//! Authentication middleware
//!
//! Axum middleware for JWT authentication and role gates.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::HeaderMap;
use shared::models::Role;

use crate::auth::{CurrentUser, JwtError, JwtService, cookie};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

/// Routes reachable without a token
const PUBLIC_ROUTES: &[&str] = &[
    "/api/v1/health",
    "/api/v1/user/register",
    "/api/v1/user/login",
    "/api/v1/user/verify",
    "/api/v1/user/password/forgot",
    "/api/v1/user/password/reset",
    "/api/v1/oauth/google",
];

/// Resolve the caller from `Authorization: Bearer` or the signed `token` cookie
pub fn authenticate(state: &ServerState, headers: &HeaderMap) -> Result<CurrentUser, AppError> {
    let bearer = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match bearer {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            let signed = cookie::read(headers, cookie::AUTH_COOKIE).ok_or_else(|| {
                security_log!("WARN", "auth_missing", source = "request");
                AppError::unauthorized()
            })?;
            cookie::verify(&state.config.cookie_secret, signed).ok_or_else(|| {
                security_log!("WARN", "cookie_signature_invalid", source = "cookie");
                AppError::invalid_token("Invalid cookie signature")
            })?
        }
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => CurrentUser::try_from(claims)
            .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {}", e))),
        Err(e) => {
            security_log!("WARN", "auth_failed", error = format!("{}", e));
            match e {
                JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

/// Authentication middleware
///
/// Inserts [`CurrentUser`] into the request extensions.
///
/// Skipped for `OPTIONS` (CORS preflight), non-API paths and
/// [`PUBLIC_ROUTES`].
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let path = req.uri().path();
    if !path.starts_with("/api/") || PUBLIC_ROUTES.contains(&path) {
        return Ok(next.run(req).await);
    }

    let user = authenticate(&state, req.headers())?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Role gate
///
/// ```ignore
/// post(handler::create).route_layer(middleware::from_fn(require_roles(HR_ADMIN)))
/// ```
///
/// Returns 403 when the caller's role is not listed.
pub fn require_roles(
    roles: &'static [Role],
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or(AppError::unauthorized())?;

            if !user.has_any_role(roles) {
                security_log!(
                    "WARN",
                    "role_denied",
                    user_id = user.id,
                    user_role = user.role.as_str()
                );
                return Err(AppError::new(shared::ErrorCode::RoleRequired));
            }

            Ok(next.run(req).await)
        })
    }
}

// Gate sets used by the routers
pub const ADMIN: &[Role] = &[Role::Admin];
pub const HR_ADMIN: &[Role] = &[Role::Hr, Role::Admin];
pub const PM_ADMIN: &[Role] = &[Role::ProjectManager, Role::Admin];
pub const PM_ONLY: &[Role] = &[Role::ProjectManager];
pub const HR_ADMIN_PM: &[Role] = &[Role::Hr, Role::Admin, Role::ProjectManager];
/// Roles that clock in and file requests
pub const STAFF: &[Role] = &[Role::Employee, Role::ProjectManager];
