use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use service::auth::{domain::Role, token::Claims, AuthService};

use crate::errors::ApiError;

pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Clone)]
pub struct ServerState {
    pub auth: Arc<AuthService>,
}

/// Guards profile routes: reads `Authorization: Bearer <token>`, falling
/// back to the `auth_token` cookie, and requires a `user` token. Verified
/// claims are placed in the request extensions.
pub async fn require_user_token(
    State(state): State<ServerState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = req.uri().path().to_string();

    let token = match req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(h) => match h.strip_prefix("Bearer ") {
            Some(t) if !t.trim().is_empty() => t.trim().to_string(),
            _ => {
                tracing::warn!(path = %path, "invalid Authorization format (expect Bearer)");
                return Err(ApiError::Unauthorized("Invalid authorization header".into()));
            }
        },
        None => match jar.get(AUTH_COOKIE).map(|c| c.value().to_string()) {
            Some(t) if !t.is_empty() => t,
            _ => {
                tracing::warn!(path = %path, "missing Authorization header and auth_token cookie");
                return Err(ApiError::Unauthorized("No token provided".into()));
            }
        },
    };

    let claims = state.auth.tokens().verify(&token).map_err(|e| {
        tracing::warn!(path = %path, err = %e, "token validation failed");
        ApiError::Unauthorized("Invalid or expired token".into())
    })?;
    if claims.role != Role::User {
        tracing::warn!(path = %path, role = %claims.role, "token role not allowed");
        return Err(ApiError::Unauthorized("Access denied".into()));
    }

    req.extensions_mut().insert::<Claims>(claims);
    Ok(next.run(req).await)
}
