//! Authentication gate
//!
//! Per-request middleware for protected routes:
//!
//! `START -> TOKEN_EXTRACTED -> RESOLVED -> ALLOWED`
//!
//! Any failed step rejects the request with an empty 401. The gate makes no
//! ownership decisions; handlers read the [`AuthenticatedIdentity`] and
//! scope their queries to it.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use todo_api_shared::{AuthError, User};
use tracing::debug;

/// Header carrying the bearer token, on requests and on login responses
pub const AUTH_HEADER: &str = "x-auth";

/// Identity established by the gate for the current request
#[derive(Debug, Clone)]
pub struct AuthenticatedIdentity {
    pub user: User,
    /// The exact token presented, needed for logout
    pub token: String,
}

/// Gate middleware, layered with `axum::middleware::from_fn_with_state`
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTH_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .ok_or_else(|| {
            debug!(path = %request.uri().path(), "Missing auth header");
            AuthError::MissingToken
        })?;

    let user = state.users().resolve_token(&token).await?;

    request
        .extensions_mut()
        .insert(AuthenticatedIdentity { user, token });

    Ok(next.run(request).await)
}

/// Handlers behind the gate take the identity as an extractor.
/// Outside the gate it is never present and the request is rejected.
#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedIdentity>()
            .cloned()
            .ok_or(ApiError::Unauthenticated)
    }
}
