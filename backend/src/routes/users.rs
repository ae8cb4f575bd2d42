//! User routes
//!
//! Registration and login answer with the serialized user in the body and a
//! fresh session token in the `x-auth` header.
//!
//! # Performance
//!
//! Password hashing/verification is offloaded to the blocking thread pool
//! by the user directory.

use crate::auth::{authenticate, AuthenticatedIdentity, AUTH_HEADER};
use crate::error::{ApiError, ApiResult};
use crate::extract::Json;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{HeaderName, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use todo_api_shared::{LoginRequest, RegisterRequest, User, UserProfile};
use tracing::error;

/// Create user routes
pub fn user_routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/users/me", get(me))
        .route("/users/me/token", delete(logout))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    Router::new()
        .route("/users", post(register))
        .route("/users/login", post(login))
        .merge(protected)
}

/// Open a session for `user` and build the `x-auth` response
async fn session_response(state: &AppState, user: &User) -> ApiResult<Response> {
    let account = state.users().account(user);
    let token = account.issue_session().await?;
    let header = HeaderValue::from_str(&token)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Token is not a valid header value: {}", e)))?;

    Ok((
        [(HeaderName::from_static(AUTH_HEADER), header)],
        Json(account.profile()),
    )
        .into_response())
}

/// Register a new user
///
/// POST /users
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Response> {
    let user = state.users().create(&req.email, &req.password).await?;
    session_response(&state, &user).await
}

/// Login with email and password
///
/// POST /users/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Response> {
    let user = state
        .users()
        .find_by_credentials(&req.email, &req.password)
        .await?;
    session_response(&state, &user).await
}

/// Current user
///
/// GET /users/me
async fn me(State(state): State<AppState>, identity: AuthenticatedIdentity) -> Json<UserProfile> {
    Json(state.users().account(&identity.user).profile())
}

/// Log out the presented token
///
/// DELETE /users/me/token
///
/// Other sessions of the same user stay valid.
async fn logout(
    State(state): State<AppState>,
    identity: AuthenticatedIdentity,
) -> Result<StatusCode, ApiError> {
    state
        .users()
        .account(&identity.user)
        .revoke_token(&identity.token)
        .await
        .map_err(|e| {
            error!(user_id = %identity.user.id, error = %e, "Failed to revoke token");
            ApiError::BadRequest("Could not log out".to_string())
        })?;

    Ok(StatusCode::OK)
}
