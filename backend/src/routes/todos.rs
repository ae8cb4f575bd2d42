//! Todo routes
//!
//! All routes sit behind the authentication gate and act on the caller's
//! todos only.

use crate::auth::{authenticate, AuthenticatedIdentity};
use crate::error::ApiResult;
use crate::extract::Json;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    middleware,
    routing::get,
    Router,
};
use todo_api_shared::{CreateTodoRequest, Todo, TodoListResponse, TodoResponse, UpdateTodoRequest};

/// Create todo routes
pub fn todo_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/:id",
            get(get_todo).delete(delete_todo).patch(update_todo),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate))
}

/// POST /todos
async fn create_todo(
    State(state): State<AppState>,
    identity: AuthenticatedIdentity,
    Json(req): Json<CreateTodoRequest>,
) -> ApiResult<Json<Todo>> {
    let todo = state.todos().create(identity.user.id, &req.text).await?;
    Ok(Json(todo))
}

/// GET /todos
async fn list_todos(
    State(state): State<AppState>,
    identity: AuthenticatedIdentity,
) -> ApiResult<Json<TodoListResponse>> {
    let todos = state.todos().list(identity.user.id).await?;
    Ok(Json(TodoListResponse { todos }))
}

/// GET /todos/:id
async fn get_todo(
    State(state): State<AppState>,
    identity: AuthenticatedIdentity,
    Path(id): Path<String>,
) -> ApiResult<Json<TodoResponse>> {
    let todo = state.todos().get(identity.user.id, &id).await?;
    Ok(Json(TodoResponse { todo }))
}

/// PATCH /todos/:id
async fn update_todo(
    State(state): State<AppState>,
    identity: AuthenticatedIdentity,
    Path(id): Path<String>,
    Json(req): Json<UpdateTodoRequest>,
) -> ApiResult<Json<TodoResponse>> {
    let todo = state.todos().update(identity.user.id, &id, req).await?;
    Ok(Json(TodoResponse { todo }))
}

/// DELETE /todos/:id
async fn delete_todo(
    State(state): State<AppState>,
    identity: AuthenticatedIdentity,
    Path(id): Path<String>,
) -> ApiResult<Json<TodoResponse>> {
    let todo = state.todos().delete(identity.user.id, &id).await?;
    Ok(Json(TodoResponse { todo }))
}
