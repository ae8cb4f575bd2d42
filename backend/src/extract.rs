//! Request extractors
//!
//! [`Json`] stands in for `axum::Json` in handlers so that malformed bodies,
//! wrongly typed fields and a missing `Content-Type` come back as
//! [`ApiError::BadRequest`] instead of axum's plain-text 415/422.

use crate::error::ApiError;
use axum::{
    extract::FromRequest,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}
