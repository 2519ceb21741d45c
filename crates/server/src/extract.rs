use axum::extract::FromRequest;

use crate::errors::ApiError;

/// `axum::Json` whose rejection (bad syntax, wrong content type) is
/// answered with the standard 400 envelope instead of axum's plain text.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);
