use axum::{extract::State, Extension, Json};
use common::types::ApiResponse;
use service::auth::domain::{ChangePasswordInput, UpdateProfileInput, UserProfile};
use service::auth::token::Claims;

use crate::auth::ServerState;
use crate::errors::ApiError;
use crate::extract::AppJson;

#[utoipa::path(get, path = "/profile", tag = "profile", security(("bearer" = [])), responses((status = 200, description = "Current user's profile"), (status = 401, description = "Missing or invalid token"), (status = 404, description = "User not found")))]
pub async fn get_profile(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    let profile = state.auth.get_profile(claims.id).await?;
    Ok(Json(ApiResponse::ok("Profile retrieved", profile)))
}

#[utoipa::path(put, path = "/profile", tag = "profile", security(("bearer" = [])), request_body = crate::openapi::UpdateProfileRequest, responses((status = 200, description = "Profile updated"), (status = 400, description = "Invalid email or already registered"), (status = 401, description = "Missing or invalid token")))]
pub async fn update_profile(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    AppJson(input): AppJson<UpdateProfileInput>,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    let profile = state.auth.update_profile(claims.id, input).await?;
    Ok(Json(ApiResponse::ok("Profile updated successfully", profile)))
}

#[utoipa::path(put, path = "/change-password", tag = "profile", security(("bearer" = [])), request_body = crate::openapi::ChangePasswordRequest, responses((status = 200, description = "Password changed"), (status = 401, description = "Current password is incorrect or token invalid")))]
pub async fn change_password(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    AppJson(input): AppJson<ChangePasswordInput>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.auth.change_password(claims.id, input).await?;
    Ok(Json(ApiResponse::message("Password changed successfully")))
}
