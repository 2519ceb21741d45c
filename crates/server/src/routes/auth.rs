use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use common::types::ApiResponse;
use serde::Serialize;
use service::auth::domain::{
    AuthSession, ForgotPasswordInput, LoginInput, PublicAccount, RegisterAdminInput, RegisterUserInput,
    ResetPasswordInput, VerifyEmailInput,
};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{ServerState, AUTH_COOKIE};
use crate::errors::ApiError;
use crate::extract::AppJson;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredData {
    pub user_id: Uuid,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminRegisteredData {
    pub admin_id: Uuid,
}

#[derive(Serialize)]
pub struct LoginData {
    pub token: String,
    pub user: PublicAccount,
}

type Envelope<T> = Json<ApiResponse<T>>;

fn session_cookie(jar: CookieJar, token: &str) -> CookieJar {
    let mut cookie = Cookie::new(AUTH_COOKIE, token.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    jar.add(cookie)
}

fn login_reply(jar: CookieJar, session: AuthSession) -> (CookieJar, Envelope<LoginData>) {
    let jar = session_cookie(jar, &session.token);
    let data = LoginData { token: session.token, user: session.account };
    (jar, Json(ApiResponse::ok("Login successful", data)))
}

#[utoipa::path(post, path = "/register", tag = "auth", request_body = crate::openapi::RegisterUserRequest, responses((status = 200, description = "Registered, verification code sent"), (status = 400, description = "Validation error or email already registered"), (status = 500, description = "Internal server error")))]
pub async fn register(
    State(state): State<ServerState>,
    AppJson(input): AppJson<RegisterUserInput>,
) -> Result<Envelope<RegisteredData>, ApiError> {
    let user_id = state.auth.register_user(input).await?;
    Ok(Json(ApiResponse::ok(
        "Registration successful. Please check your email for the verification code.",
        RegisteredData { user_id },
    )))
}

#[utoipa::path(post, path = "/admin/register", tag = "auth", request_body = crate::openapi::RegisterAdminRequest, responses((status = 200, description = "Registered, verification code sent"), (status = 400, description = "Validation error or email already registered")))]
pub async fn register_admin(
    State(state): State<ServerState>,
    AppJson(input): AppJson<RegisterAdminInput>,
) -> Result<Envelope<AdminRegisteredData>, ApiError> {
    let admin_id = state.auth.register_admin(input).await?;
    Ok(Json(ApiResponse::ok(
        "Admin registration successful. Please check your email for the verification code.",
        AdminRegisteredData { admin_id },
    )))
}

#[utoipa::path(post, path = "/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged in; token also set as auth_token cookie"), (status = 401, description = "Invalid credentials, unverified or unapproved")))]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    AppJson(input): AppJson<LoginInput>,
) -> Result<(CookieJar, Envelope<LoginData>), ApiError> {
    let session = state.auth.login_user(input).await?;
    Ok(login_reply(jar, session))
}

#[utoipa::path(post, path = "/admin/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged in"), (status = 401, description = "Invalid credentials or unverified")))]
pub async fn login_admin(
    State(state): State<ServerState>,
    jar: CookieJar,
    AppJson(input): AppJson<LoginInput>,
) -> Result<(CookieJar, Envelope<LoginData>), ApiError> {
    let session = state.auth.login_admin(input).await?;
    Ok(login_reply(jar, session))
}

#[utoipa::path(post, path = "/verify-email", tag = "auth", request_body = crate::openapi::VerifyEmailRequest, responses((status = 200, description = "Email verified"), (status = 400, description = "Invalid or expired code"), (status = 404, description = "Account not found")))]
pub async fn verify_email(
    State(state): State<ServerState>,
    AppJson(input): AppJson<VerifyEmailInput>,
) -> Result<Envelope<()>, ApiError> {
    state.auth.verify_user_email(input).await?;
    Ok(Json(ApiResponse::message("Email verified successfully")))
}

#[utoipa::path(post, path = "/admin/verify-email", tag = "auth", request_body = crate::openapi::VerifyEmailRequest, responses((status = 200, description = "Email verified"), (status = 400, description = "Invalid or expired code"), (status = 404, description = "Account not found")))]
pub async fn verify_admin_email(
    State(state): State<ServerState>,
    AppJson(input): AppJson<VerifyEmailInput>,
) -> Result<Envelope<()>, ApiError> {
    state.auth.verify_admin_email(input).await?;
    Ok(Json(ApiResponse::message("Email verified successfully")))
}

#[utoipa::path(post, path = "/forgot-password", tag = "auth", request_body = crate::openapi::ForgotPasswordRequest, responses((status = 200, description = "Reset code sent"), (status = 400, description = "Invalid role"), (status = 401, description = "Email not verified"), (status = 404, description = "Account not found")))]
pub async fn forgot_password(
    State(state): State<ServerState>,
    AppJson(input): AppJson<ForgotPasswordInput>,
) -> Result<Envelope<()>, ApiError> {
    state.auth.forgot_password(input).await?;
    Ok(Json(ApiResponse::message("Password reset code sent to your email")))
}

#[utoipa::path(post, path = "/reset-password", tag = "auth", request_body = crate::openapi::ResetPasswordRequest, responses((status = 200, description = "Password reset"), (status = 400, description = "Validation error or invalid code"), (status = 404, description = "Account not found")))]
pub async fn reset_password(
    State(state): State<ServerState>,
    AppJson(input): AppJson<ResetPasswordInput>,
) -> Result<Envelope<()>, ApiError> {
    state.auth.reset_password(input).await?;
    Ok(Json(ApiResponse::message("Password reset successful")))
}
