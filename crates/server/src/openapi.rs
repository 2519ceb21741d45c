//! Request/response shapes for the generated OpenAPI document. The handlers
//! deserialize into the service input types; these mirror them for docs.

use serde::Serialize;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

#[derive(ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub plate_number: String,
    /// `HH:MM` or `HH:MM:SS`
    pub preferred_entry_time: String,
    /// Must be after `preferredEntryTime`.
    pub preferred_exit_time: String,
}

#[derive(ToSchema)]
pub struct RegisterAdminRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub code: String,
}

#[derive(ToSchema)]
pub struct ForgotPasswordRequest {
    pub email: String,
    /// `user` or `admin`
    pub role: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    /// At least 8 characters.
    pub new_password: String,
    pub role: String,
}

#[derive(ToSchema)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::register_admin,
        crate::routes::auth::login,
        crate::routes::auth::login_admin,
        crate::routes::auth::verify_email,
        crate::routes::auth::verify_admin_email,
        crate::routes::auth::forgot_password,
        crate::routes::auth::reset_password,
        crate::routes::profile::get_profile,
        crate::routes::profile::update_profile,
        crate::routes::profile::change_password,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterUserRequest,
            RegisterAdminRequest,
            LoginRequest,
            VerifyEmailRequest,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            UpdateProfileRequest,
            ChangePasswordRequest,
            crate::routes::auth::RegisteredData,
            crate::routes::auth::AdminRegisteredData,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "profile")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in ["/register", "/admin/login", "/reset-password", "/profile", "/change-password", "/health"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json["components"]["securitySchemes"]["bearer"].is_object());
    }
}
