//! OpenAPI Document

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::{auth, common, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LearnForge Platform API",
        description = "Identity and access-control APIs for the LearnForge learning platform",
        version = "0.1.0"
    ),
    paths(
        auth::register,
        auth::login,
        auth::refresh_token,
        auth::forgot_password,
        auth::change_password,
        auth::get_current_user,
        users::list_users,
        users::get_user,
        users::update_user_status,
        users::update_user_role,
    ),
    components(schemas(
        auth::RegisterRequest,
        auth::LoginRequest,
        auth::LoginResponse,
        auth::RefreshTokenRequest,
        auth::ForgotPasswordRequest,
        auth::ChangePasswordRequest,
        auth::CurrentUserResponse,
        users::UpdateStatusRequest,
        users::UpdateRoleRequest,
        users::UserResponse,
        common::ApiError,
        common::SuccessResponse,
        common::CreatedResponse,
        common::PaginatedResponse<users::UserResponse>,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication and credential management"),
        (name = "users", description = "Account administration")
    )
)]
pub struct PlatformApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
