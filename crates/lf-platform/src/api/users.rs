//! Users Admin API
//!
//! REST endpoints for account administration. The router carries its role
//! requirement, attached once at registration.

use axum::extract::{Path, Query, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::api::common::{PaginatedResponse, PaginationParams};
use crate::api::middleware::{with_role_requirement, Authenticated};
use crate::domain::{AccountStatus, RoleRequirement, User, UserRole};
use crate::error::PlatformError;
use crate::store::UserStore;

/// Update account status request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    /// New status (ACTIVE, BLOCKED, DELETED)
    pub status: String,
}

/// Update role request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    /// New role (STUDENT, INSTRUCTOR, ADMIN, SUPER_ADMIN)
    pub role: String,
}

/// User response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            role: u.role.as_str().to_string(),
            status: u.status.as_str().to_string(),
            created_at: u.created_at.to_rfc3339(),
            updated_at: u.updated_at.to_rfc3339(),
        }
    }
}

/// Users service state
#[derive(Clone)]
pub struct UsersState {
    pub user_store: Arc<dyn UserStore>,
}

fn parse_status(s: &str) -> Result<AccountStatus, PlatformError> {
    AccountStatus::parse(s)
        .ok_or_else(|| PlatformError::validation(format!("Invalid status: {}", s)))
}

fn parse_role(s: &str) -> Result<UserRole, PlatformError> {
    UserRole::parse(s).ok_or_else(|| PlatformError::validation(format!("Invalid role: {}", s)))
}

/// List users
#[utoipa::path(
    get,
    path = "",
    tag = "users",
    params(PaginationParams),
    responses(
        (status = 200, description = "Page of users", body = PaginatedResponse<UserResponse>),
        (status = 403, description = "Insufficient role")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<UsersState>,
    _auth: Authenticated,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedResponse<UserResponse>>, PlatformError> {
    let (users, total) = state
        .user_store
        .list(pagination.offset(), pagination.limit)
        .await?;

    let data: Vec<UserResponse> = users.into_iter().map(|u| u.into()).collect();

    Ok(Json(PaginatedResponse::new(
        data,
        pagination.page,
        pagination.limit,
        total,
    )))
}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "users",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<UsersState>,
    _auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, PlatformError> {
    let user = state
        .user_store
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("User", &id))?;

    Ok(Json(user.into()))
}

/// Update account status
///
/// Operator path for blocking, deleting, and reactivating accounts. Takes
/// effect on the subject's next request; their outstanding tokens stay
/// cryptographically valid but stop passing the pipeline.
#[utoipa::path(
    put,
    path = "/{id}/status",
    tag = "users",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user_status(
    State(state): State<UsersState>,
    _auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<UserResponse>, PlatformError> {
    let status = parse_status(&req.status)?;

    state.user_store.update_status(&id, status).await?;

    let user = state
        .user_store
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("User", &id))?;

    Ok(Json(user.into()))
}

/// Update declared role
///
/// Takes effect when the subject next refreshes their tokens; outstanding
/// access tokens keep their embedded role until then.
#[utoipa::path(
    put,
    path = "/{id}/role",
    tag = "users",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user_role(
    State(state): State<UsersState>,
    _auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<UserResponse>, PlatformError> {
    let role = parse_role(&req.role)?;

    state.user_store.update_role(&id, role).await?;

    let user = state
        .user_store
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("User", &id))?;

    Ok(Json(user.into()))
}

/// Create the users router with its role requirement.
pub fn users_router(state: UsersState, requirement: RoleRequirement) -> Router {
    let router = Router::new()
        .route("/", get(list_users))
        .route("/:id", get(get_user))
        .route("/:id/status", put(update_user_status))
        .route("/:id/role", put(update_user_role))
        .with_state(state);

    with_role_requirement(router, requirement)
}
