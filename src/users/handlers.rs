// HTTP handlers for user profile endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::auth::{
    guard,
    middleware::{AuthenticatedUser, RequireAdmin},
    models::UserResponse,
};
use crate::error::ApiError;
use crate::query::{Page, PageParams};
use crate::users::models::UpdateUserRequest;
use crate::AppState;

/// Get a user profile (owner or elevated role)
#[utoipa::path(
    get,
    path = "/api/users/{user_id}",
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not allowed to view this user"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_user_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    guard::match_owner_or_role(&user.claims, &user_id)?;
    let profile = state.users.get(&user_id).await?;
    Ok(Json(profile))
}

/// Update a user profile (owner or elevated role)
#[utoipa::path(
    put,
    path = "/api/users/{user_id}",
    params(("user_id" = String, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid input data"),
        (status = 403, description = "Not allowed to modify this user"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_user_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    guard::match_owner_or_role(&user.claims, &user_id)?;
    let profile = state.users.update(&user_id, request).await?;
    Ok(Json(profile))
}

/// List all users (ADMIN only)
#[utoipa::path(
    get,
    path = "/api/users",
    params(PageParams),
    responses(
        (status = 200, description = "One page of users", body = crate::query::UserPage),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "ADMIN role required")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_users_handler(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<UserResponse>>, ApiError> {
    tracing::debug!("User listing requested by admin {}", admin.user_id());
    let page = state.users.list(params.window()).await?;
    Ok(Json(page))
}
