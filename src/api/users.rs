use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::auth::CurrentUser;
use super::error::{booking_error, ApiError, ErrorResponse};
use super::AppState;
use crate::services::BookingError;

/// User row as exposed to the admin surface; passwords never leave storage.
#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct UserView {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Number of bookings made under this username
    pub bookings: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct UserListQuery {
    /// Substring filter over username and email
    pub q: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

const USER_VIEW: &str = "SELECT u.id, u.username, u.email,
        (SELECT COUNT(*) FROM bookings b WHERE b.username = u.username) AS bookings
     FROM users u";

/// List users with their booking counts
#[utoipa::path(
    get,
    path = "/api/users",
    params(UserListQuery),
    responses(
        (status = 200, description = "Users in insertion order", body = [UserView]),
        (status = 401, description = "Login required", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Vec<UserView>>, ApiError> {
    user.context().require_user().map_err(booking_error)?;

    let users: Vec<UserView> = match query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => sqlx::query_as(&format!(
            "{USER_VIEW} WHERE u.username LIKE '%' || ?1 || '%' OR u.email LIKE '%' || ?1 || '%'
             ORDER BY u.id"
        ))
        .bind(q)
        .fetch_all(&state.pool)
        .await
        .map_err(|e| booking_error(e.into()))?,
        None => sqlx::query_as(&format!("{USER_VIEW} ORDER BY u.id"))
            .fetch_all(&state.pool)
            .await
            .map_err(|e| booking_error(e.into()))?,
    };
    Ok(Json(users))
}

/// Create a user
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserView),
        (status = 409, description = "Duplicate username", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserView>), ApiError> {
    user.context().require_user().map_err(booking_error)?;

    let created: UserView = sqlx::query_as(
        "INSERT INTO users (username, email, password) VALUES (?, ?, ?)
         RETURNING id, username, email, 0 AS bookings",
    )
    .bind(request.username.trim())
    .bind(request.email.trim())
    .bind(&request.password)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| booking_error(e.into()))?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a user's username or email
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserView),
        (status = 404, description = "Unknown user", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserView>, ApiError> {
    user.context().require_user().map_err(booking_error)?;

    let updated: Option<UserView> = sqlx::query_as(
        "UPDATE users SET username = COALESCE(?, username), email = COALESCE(?, email)
         WHERE id = ?
         RETURNING id, username, email,
             (SELECT COUNT(*) FROM bookings b WHERE b.username = users.username) AS bookings",
    )
    .bind(request.username.as_deref().map(str::trim))
    .bind(request.email.as_deref().map(str::trim))
    .bind(id)
    .fetch_optional(&state.pool)
    .await
    .map_err(|e| booking_error(e.into()))?;

    let updated = updated.ok_or_else(|| booking_error(BookingError::NotFound("User")))?;
    Ok(Json(updated))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "Unknown user", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    user.context().require_user().map_err(booking_error)?;

    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(&state.pool)
        .await
        .map_err(|e| booking_error(e.into()))?;
    if result.rows_affected() == 0 {
        return Err(booking_error(BookingError::NotFound("User")));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/{id}", axum::routing::put(update_user).delete(delete_user))
        .with_state(state)
}
