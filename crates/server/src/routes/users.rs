use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use service::user::domain::{UserInput, UserResponse};
use tracing::info;

use crate::{errors::JsonApiError, routes::ServerState};

#[utoipa::path(
    post, path = "/api/users", tag = "users",
    request_body = crate::openapi::UserRequestDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::UserResponseDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorBodyDoc),
        (status = 409, description = "Email or phone number already registered", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn create_user(
    State(state): State<ServerState>,
    payload: Result<Json<UserInput>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), JsonApiError> {
    let Json(input) = payload?;
    info!(email = %input.email, "POST /api/users - creating user");
    input.validate()?;
    let created = state.users.create(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/api/users", tag = "users",
    responses((status = 200, description = "List OK", body = [crate::openapi::UserResponseDoc]))
)]
pub async fn list_users(State(state): State<ServerState>) -> Result<Json<Vec<UserResponse>>, JsonApiError> {
    info!("GET /api/users - fetching all users");
    let users = state.users.list().await?;
    Ok(Json(users))
}

#[utoipa::path(
    get, path = "/api/users/{id}", tag = "users",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::UserResponseDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn get_user(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<UserResponse>, JsonApiError> {
    let Path(id) = id?;
    info!(id, "GET /api/users/:id - fetching user");
    let user = state.users.get(id).await?;
    Ok(Json(user))
}

#[utoipa::path(
    put, path = "/api/users/{id}", tag = "users",
    params(("id" = i64, Path, description = "User ID")),
    request_body = crate::openapi::UserRequestDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::UserResponseDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorBodyDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorBodyDoc),
        (status = 409, description = "Email or phone number already registered", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn update_user(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UserInput>, JsonRejection>,
) -> Result<Json<UserResponse>, JsonApiError> {
    let Path(id) = id?;
    let Json(input) = payload?;
    info!(id, "PUT /api/users/:id - updating user");
    input.validate()?;
    let updated = state.users.update(id, input).await?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete, path = "/api/users/{id}", tag = "users",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn delete_user(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, JsonApiError> {
    let Path(id) = id?;
    info!(id, "DELETE /api/users/:id - deleting user");
    state.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
