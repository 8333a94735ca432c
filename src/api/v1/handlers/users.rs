/*
 * Responsibility
 * - /users 系 CRUD handler
 * - Path/Json を extractor で受け、DTO validation → store 呼び出し
 * - store は key-value contract (get/put/delete/scan) のみに依存する
 */
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    api::v1::dto::users::{CreateUserRequest, UpdateUserRequest, UserResponse},
    api::v1::extractors::AuthCtxExtractor,
    error::AppError,
    repos::UserRecord,
    state::AppState,
};

pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = state.store.scan().await?;
    let res = users.into_iter().map(UserResponse::from).collect();

    Ok(Json(res))
}

pub async fn create_user(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let Json(req) = body.map_err(|e| AppError::bad_request("INVALID_BODY", e.body_text()))?;
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_ATTRIBUTES", msg))?;

    let user = UserRecord {
        user_id: Uuid::new_v4().to_string(),
        attributes: req.attributes,
    };
    state.store.put(&user).await?;

    tracing::info!(subject = %ctx.subject, jti = ?ctx.jti, user_id = %user.user_id, "user created");

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .store
        .get(&user_id)
        .await?
        .ok_or(AppError::not_found("user"))?;

    Ok(Json(UserResponse::from(user)))
}

pub async fn update_user(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(user_id): Path<String>,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, AppError> {
    let Json(req) = body.map_err(|e| AppError::bad_request("INVALID_BODY", e.body_text()))?;
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_ATTRIBUTES", msg))?;

    // Partial update: merge request attributes over the stored ones.
    let mut user = state
        .store
        .get(&user_id)
        .await?
        .ok_or(AppError::not_found("user"))?;
    user.attributes.extend(req.attributes);

    state.store.put(&user).await?;

    tracing::info!(subject = %ctx.subject, user_id = %user.user_id, "user updated");

    Ok(Json(UserResponse::from(user)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(user_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let deleted = state.store.delete(&user_id).await?;

    // Deleting an absent user is a clean 404; repeat deletes are safe.
    if deleted {
        tracing::info!(subject = %ctx.subject, jti = ?ctx.jti, user_id = %user_id, "user deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("user"))
    }
}
