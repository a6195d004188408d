//! User endpoints

use axum::{Json, extract::State};
use serde::Deserialize;

use super::{Params, required};
use crate::AppState;
use crate::api::dto::{BaseResponse, UserIdResponse, UserResponse};
use crate::auth::Viewer;
use crate::data::UserId;
use crate::error::AppError;
use crate::metrics::{HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL};

#[derive(Debug, Deserialize)]
pub struct CredentialParams {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserParams {
    pub user_id: Option<UserId>,
}

/// POST /douyin/user/register
pub async fn register(
    State(state): State<AppState>,
    Params(params): Params<CredentialParams>,
) -> Result<Json<UserIdResponse>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["POST", "/douyin/user/register"])
        .start_timer();

    let username = required(params.username, "username")?;
    let password = required(params.password, "password")?;
    let user = state.users.register(&username, &password).await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["POST", "/douyin/user/register", "200"])
        .inc();

    Ok(Json(UserIdResponse {
        base: BaseResponse::success(),
        user_id: user.id,
    }))
}

/// POST /douyin/user/login
///
/// Checks the password only; the gateway in front issues tokens.
pub async fn login(
    State(state): State<AppState>,
    Params(params): Params<CredentialParams>,
) -> Result<Json<UserIdResponse>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["POST", "/douyin/user/login"])
        .start_timer();

    let username = required(params.username, "username")?;
    let password = required(params.password, "password")?;
    let user = state.users.verify_credentials(&username, &password).await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["POST", "/douyin/user/login", "200"])
        .inc();

    Ok(Json(UserIdResponse {
        base: BaseResponse::success(),
        user_id: user.id,
    }))
}

/// GET /douyin/user
pub async fn user_info(
    State(state): State<AppState>,
    Viewer(viewer_id): Viewer,
    Params(params): Params<UserParams>,
) -> Result<Json<UserResponse>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "/douyin/user"])
        .start_timer();

    let user_id = required(params.user_id, "user_id")?;
    let user = state.assembler.user_profile(user_id, viewer_id).await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/douyin/user", "200"])
        .inc();

    Ok(Json(UserResponse {
        base: BaseResponse::success(),
        user,
    }))
}
