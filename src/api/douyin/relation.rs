//! Relation endpoints

use axum::{Json, extract::State};
use serde::Deserialize;

use super::{Params, required};
use crate::AppState;
use crate::api::dto::{BaseResponse, UserListResponse};
use crate::auth::Viewer;
use crate::data::{EdgeAction, UserId};
use crate::error::AppError;
use crate::metrics::{HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL};

#[derive(Debug, Deserialize)]
pub struct RelationActionParams {
    pub to_user_id: Option<UserId>,
    pub action_type: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct RelationListParams {
    pub user_id: Option<UserId>,
}

/// POST /douyin/relation/action
///
/// Anonymous viewers get a success envelope and nothing changes.
pub async fn relation_action(
    State(state): State<AppState>,
    Viewer(viewer_id): Viewer,
    Params(params): Params<RelationActionParams>,
) -> Result<Json<BaseResponse>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["POST", "/douyin/relation/action"])
        .start_timer();

    let to_user_id = required(params.to_user_id, "to_user_id")?;
    let action = EdgeAction::try_from(required(params.action_type, "action_type")?)?;
    state
        .relations
        .apply_follow_action(viewer_id, to_user_id, action)
        .await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["POST", "/douyin/relation/action", "200"])
        .inc();

    Ok(Json(BaseResponse::success()))
}

/// GET /douyin/relation/follow/list
pub async fn follow_list(
    State(state): State<AppState>,
    Viewer(viewer_id): Viewer,
    Params(params): Params<RelationListParams>,
) -> Result<Json<UserListResponse>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "/douyin/relation/follow/list"])
        .start_timer();

    let user_id = required(params.user_id, "user_id")?;
    let user_list = state.assembler.follow_list(user_id, viewer_id).await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/douyin/relation/follow/list", "200"])
        .inc();

    Ok(Json(UserListResponse {
        base: BaseResponse::success(),
        user_list,
    }))
}

/// GET /douyin/relation/follower/list
pub async fn follower_list(
    State(state): State<AppState>,
    Viewer(viewer_id): Viewer,
    Params(params): Params<RelationListParams>,
) -> Result<Json<UserListResponse>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "/douyin/relation/follower/list"])
        .start_timer();

    let user_id = required(params.user_id, "user_id")?;
    let user_list = state.assembler.follower_list(user_id, viewer_id).await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/douyin/relation/follower/list", "200"])
        .inc();

    Ok(Json(UserListResponse {
        base: BaseResponse::success(),
        user_list,
    }))
}
