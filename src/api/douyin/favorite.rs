//! Favorite endpoints

use axum::{Json, extract::State};
use serde::Deserialize;

use super::{Params, required};
use crate::AppState;
use crate::api::dto::{BaseResponse, VideoListResponse};
use crate::auth::Viewer;
use crate::data::{EdgeAction, UserId};
use crate::error::AppError;
use crate::metrics::{HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL};

#[derive(Debug, Deserialize)]
pub struct FavoriteActionParams {
    pub video_id: Option<i64>,
    pub action_type: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct FavoriteListParams {
    pub user_id: Option<UserId>,
}

/// POST /douyin/favorite/action
pub async fn favorite_action(
    State(state): State<AppState>,
    Viewer(viewer_id): Viewer,
    Params(params): Params<FavoriteActionParams>,
) -> Result<Json<BaseResponse>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["POST", "/douyin/favorite/action"])
        .start_timer();

    let video_id = required(params.video_id, "video_id")?;
    let action = EdgeAction::try_from(required(params.action_type, "action_type")?)?;

    // Anonymous viewers are rejected by the service, not here
    state
        .favorites
        .favorite_by_user(viewer_id, video_id, action)
        .await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["POST", "/douyin/favorite/action", "200"])
        .inc();

    Ok(Json(BaseResponse::success()))
}

/// GET /douyin/favorite/list
pub async fn favorite_list(
    State(state): State<AppState>,
    Viewer(viewer_id): Viewer,
    Params(params): Params<FavoriteListParams>,
) -> Result<Json<VideoListResponse>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "/douyin/favorite/list"])
        .start_timer();

    let user_id = required(params.user_id, "user_id")?;
    let video_list = state.assembler.favorite_list(user_id, viewer_id).await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/douyin/favorite/list", "200"])
        .inc();

    Ok(Json(VideoListResponse {
        base: BaseResponse::success(),
        video_list,
    }))
}
