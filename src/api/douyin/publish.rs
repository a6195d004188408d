//! Publish endpoints

use axum::{Json, extract::State};
use serde::Deserialize;

use super::{Params, required};
use crate::AppState;
use crate::api::dto::{BaseResponse, VideoListResponse};
use crate::auth::Viewer;
use crate::data::{NewVideo, UserId};
use crate::error::AppError;
use crate::metrics::{HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL};

#[derive(Debug, Deserialize)]
pub struct PublishParams {
    pub title: Option<String>,
    pub play_url: Option<String>,
    pub cover_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PublishListParams {
    pub user_id: Option<UserId>,
}

/// POST /douyin/publish/action
///
/// Media is uploaded elsewhere; this records the metadata under the viewer.
pub async fn publish_action(
    State(state): State<AppState>,
    viewer: Viewer,
    Params(params): Params<PublishParams>,
) -> Result<Json<BaseResponse>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["POST", "/douyin/publish/action"])
        .start_timer();

    let author_id = viewer.require()?;
    state
        .publisher
        .create_video(NewVideo {
            author_id,
            play_url: required(params.play_url, "play_url")?,
            cover_url: params.cover_url.unwrap_or_default(),
            title: required(params.title, "title")?,
        })
        .await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["POST", "/douyin/publish/action", "200"])
        .inc();

    Ok(Json(BaseResponse::success()))
}

/// GET /douyin/publish/list
pub async fn publish_list(
    State(state): State<AppState>,
    Viewer(viewer_id): Viewer,
    Params(params): Params<PublishListParams>,
) -> Result<Json<VideoListResponse>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "/douyin/publish/list"])
        .start_timer();

    let user_id = required(params.user_id, "user_id")?;
    let video_list = state.assembler.publish_list(user_id, viewer_id).await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/douyin/publish/list", "200"])
        .inc();

    Ok(Json(VideoListResponse {
        base: BaseResponse::success(),
        video_list,
    }))
}
