//! Feed endpoint

use axum::{Json, extract::State};
use serde::Deserialize;

use super::Params;
use crate::AppState;
use crate::api::dto::{BaseResponse, FeedResponse};
use crate::auth::Viewer;
use crate::error::AppError;
use crate::metrics::{HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL};

#[derive(Debug, Deserialize)]
pub struct FeedParams {
    /// Unix milliseconds; absent or 0 starts from now
    pub latest_time: Option<i64>,
}

/// GET /douyin/feed
pub async fn feed(
    State(state): State<AppState>,
    Viewer(viewer_id): Viewer,
    Params(params): Params<FeedParams>,
) -> Result<Json<FeedResponse>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "/douyin/feed"])
        .start_timer();

    let page = state
        .assembler
        .video_feed(params.latest_time.unwrap_or(0), viewer_id)
        .await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/douyin/feed", "200"])
        .inc();

    Ok(Json(FeedResponse {
        base: BaseResponse::success(),
        next_time: page.next_time.unwrap_or(0),
        video_list: page.videos,
    }))
}
