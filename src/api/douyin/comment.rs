//! Comment endpoints

use axum::{Json, extract::State};
use serde::Deserialize;

use super::{Params, required};
use crate::AppState;
use crate::api::dto::{BaseResponse, CommentActionResponse, CommentListResponse};
use crate::auth::Viewer;
use crate::data::NewComment;
use crate::error::AppError;
use crate::metrics::{HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL};

const POST_COMMENT: i32 = 1;
const DELETE_COMMENT: i32 = 2;

#[derive(Debug, Deserialize)]
pub struct CommentActionParams {
    pub video_id: Option<i64>,
    pub action_type: Option<i32>,
    pub comment_text: Option<String>,
    pub comment_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CommentListParams {
    pub video_id: Option<i64>,
}

/// POST /douyin/comment/action
///
/// `action_type` 1 posts `comment_text` on `video_id`, 2 deletes `comment_id`.
pub async fn comment_action(
    State(state): State<AppState>,
    viewer: Viewer,
    Params(params): Params<CommentActionParams>,
) -> Result<Json<CommentActionResponse>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["POST", "/douyin/comment/action"])
        .start_timer();

    let comment = match required(params.action_type, "action_type")? {
        POST_COMMENT => {
            let posted = state
                .assembler
                .post_comment(NewComment {
                    video_id: required(params.video_id, "video_id")?,
                    user_id: viewer.0,
                    content: required(params.comment_text, "comment_text")?,
                })
                .await?;
            Some(posted)
        }
        DELETE_COMMENT => {
            viewer.require()?;
            let comment_id = required(params.comment_id, "comment_id")?;
            state.comments.delete_comment(comment_id).await?;
            None
        }
        other => {
            return Err(AppError::InvalidParam(format!(
                "unknown action_type {}",
                other
            )));
        }
    };

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["POST", "/douyin/comment/action", "200"])
        .inc();

    Ok(Json(CommentActionResponse {
        base: BaseResponse::success(),
        comment,
    }))
}

/// GET /douyin/comment/list
pub async fn comment_list(
    State(state): State<AppState>,
    Viewer(viewer_id): Viewer,
    Params(params): Params<CommentListParams>,
) -> Result<Json<CommentListResponse>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "/douyin/comment/list"])
        .start_timer();

    let video_id = required(params.video_id, "video_id")?;
    let comment_list = state.assembler.comment_list(video_id, viewer_id).await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/douyin/comment/list", "200"])
        .inc();

    Ok(Json(CommentListResponse {
        base: BaseResponse::success(),
        comment_list,
    }))
}
