//! Response envelopes
//!
//! Every response carries `status_code` and `status_msg`; payload fields sit
//! next to them at the top level.

use serde::{Deserialize, Serialize};

use crate::data::UserId;
use crate::error::SUCCESS_CODE;
use crate::view::{CommentView, UserView, VideoView};

/// Status pair shared by all envelopes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseResponse {
    pub status_code: i32,
    pub status_msg: String,
}

impl BaseResponse {
    pub fn success() -> Self {
        Self {
            status_code: SUCCESS_CODE,
            status_msg: "success".to_string(),
        }
    }
}

/// Feed page; `next_time` is 0 when there are no more pages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    pub next_time: i64,
    pub video_list: Vec<VideoView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoListResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    pub video_list: Vec<VideoView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    pub user: UserView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserListResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    pub user_list: Vec<UserView>,
}

/// Registration and login result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIdResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    pub user_id: UserId,
}

/// Comment action result; `comment` is present only after a post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentActionResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<CommentView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentListResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    pub comment_list: Vec<CommentView>,
}
