//! View DTOs
//!
//! Field names are part of the wire contract.

use serde::{Deserialize, Serialize};

use crate::data::UserId;

/// User as seen by a particular viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub follow_count: i64,
    pub follower_count: i64,
    /// Whether the viewer follows this user
    pub is_follow: bool,
}

/// Video with its resolved author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoView {
    pub id: i64,
    pub author: UserView,
    pub play_url: String,
    pub cover_url: String,
    pub favorite_count: i64,
    pub comment_count: i64,
    /// Whether the viewer has favorited this video
    pub is_favorite: bool,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentView {
    pub id: i64,
    pub user: UserView,
    pub content: String,
    /// Creation date rendered as `MM-DD`
    pub create_date: String,
}
