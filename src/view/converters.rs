//! Conversion functions from database models to view objects
//!
//! Packing never performs I/O: callers batch-fetch authors and flags first.
//! Output order always matches input order, and when an id appears more than
//! once in an author list the last entry wins.

use std::collections::{HashMap, HashSet};

use anyhow::anyhow;

use crate::data::{Comment, User, UserId, Video};
use crate::error::AppError;
use crate::view::dto::*;

/// Convert User to UserView
pub fn user_to_view(user: &User, is_follow: bool) -> UserView {
    UserView {
        id: user.id,
        name: user.username.clone(),
        follow_count: user.follow_count,
        follower_count: user.follower_count,
        is_follow,
    }
}

/// Convert users, flagging those in `following`
pub fn pack_user_views(users: &[User], following: &HashSet<UserId>) -> Vec<UserView> {
    users
        .iter()
        .map(|user| user_to_view(user, following.contains(&user.id)))
        .collect()
}

fn index_authors(authors: &[UserView]) -> HashMap<UserId, &UserView> {
    authors.iter().map(|author| (author.id, author)).collect()
}

fn missing_author(author_id: UserId, kind: &str, id: i64) -> AppError {
    AppError::Internal(anyhow!(
        "author {} of {} {} was not resolved",
        author_id,
        kind,
        id
    ))
}

/// Convert videos, attaching authors and favorite flags
pub fn pack_video_views(
    authors: &[UserView],
    videos: &[Video],
    favorited: &HashSet<i64>,
) -> Result<Vec<VideoView>, AppError> {
    let authors = index_authors(authors);

    videos
        .iter()
        .map(|video| {
            let author = authors
                .get(&video.author_id)
                .ok_or_else(|| missing_author(video.author_id, "video", video.id))?;

            Ok(VideoView {
                id: video.id,
                author: (*author).clone(),
                play_url: video.play_url.clone(),
                cover_url: video.cover_url.clone(),
                favorite_count: video.favorite_count,
                comment_count: video.comment_count,
                is_favorite: favorited.contains(&video.id),
                title: video.title.clone(),
            })
        })
        .collect()
}

/// Convert Comment to CommentView
pub fn comment_to_view(comment: &Comment, user: UserView) -> CommentView {
    CommentView {
        id: comment.id,
        user,
        content: comment.content.clone(),
        create_date: comment.created_at.format("%m-%d").to_string(),
    }
}

/// Convert comments, attaching their authors
pub fn pack_comment_views(
    authors: &[UserView],
    comments: &[Comment],
) -> Result<Vec<CommentView>, AppError> {
    let authors = index_authors(authors);

    comments
        .iter()
        .map(|comment| {
            let user = authors
                .get(&comment.user_id)
                .ok_or_else(|| missing_author(comment.user_id, "comment", comment.id))?;
            Ok(comment_to_view(comment, (*user).clone()))
        })
        .collect()
}
