//! Feed assembly
//!
//! Turns service results into view objects with a fixed number of round
//! trips per request: one batch author lookup, one follow-flag query and
//! (for video lists) one favorite-flag query, regardless of list length.

use std::collections::HashSet;
use std::sync::Arc;

use crate::data::{NewComment, User, UserId, Video};
use crate::error::AppError;
use crate::service::{
    CommentService, QueryFavoriteService, QueryVideoService, RelationService, UserService,
};
use crate::view::{
    CommentView, UserView, VideoView, comment_to_view, pack_comment_views, pack_user_views,
    pack_video_views, user_to_view,
};

/// Feed and list assembler
pub struct FeedAssembler {
    users: Arc<dyn UserService>,
    relations: Arc<dyn RelationService>,
    videos: Arc<dyn QueryVideoService>,
    favorites: Arc<dyn QueryFavoriteService>,
    comments: Arc<dyn CommentService>,
}

/// Feed page packed for a viewer
#[derive(Debug, Clone)]
pub struct FeedView {
    pub videos: Vec<VideoView>,
    pub next_time: Option<i64>,
}

impl FeedAssembler {
    pub fn new(
        users: Arc<dyn UserService>,
        relations: Arc<dyn RelationService>,
        videos: Arc<dyn QueryVideoService>,
        favorites: Arc<dyn QueryFavoriteService>,
        comments: Arc<dyn CommentService>,
    ) -> Self {
        Self {
            users,
            relations,
            videos,
            favorites,
            comments,
        }
    }

    /// Fetch the distinct authors and the viewer's follow flags for them
    async fn resolve_authors(
        &self,
        viewer_id: UserId,
        author_ids: impl Iterator<Item = UserId>,
    ) -> Result<Vec<UserView>, AppError> {
        let mut ids: Vec<UserId> = author_ids.collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = self.users.get_users(&ids).await?;
        let following = self.relations.following_among(viewer_id, &ids).await?;
        Ok(pack_user_views(&users, &following))
    }

    /// Feed page strictly older than `last_time` (0 meaning now)
    pub async fn video_feed(&self, last_time: i64, viewer_id: UserId) -> Result<FeedView, AppError> {
        let page = self.videos.get_video_feed(last_time, viewer_id).await?;
        let authors = self
            .resolve_authors(viewer_id, page.videos.iter().map(|video| video.author_id))
            .await?;

        Ok(FeedView {
            videos: pack_video_views(&authors, &page.videos, &page.favorited)?,
            next_time: page.next_time,
        })
    }

    /// Videos published by `user_id`
    pub async fn publish_list(
        &self,
        user_id: UserId,
        viewer_id: UserId,
    ) -> Result<Vec<VideoView>, AppError> {
        let videos = self.videos.get_publish_list(user_id).await?;
        self.pack_videos(viewer_id, videos).await
    }

    /// Videos favorited by `user_id`
    pub async fn favorite_list(
        &self,
        user_id: UserId,
        viewer_id: UserId,
    ) -> Result<Vec<VideoView>, AppError> {
        let videos = self.favorites.get_favorite_list_by_user(user_id).await?;
        self.pack_videos(viewer_id, videos).await
    }

    async fn pack_videos(
        &self,
        viewer_id: UserId,
        videos: Vec<Video>,
    ) -> Result<Vec<VideoView>, AppError> {
        if videos.is_empty() {
            return Ok(Vec::new());
        }

        let video_ids: Vec<i64> = videos.iter().map(|video| video.id).collect();
        let favorited = self.favorites.favorited_among(viewer_id, &video_ids).await?;
        let authors = self
            .resolve_authors(viewer_id, videos.iter().map(|video| video.author_id))
            .await?;

        pack_video_views(&authors, &videos, &favorited)
    }

    /// Comments on a video, oldest first
    pub async fn comment_list(
        &self,
        video_id: i64,
        viewer_id: UserId,
    ) -> Result<Vec<CommentView>, AppError> {
        let comments = self.comments.query_comment_by_video_id(video_id).await?;
        let authors = self
            .resolve_authors(viewer_id, comments.iter().map(|comment| comment.user_id))
            .await?;

        pack_comment_views(&authors, &comments)
    }

    /// Post a comment and render it with its author
    pub async fn post_comment(&self, comment: NewComment) -> Result<CommentView, AppError> {
        let viewer_id = comment.user_id;
        let stored = self.comments.post_comment(comment).await?;
        let author = self.user_profile(stored.user_id, viewer_id).await?;
        Ok(comment_to_view(&stored, author))
    }

    /// Single user as seen by the viewer
    pub async fn user_profile(
        &self,
        user_id: UserId,
        viewer_id: UserId,
    ) -> Result<UserView, AppError> {
        let user = self.users.get_user(user_id).await?;
        let following = self.relations.following_among(viewer_id, &[user_id]).await?;
        Ok(user_to_view(&user, following.contains(&user_id)))
    }

    /// Users that `user_id` follows
    pub async fn follow_list(
        &self,
        user_id: UserId,
        viewer_id: UserId,
    ) -> Result<Vec<UserView>, AppError> {
        let users = self.relations.follow_list(user_id).await?;
        self.pack_users(viewer_id, users).await
    }

    /// Users following `user_id`
    pub async fn follower_list(
        &self,
        user_id: UserId,
        viewer_id: UserId,
    ) -> Result<Vec<UserView>, AppError> {
        let users = self.relations.follower_list(user_id).await?;
        self.pack_users(viewer_id, users).await
    }

    async fn pack_users(
        &self,
        viewer_id: UserId,
        users: Vec<User>,
    ) -> Result<Vec<UserView>, AppError> {
        let ids: Vec<UserId> = users.iter().map(|user| user.id).collect();
        let following = if ids.is_empty() {
            HashSet::new()
        } else {
            self.relations.following_among(viewer_id, &ids).await?
        };
        Ok(pack_user_views(&users, &following))
    }
}
