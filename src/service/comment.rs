//! Comment service

use std::sync::Arc;

use async_trait::async_trait;

use crate::data::{Comment, Database, NewComment};
use crate::error::AppError;
use crate::metrics::COMMENTS_TOTAL;

const MAX_COMMENT_CHARS: usize = 1000;

/// Comment operations
#[async_trait]
pub trait CommentService: Send + Sync {
    /// Store a comment and bump the video's comment counter
    async fn post_comment(&self, comment: NewComment) -> Result<Comment, AppError>;

    /// Remove a comment; deleting an unknown id succeeds
    async fn delete_comment(&self, comment_id: i64) -> Result<(), AppError>;

    /// Comments on a video, oldest first
    async fn query_comment_by_video_id(&self, video_id: i64) -> Result<Vec<Comment>, AppError>;
}

/// Comment service backed by the SQLite store
pub struct SqlCommentService {
    db: Arc<Database>,
}

impl SqlCommentService {
    /// Create new comment service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommentService for SqlCommentService {
    async fn post_comment(&self, comment: NewComment) -> Result<Comment, AppError> {
        if comment.user_id < 0 {
            return Err(AppError::InvalidParam("login required".to_string()));
        }

        let content = comment.content.trim();
        if content.is_empty() {
            return Err(AppError::InvalidParam(
                "comment_text must not be empty".to_string(),
            ));
        }
        if content.chars().count() > MAX_COMMENT_CHARS {
            return Err(AppError::InvalidParam(format!(
                "comment_text exceeds {} characters",
                MAX_COMMENT_CHARS
            )));
        }

        let stored = self
            .db
            .insert_comment(&NewComment {
                content: content.to_string(),
                ..comment
            })
            .await?;

        COMMENTS_TOTAL.with_label_values(&["post"]).inc();
        tracing::info!(
            comment_id = stored.id,
            video_id = stored.video_id,
            user_id = stored.user_id,
            "comment posted"
        );

        Ok(stored)
    }

    async fn delete_comment(&self, comment_id: i64) -> Result<(), AppError> {
        if self.db.delete_comment(comment_id).await? {
            COMMENTS_TOTAL.with_label_values(&["delete"]).inc();
            tracing::info!(comment_id, "comment deleted");
        } else {
            tracing::debug!(comment_id, "comment already absent");
        }
        Ok(())
    }

    async fn query_comment_by_video_id(&self, video_id: i64) -> Result<Vec<Comment>, AppError> {
        self.db.get_comments_by_video(video_id).await
    }
}
