//! Relation service
//!
//! Follow/unfollow transitions and follow-graph queries.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::data::{Database, EdgeAction, NOT_LOGIN, TransitionOutcome, User, UserId};
use crate::error::AppError;
use crate::metrics::EDGE_TRANSITIONS_TOTAL;

/// Follow graph operations
#[async_trait]
pub trait RelationService: Send + Sync {
    /// Make `viewer_id` follow or unfollow `target_user_id`
    ///
    /// An anonymous viewer (`NOT_LOGIN`) is a silent no-op, and repeating a
    /// transition that already holds succeeds without writing.
    async fn apply_follow_action(
        &self,
        viewer_id: UserId,
        target_user_id: UserId,
        action: EdgeAction,
    ) -> Result<(), AppError>;

    /// Users that `user_id` follows
    async fn follow_list(&self, user_id: UserId) -> Result<Vec<User>, AppError>;

    /// Users following `user_id`
    async fn follower_list(&self, user_id: UserId) -> Result<Vec<User>, AppError>;

    /// Which of `user_ids` the viewer follows; empty for anonymous viewers
    async fn following_among(
        &self,
        viewer_id: UserId,
        user_ids: &[UserId],
    ) -> Result<HashSet<UserId>, AppError>;
}

/// Relation service backed by the SQLite store
pub struct SqlRelationService {
    db: Arc<Database>,
}

impl SqlRelationService {
    /// Create new relation service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

fn require_user_id(user_id: UserId) -> Result<(), AppError> {
    if user_id < 1 {
        return Err(AppError::InvalidParam(format!(
            "invalid user_id {}",
            user_id
        )));
    }
    Ok(())
}

#[async_trait]
impl RelationService for SqlRelationService {
    async fn apply_follow_action(
        &self,
        viewer_id: UserId,
        target_user_id: UserId,
        action: EdgeAction,
    ) -> Result<(), AppError> {
        if viewer_id == NOT_LOGIN {
            tracing::debug!(target_user_id, "anonymous follow action skipped");
            return Ok(());
        }

        require_user_id(target_user_id)?;
        if viewer_id == target_user_id {
            return Err(AppError::InvalidParam(
                "cannot follow yourself".to_string(),
            ));
        }

        let outcome = self
            .db
            .apply_follow_transition(target_user_id, viewer_id, action)
            .await?;

        EDGE_TRANSITIONS_TOTAL
            .with_label_values(&["follow", action.as_str(), outcome.as_str()])
            .inc();

        match outcome {
            TransitionOutcome::Applied => tracing::info!(
                viewer_id,
                target_user_id,
                action = action.as_str(),
                "follow transition applied"
            ),
            TransitionOutcome::Unchanged => tracing::debug!(
                viewer_id,
                target_user_id,
                action = action.as_str(),
                "follow transition already in effect"
            ),
        }

        Ok(())
    }

    async fn follow_list(&self, user_id: UserId) -> Result<Vec<User>, AppError> {
        require_user_id(user_id)?;
        self.db.get_following(user_id).await
    }

    async fn follower_list(&self, user_id: UserId) -> Result<Vec<User>, AppError> {
        require_user_id(user_id)?;
        self.db.get_followers(user_id).await
    }

    async fn following_among(
        &self,
        viewer_id: UserId,
        user_ids: &[UserId],
    ) -> Result<HashSet<UserId>, AppError> {
        if viewer_id < 1 {
            return Ok(HashSet::new());
        }
        self.db.following_among(viewer_id, user_ids).await
    }
}
