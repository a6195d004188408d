//! Favorite service

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;

use crate::data::{Database, EdgeAction, TransitionOutcome, UserId, Video};
use crate::error::AppError;
use crate::metrics::EDGE_TRANSITIONS_TOTAL;

/// Favorite edge operations
#[async_trait]
pub trait QueryFavoriteService: Send + Sync {
    /// Favorite or unfavorite a video
    ///
    /// Unlike follows, an anonymous viewer is rejected with `InvalidParam`.
    async fn favorite_by_user(
        &self,
        viewer_id: UserId,
        video_id: i64,
        action: EdgeAction,
    ) -> Result<(), AppError>;

    /// Videos favorited by `user_id`, most recent favorite first
    async fn get_favorite_list_by_user(&self, user_id: UserId) -> Result<Vec<Video>, AppError>;

    /// Which of `video_ids` the viewer has favorited; empty for anonymous viewers
    async fn favorited_among(
        &self,
        viewer_id: UserId,
        video_ids: &[i64],
    ) -> Result<HashSet<i64>, AppError>;
}

/// Favorite service backed by the SQLite store
pub struct SqlFavoriteService {
    db: Arc<Database>,
}

impl SqlFavoriteService {
    /// Create new favorite service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl QueryFavoriteService for SqlFavoriteService {
    async fn favorite_by_user(
        &self,
        viewer_id: UserId,
        video_id: i64,
        action: EdgeAction,
    ) -> Result<(), AppError> {
        if viewer_id < 0 {
            return Err(AppError::InvalidParam("login required".to_string()));
        }
        if video_id < 1 {
            return Err(AppError::InvalidParam(format!(
                "invalid video_id {}",
                video_id
            )));
        }

        let outcome = self
            .db
            .apply_favorite_transition(viewer_id, video_id, action)
            .await?;

        EDGE_TRANSITIONS_TOTAL
            .with_label_values(&["favorite", action.as_str(), outcome.as_str()])
            .inc();

        if outcome == TransitionOutcome::Applied {
            tracing::info!(
                viewer_id,
                video_id,
                action = action.as_str(),
                "favorite transition applied"
            );
        }

        Ok(())
    }

    async fn get_favorite_list_by_user(&self, user_id: UserId) -> Result<Vec<Video>, AppError> {
        if user_id < 0 {
            return Err(AppError::InvalidParam(format!(
                "invalid user_id {}",
                user_id
            )));
        }

        let ids = self.db.get_favorite_video_ids(user_id).await?;
        let mut by_id: HashMap<i64, Video> = self
            .db
            .get_videos_by_ids(&ids)
            .await?
            .into_iter()
            .map(|video| (video.id, video))
            .collect();

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn favorited_among(
        &self,
        viewer_id: UserId,
        video_ids: &[i64],
    ) -> Result<HashSet<i64>, AppError> {
        if viewer_id < 1 {
            return Ok(HashSet::new());
        }
        self.db.favorited_among(viewer_id, video_ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{NOT_LOGIN, NewVideo};
    use tempfile::TempDir;

    async fn create_test_db() -> (Arc<Database>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("service-favorite.db");
        let db = Database::connect(&db_path).await.unwrap();
        (Arc::new(db), temp_dir)
    }

    async fn publish(db: &Database, author_id: UserId, title: &str, at: i64) -> Video {
        db.insert_video(
            &NewVideo {
                author_id,
                play_url: format!("https://cdn.example.com/{}.mp4", title),
                cover_url: String::new(),
                title: title.to_string(),
            },
            at,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn anonymous_favorite_is_rejected_without_writing() {
        let (db, _temp_dir) = create_test_db().await;
        let author = db.insert_user("author", "h").await.unwrap();
        let video = publish(&db, author.id, "clip", 1).await;
        let service = SqlFavoriteService::new(db.clone());

        let error = service
            .favorite_by_user(NOT_LOGIN, video.id, EdgeAction::Add)
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::InvalidParam(_)));

        let stored = db.get_video(video.id).await.unwrap().unwrap();
        assert_eq!(stored.favorite_count, 0);
    }

    #[tokio::test]
    async fn favorite_list_follows_favorite_order() {
        let (db, _temp_dir) = create_test_db().await;
        let author = db.insert_user("author", "h").await.unwrap();
        let fan = db.insert_user("fan", "h").await.unwrap();
        let old = publish(&db, author.id, "old", 1).await;
        let new = publish(&db, author.id, "new", 2).await;
        let service = SqlFavoriteService::new(db.clone());

        service
            .favorite_by_user(fan.id, new.id, EdgeAction::Add)
            .await
            .unwrap();
        service
            .favorite_by_user(fan.id, old.id, EdgeAction::Add)
            .await
            .unwrap();
        service
            .favorite_by_user(fan.id, old.id, EdgeAction::Add)
            .await
            .unwrap();

        let titles: Vec<_> = service
            .get_favorite_list_by_user(fan.id)
            .await
            .unwrap()
            .into_iter()
            .map(|video| video.title)
            .collect();
        assert_eq!(titles, vec!["old", "new"]);

        let stored = db.get_video(old.id).await.unwrap().unwrap();
        assert_eq!(stored.favorite_count, 1);

        let flags = service
            .favorited_among(fan.id, &[old.id, new.id])
            .await
            .unwrap();
        assert_eq!(flags.len(), 2);
        assert!(service
            .favorited_among(NOT_LOGIN, &[old.id])
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn favorite_unknown_video_is_not_found() {
        let (db, _temp_dir) = create_test_db().await;
        let fan = db.insert_user("fan", "h").await.unwrap();
        let service = SqlFavoriteService::new(db);

        let error = service
            .favorite_by_user(fan.id, 99, EdgeAction::Add)
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::NotFound));

        let negative = service.get_favorite_list_by_user(-3).await.unwrap_err();
        assert!(matches!(negative, AppError::InvalidParam(_)));
    }
}
