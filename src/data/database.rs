//! SQLite database operations
//!
//! All database access goes through this module. The store is the only
//! serialization point of the system: every multi-row mutation happens in a
//! single transaction whose first statement is a write, so SQLite grants the
//! write lock before anything is read and concurrent writers queue on
//! `busy_timeout` instead of racing.

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, QueryBuilder, Sqlite, SqliteConnection};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use super::models::*;
use crate::config::DatabaseConfig;
use crate::error::AppError;

/// Database connection pool wrapper.
pub struct Database {
    pool: Pool<Sqlite>,
}

/// Push `ids` as a bound `(?, ?, ...)` list.
fn push_id_list(query_builder: &mut QueryBuilder<'_, Sqlite>, ids: &[i64]) {
    query_builder.push("(");
    {
        let mut separated = query_builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
    }
    query_builder.push(")");
}

async fn user_exists(conn: &mut SqliteConnection, user_id: UserId) -> Result<bool, AppError> {
    let found = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

    Ok(found.is_some())
}

impl Database {
    // =========================================================================
    // Connection
    // =========================================================================

    /// Connect to SQLite database with default pool settings
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        Self::connect_with(&DatabaseConfig::at(path)).await
    }

    /// Connect using explicit pool settings
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect_with(config: &DatabaseConfig) -> Result<Self, AppError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Storage(sqlx::Error::Io(e)))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_millis(config.busy_timeout_ms));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!(
            path = %config.path.display(),
            max_connections = config.max_connections,
            "Database connected and migrated successfully"
        );

        Ok(Self { pool })
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Insert a new user with zeroed counters
    ///
    /// # Errors
    /// `UserAlreadyExists` if the username is taken
    pub async fn insert_user(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, follow_count, follower_count, created_at) VALUES (?, ?, 0, 0, ?)",
        )
        .bind(username)
        .bind(password_hash)
        .bind(created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(User {
                id: done.last_insert_rowid(),
                username: username.to_string(),
                password_hash: password_hash.to_string(),
                follow_count: 0,
                follower_count: 0,
                created_at,
            }),
            Err(sqlx::Error::Database(error)) if error.is_unique_violation() => {
                Err(AppError::UserAlreadyExists)
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Get user by id
    pub async fn get_user(&self, id: UserId) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Get user by login name
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Batch-fetch users in one query
    ///
    /// Unknown ids are skipped; the order of the result is unspecified.
    pub async fn get_users_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query_builder = QueryBuilder::<Sqlite>::new("SELECT * FROM users WHERE id IN ");
        push_id_list(&mut query_builder, ids);

        let users = query_builder
            .build_query_as::<User>()
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    // =========================================================================
    // Follows
    // =========================================================================

    /// Count edges "follower_id follows target_id" (0 or 1)
    pub async fn count_follow_edges(
        &self,
        target_id: UserId,
        follower_id: UserId,
    ) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM follows WHERE user_id = ? AND follower_id = ?",
        )
        .bind(target_id)
        .bind(follower_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Apply a follow/unfollow as one atomic transition
    ///
    /// Inserts or deletes the edge `(target_id, follower_id)` and adjusts
    /// `follower.follow_count` and `target.follower_count` by the same delta.
    /// Only those two columns are written. Either all three changes commit or
    /// none do; dropping the returned future before it completes rolls back.
    ///
    /// # Returns
    /// `Unchanged` without writing when the edge set already matches
    ///
    /// # Errors
    /// `NotFound` if either user row is missing once the edge changed
    pub async fn apply_follow_transition(
        &self,
        target_id: UserId,
        follower_id: UserId,
        action: EdgeAction,
    ) -> Result<TransitionOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        let changed = match action {
            EdgeAction::Add => sqlx::query(
                "INSERT OR IGNORE INTO follows (user_id, follower_id, created_at) VALUES (?, ?, ?)",
            )
            .bind(target_id)
            .bind(follower_id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?
            .rows_affected(),
            EdgeAction::Remove => {
                sqlx::query("DELETE FROM follows WHERE user_id = ? AND follower_id = ?")
                    .bind(target_id)
                    .bind(follower_id)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected()
            }
        };

        if changed == 0 {
            tx.rollback().await?;
            return Ok(TransitionOutcome::Unchanged);
        }

        for user_id in [target_id, follower_id] {
            if !user_exists(&mut *tx, user_id).await? {
                match action {
                    EdgeAction::Add => tracing::warn!(
                        user_id,
                        target_id,
                        follower_id,
                        "follow references a missing user"
                    ),
                    EdgeAction::Remove => tracing::error!(
                        user_id,
                        target_id,
                        follower_id,
                        "follow edge existed for a missing user"
                    ),
                }
                return Err(AppError::NotFound);
            }
        }

        sqlx::query("UPDATE users SET follow_count = follow_count + ? WHERE id = ?")
            .bind(action.delta())
            .bind(follower_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE users SET follower_count = follower_count + ? WHERE id = ?")
            .bind(action.delta())
            .bind(target_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(TransitionOutcome::Applied)
    }

    /// Users that `user_id` follows, most recent first
    pub async fn get_following(&self, user_id: UserId) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.* FROM follows f
            JOIN users u ON u.id = f.user_id
            WHERE f.follower_id = ?
            ORDER BY f.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Users following `user_id`, most recent first
    pub async fn get_followers(&self, user_id: UserId) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.* FROM follows f
            JOIN users u ON u.id = f.follower_id
            WHERE f.user_id = ?
            ORDER BY f.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Subset of `candidates` that `follower_id` follows
    pub async fn following_among(
        &self,
        follower_id: UserId,
        candidates: &[UserId],
    ) -> Result<HashSet<UserId>, AppError> {
        if candidates.is_empty() {
            return Ok(HashSet::new());
        }

        let mut query_builder =
            QueryBuilder::<Sqlite>::new("SELECT user_id FROM follows WHERE follower_id = ");
        query_builder.push_bind(follower_id);
        query_builder.push(" AND user_id IN ");
        push_id_list(&mut query_builder, candidates);

        let ids = query_builder
            .build_query_scalar::<i64>()
            .fetch_all(&self.pool)
            .await?;

        Ok(ids.into_iter().collect())
    }

    // =========================================================================
    // Videos
    // =========================================================================

    /// Insert a video published at `published_at` (Unix milliseconds)
    ///
    /// # Errors
    /// `NotFound` if the author has no user row; nothing is written
    pub async fn insert_video(&self, video: &NewVideo, published_at: i64) -> Result<Video, AppError> {
        let mut tx = self.pool.begin().await?;

        let done = sqlx::query(
            r#"
            INSERT INTO videos (author_id, play_url, cover_url, title, favorite_count, comment_count, published_at)
            VALUES (?, ?, ?, ?, 0, 0, ?)
            "#,
        )
        .bind(video.author_id)
        .bind(&video.play_url)
        .bind(&video.cover_url)
        .bind(&video.title)
        .bind(published_at)
        .execute(&mut *tx)
        .await?;

        if !user_exists(&mut *tx, video.author_id).await? {
            tracing::warn!(author_id = video.author_id, "video references a missing author");
            return Err(AppError::NotFound);
        }

        tx.commit().await?;

        Ok(Video {
            id: done.last_insert_rowid(),
            author_id: video.author_id,
            play_url: video.play_url.clone(),
            cover_url: video.cover_url.clone(),
            title: video.title.clone(),
            favorite_count: 0,
            comment_count: 0,
            published_at,
        })
    }

    /// Get video by id
    pub async fn get_video(&self, id: i64) -> Result<Option<Video>, AppError> {
        let video = sqlx::query_as::<_, Video>("SELECT * FROM videos WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(video)
    }

    /// All videos by one author, newest first
    pub async fn get_videos_by_author(&self, author_id: UserId) -> Result<Vec<Video>, AppError> {
        let videos = sqlx::query_as::<_, Video>(
            "SELECT * FROM videos WHERE author_id = ? ORDER BY published_at DESC, id DESC",
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(videos)
    }

    /// Videos published strictly before `cursor`, newest first
    ///
    /// # Arguments
    /// * `cursor` - Exclusive upper bound on `published_at` (Unix milliseconds)
    /// * `limit` - Maximum number of results
    pub async fn get_videos_before(&self, cursor: i64, limit: usize) -> Result<Vec<Video>, AppError> {
        let videos = sqlx::query_as::<_, Video>(
            r#"
            SELECT * FROM videos
            WHERE published_at < ?
            ORDER BY published_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(cursor)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(videos)
    }

    /// Batch-fetch videos in one query; order is unspecified
    pub async fn get_videos_by_ids(&self, ids: &[i64]) -> Result<Vec<Video>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query_builder = QueryBuilder::<Sqlite>::new("SELECT * FROM videos WHERE id IN ");
        push_id_list(&mut query_builder, ids);

        let videos = query_builder
            .build_query_as::<Video>()
            .fetch_all(&self.pool)
            .await?;

        Ok(videos)
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    /// Apply a favorite/unfavorite as one atomic transition
    ///
    /// Same discipline as [`Database::apply_follow_transition`], with
    /// `videos.favorite_count` as the only counter written.
    ///
    /// # Errors
    /// `NotFound` if the video or the user row is missing once the edge changed
    pub async fn apply_favorite_transition(
        &self,
        user_id: UserId,
        video_id: i64,
        action: EdgeAction,
    ) -> Result<TransitionOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        let changed = match action {
            EdgeAction::Add => sqlx::query(
                "INSERT OR IGNORE INTO favorites (user_id, video_id, created_at) VALUES (?, ?, ?)",
            )
            .bind(user_id)
            .bind(video_id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?
            .rows_affected(),
            EdgeAction::Remove => {
                sqlx::query("DELETE FROM favorites WHERE user_id = ? AND video_id = ?")
                    .bind(user_id)
                    .bind(video_id)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected()
            }
        };

        if changed == 0 {
            tx.rollback().await?;
            return Ok(TransitionOutcome::Unchanged);
        }

        if !user_exists(&mut *tx, user_id).await? {
            tracing::warn!(user_id, video_id, "favorite references a missing user");
            return Err(AppError::NotFound);
        }

        let updated =
            sqlx::query("UPDATE videos SET favorite_count = favorite_count + ? WHERE id = ?")
                .bind(action.delta())
                .bind(video_id)
                .execute(&mut *tx)
                .await?;

        if updated.rows_affected() == 0 {
            tracing::warn!(user_id, video_id, "favorite references a missing video");
            return Err(AppError::NotFound);
        }

        tx.commit().await?;

        Ok(TransitionOutcome::Applied)
    }

    /// Video ids favorited by `user_id`, most recently favorited first
    pub async fn get_favorite_video_ids(&self, user_id: UserId) -> Result<Vec<i64>, AppError> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT video_id FROM favorites WHERE user_id = ? ORDER BY id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    /// Subset of `candidates` that `user_id` has favorited
    pub async fn favorited_among(
        &self,
        user_id: UserId,
        candidates: &[i64],
    ) -> Result<HashSet<i64>, AppError> {
        if candidates.is_empty() {
            return Ok(HashSet::new());
        }

        let mut query_builder =
            QueryBuilder::<Sqlite>::new("SELECT video_id FROM favorites WHERE user_id = ");
        query_builder.push_bind(user_id);
        query_builder.push(" AND video_id IN ");
        push_id_list(&mut query_builder, candidates);

        let ids = query_builder
            .build_query_scalar::<i64>()
            .fetch_all(&self.pool)
            .await?;

        Ok(ids.into_iter().collect())
    }

    // =========================================================================
    // Comments
    // =========================================================================

    /// Insert a comment and bump the video's comment counter atomically
    ///
    /// # Errors
    /// `NotFound` if the video or the commenting user does not exist; the
    /// counter is left untouched
    pub async fn insert_comment(&self, comment: &NewComment) -> Result<Comment, AppError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE videos SET comment_count = comment_count + 1 WHERE id = ?")
            .bind(comment.video_id)
            .execute(&mut *tx)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        if !user_exists(&mut *tx, comment.user_id).await? {
            tracing::warn!(
                user_id = comment.user_id,
                video_id = comment.video_id,
                "comment references a missing user"
            );
            return Err(AppError::NotFound);
        }

        let created_at = Utc::now();
        let done = sqlx::query(
            "INSERT INTO comments (video_id, user_id, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(comment.video_id)
        .bind(comment.user_id)
        .bind(&comment.content)
        .bind(created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Comment {
            id: done.last_insert_rowid(),
            video_id: comment.video_id,
            user_id: comment.user_id,
            content: comment.content.clone(),
            created_at,
        })
    }

    /// Delete a comment and decrement the video's comment counter atomically
    ///
    /// # Returns
    /// `false` if no comment had that id
    pub async fn delete_comment(&self, id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let video_id =
            sqlx::query_scalar::<_, i64>("DELETE FROM comments WHERE id = ? RETURNING video_id")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(video_id) = video_id else {
            tx.rollback().await?;
            return Ok(false);
        };

        sqlx::query(
            "UPDATE videos SET comment_count = comment_count - 1 WHERE id = ? AND comment_count > 0",
        )
        .bind(video_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(true)
    }

    /// Comments on a video in reading order (oldest first)
    pub async fn get_comments_by_video(&self, video_id: i64) -> Result<Vec<Comment>, AppError> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT * FROM comments WHERE video_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(video_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }
}
