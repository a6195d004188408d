//! Video service
//!
//! Publishing and the time-cursored feed.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::data::{Database, NewVideo, UserId, Video};
use crate::error::AppError;
use crate::metrics::VIDEOS_PUBLISHED_TOTAL;

/// One feed page
#[derive(Debug, Clone)]
pub struct FeedPage {
    /// Newest first
    pub videos: Vec<Video>,
    /// Ids among `videos` the viewer has favorited
    pub favorited: HashSet<i64>,
    /// Cursor for the next page; `None` when the feed is exhausted
    pub next_time: Option<i64>,
}

/// Read side of videos
#[async_trait]
pub trait QueryVideoService: Send + Sync {
    /// All videos published by `user_id`, newest first
    async fn get_publish_list(&self, user_id: UserId) -> Result<Vec<Video>, AppError>;

    /// Up to one page of videos published strictly before `last_time`
    /// (Unix ms, 0 meaning now), with the viewer's favorite flags
    ///
    /// Pages are ordered `published_at DESC, id DESC` and the next cursor is
    /// the last item's `published_at`. Because the cursor is exclusive, any
    /// video sharing that millisecond with the last item of a page but left
    /// off the page is never served by a later one.
    async fn get_video_feed(&self, last_time: i64, viewer_id: UserId)
    -> Result<FeedPage, AppError>;
}

/// Write side of videos
#[async_trait]
pub trait CreateVideoService: Send + Sync {
    async fn create_video(&self, video: NewVideo) -> Result<Video, AppError>;
}

/// Video service backed by the SQLite store
pub struct SqlVideoService {
    db: Arc<Database>,
    page_size: usize,
}

impl SqlVideoService {
    /// Create new video service returning `page_size` videos per feed page
    pub fn new(db: Arc<Database>, page_size: usize) -> Self {
        Self { db, page_size }
    }
}

#[async_trait]
impl QueryVideoService for SqlVideoService {
    async fn get_publish_list(&self, user_id: UserId) -> Result<Vec<Video>, AppError> {
        if user_id < 0 {
            return Err(AppError::InvalidParam(format!(
                "invalid user_id {}",
                user_id
            )));
        }
        self.db.get_videos_by_author(user_id).await
    }

    async fn get_video_feed(
        &self,
        last_time: i64,
        viewer_id: UserId,
    ) -> Result<FeedPage, AppError> {
        if last_time < 0 {
            return Err(AppError::InvalidParam(format!(
                "invalid latest_time {}",
                last_time
            )));
        }

        // 0 means "now"; +1 keeps videos published in the current millisecond
        let cursor = if last_time == 0 {
            Utc::now().timestamp_millis() + 1
        } else {
            last_time
        };

        // Fetch one extra row to learn whether another page exists
        let mut videos = self.db.get_videos_before(cursor, self.page_size + 1).await?;
        let has_more = videos.len() > self.page_size;
        videos.truncate(self.page_size);

        let next_time = if has_more {
            videos.last().map(|video| video.published_at)
        } else {
            None
        };

        let favorited = if viewer_id >= 1 && !videos.is_empty() {
            let ids: Vec<i64> = videos.iter().map(|video| video.id).collect();
            self.db.favorited_among(viewer_id, &ids).await?
        } else {
            HashSet::new()
        };

        tracing::debug!(
            cursor,
            returned = videos.len(),
            next_time = ?next_time,
            "feed page assembled"
        );

        Ok(FeedPage {
            videos,
            favorited,
            next_time,
        })
    }
}

#[async_trait]
impl CreateVideoService for SqlVideoService {
    async fn create_video(&self, video: NewVideo) -> Result<Video, AppError> {
        if video.author_id < 1 {
            return Err(AppError::InvalidParam(format!(
                "invalid author_id {}",
                video.author_id
            )));
        }

        let video = NewVideo {
            title: video.title.trim().to_string(),
            ..video
        };
        if video.title.is_empty() {
            return Err(AppError::InvalidParam("title must not be empty".to_string()));
        }
        if video.play_url.trim().is_empty() {
            return Err(AppError::InvalidParam(
                "play_url must not be empty".to_string(),
            ));
        }

        let created = self
            .db
            .insert_video(&video, Utc::now().timestamp_millis())
            .await?;

        VIDEOS_PUBLISHED_TOTAL.inc();
        tracing::info!(
            video_id = created.id,
            author_id = created.author_id,
            "video published"
        );

        Ok(created)
    }
}
