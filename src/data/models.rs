//! Data models
//!
//! Rust structs representing database entities.
//! Entities reference each other by plain integer ids; resolution is always
//! an explicit batch lookup, never an embedded object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

// =============================================================================
// Identity
// =============================================================================

/// User identifier (SQLite rowid)
pub type UserId = i64;

/// Viewer id supplied by the identity boundary when nobody is logged in
pub const NOT_LOGIN: UserId = -1;

// =============================================================================
// User
// =============================================================================

/// A registered user
///
/// `follow_count` and `follower_count` are denormalized from the `follows`
/// table and only ever change together with an edge, inside one transaction.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    /// Immutable login name
    pub username: String,
    /// Salted credential hash, never rendered
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Number of users this user follows
    pub follow_count: i64,
    /// Number of users following this user
    pub follower_count: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Edges
// =============================================================================

/// Requested change to an edge set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeAction {
    /// Follow / favorite
    Add,
    /// Unfollow / unfavorite
    Remove,
}

impl EdgeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
        }
    }

    /// Counter adjustment that accompanies the edge change
    pub fn delta(&self) -> i64 {
        match self {
            Self::Add => 1,
            Self::Remove => -1,
        }
    }
}

impl TryFrom<i32> for EdgeAction {
    type Error = AppError;

    /// Wire `action_type`: 1 adds the edge, 2 removes it
    fn try_from(action_type: i32) -> Result<Self, Self::Error> {
        match action_type {
            1 => Ok(Self::Add),
            2 => Ok(Self::Remove),
            other => Err(AppError::InvalidParam(format!(
                "unknown action_type {}",
                other
            ))),
        }
    }
}

/// Result of an edge transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Edge and counters changed
    Applied,
    /// The edge set already matched the request; nothing was written
    Unchanged,
}

impl TransitionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Unchanged => "unchanged",
        }
    }
}

// =============================================================================
// Video
// =============================================================================

/// A published short video
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Video {
    pub id: i64,
    pub author_id: UserId,
    pub play_url: String,
    pub cover_url: String,
    pub title: String,
    pub favorite_count: i64,
    pub comment_count: i64,
    /// Publish time in Unix milliseconds
    pub published_at: i64,
}

/// Video metadata supplied at publish time
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub author_id: UserId,
    pub play_url: String,
    pub cover_url: String,
    pub title: String,
}

// =============================================================================
// Comment
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub video_id: i64,
    pub user_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Comment as submitted; id and creation time are assigned on insert
#[derive(Debug, Clone)]
pub struct NewComment {
    pub video_id: i64,
    pub user_id: UserId,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_action_parses_wire_values() {
        assert_eq!(EdgeAction::try_from(1).unwrap(), EdgeAction::Add);
        assert_eq!(EdgeAction::try_from(2).unwrap(), EdgeAction::Remove);
        assert!(matches!(
            EdgeAction::try_from(3),
            Err(AppError::InvalidParam(_))
        ));
        assert_eq!(EdgeAction::Add.delta() + EdgeAction::Remove.delta(), 0);
    }

    #[test]
    fn user_serialization_omits_credentials() {
        let user = User {
            id: 1,
            username: "alice".to_string(),
            password_hash: "sha256$salt$digest".to_string(),
            follow_count: 0,
            follower_count: 0,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "alice");
    }
}
