//! Service layer
//!
//! Contains business logic separated from HTTP handlers. Every service is an
//! explicit trait with a SQL-backed implementation constructed from an
//! injected `Arc<Database>`; `FeedAssembler` composes them into view objects.

mod comment;
mod favorite;
mod feed;
mod relation;
mod user;
mod video;

pub use comment::{CommentService, SqlCommentService};
pub use favorite::{QueryFavoriteService, SqlFavoriteService};
pub use feed::{FeedAssembler, FeedView};
pub use relation::{RelationService, SqlRelationService};
pub use user::{SqlUserService, UserService};
pub use video::{CreateVideoService, FeedPage, QueryVideoService, SqlVideoService};
