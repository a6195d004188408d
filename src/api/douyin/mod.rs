//! Douyin-style client endpoints
//!
//! Every handler takes the viewer from `auth::Viewer`, delegates to a service
//! or the `FeedAssembler`, and wraps the result in an envelope. Action
//! parameters travel in the query string.

use axum::{
    Router, async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
    routing::{get, post},
};
use serde::de::DeserializeOwned;

use crate::AppState;
use crate::error::AppError;

pub mod comment;
pub mod favorite;
pub mod feed;
pub mod publish;
pub mod relation;
pub mod user;

/// Query string parameters
///
/// Same as `Query<T>`, but a malformed query string is rejected with
/// `InvalidParam` so the client still receives the JSON envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct Params<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for Params<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::InvalidParam(rejection.body_text()))?;
        Ok(Params(params))
    }
}

/// Unwrap a required query parameter
fn required<T>(value: Option<T>, name: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::InvalidParam(format!("missing parameter {}", name)))
}

/// Create the `/douyin` router
pub fn douyin_router() -> Router<AppState> {
    Router::new()
        .route("/feed", get(feed::feed))
        .route("/user", get(user::user_info))
        .route("/user/register", post(user::register))
        .route("/user/login", post(user::login))
        .route("/publish/action", post(publish::publish_action))
        .route("/publish/list", get(publish::publish_list))
        .route("/favorite/action", post(favorite::favorite_action))
        .route("/favorite/list", get(favorite::favorite_list))
        .route("/comment/action", post(comment::comment_action))
        .route("/comment/list", get(comment::comment_list))
        .route("/relation/action", post(relation::relation_action))
        .route("/relation/follow/list", get(relation::follow_list))
        .route("/relation/follower/list", get(relation::follower_list))
}
