//! Viewer extraction

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::data::{NOT_LOGIN, UserId};
use crate::error::AppError;

/// Header carrying the authenticated user id
pub const VIEWER_HEADER: &str = "x-user-id";

/// The user on whose behalf a request is made
///
/// Holds `NOT_LOGIN` when the header is missing or not a positive integer;
/// extraction never rejects. Each operation decides what an anonymous
/// viewer may do.
///
/// # Usage
/// ```ignore
/// async fn handler(Viewer(viewer_id): Viewer) -> impl IntoResponse {
///     format!("viewer {}", viewer_id)
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer(pub UserId);

impl Viewer {
    pub fn is_anonymous(&self) -> bool {
        self.0 < 1
    }

    /// The viewer id, or `Unauthorized` for anonymous callers
    pub fn require(&self) -> Result<UserId, AppError> {
        if self.is_anonymous() {
            return Err(AppError::Unauthorized);
        }
        Ok(self.0)
    }
}

fn parse_viewer(parts: &Parts) -> UserId {
    parts
        .headers
        .get(VIEWER_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<UserId>().ok())
        .filter(|id| *id > 0)
        .unwrap_or(NOT_LOGIN)
}

#[async_trait]
impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Viewer(parse_viewer(parts)))
    }
}
