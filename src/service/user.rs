//! User service
//!
//! Registration, credential checks and user lookups. Token issuance happens
//! upstream; this service only answers whether a username/password pair is
//! valid.

use std::sync::Arc;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD_NO_PAD};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::data::{Database, User, UserId};
use crate::error::AppError;

const PASSWORD_HASH_SCHEME: &str = "sha256";
const SALT_BYTES: usize = 16;
const MAX_USERNAME_CHARS: usize = 32;
const MIN_PASSWORD_CHARS: usize = 6;
const MAX_PASSWORD_CHARS: usize = 32;

/// User account operations
#[async_trait]
pub trait UserService: Send + Sync {
    /// Create a user with zeroed follow counters
    async fn register(&self, username: &str, password: &str) -> Result<User, AppError>;

    /// Return the user if the password matches, `Unauthorized` otherwise
    async fn verify_credentials(&self, username: &str, password: &str) -> Result<User, AppError>;

    /// Single user lookup; `NotFound` if absent
    async fn get_user(&self, user_id: UserId) -> Result<User, AppError>;

    /// Batch lookup; unknown ids are skipped
    async fn get_users(&self, user_ids: &[UserId]) -> Result<Vec<User>, AppError>;
}

/// User service backed by the SQLite store
pub struct SqlUserService {
    db: Arc<Database>,
}

impl SqlUserService {
    /// Create new user service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

fn digest(salt: &[u8], password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

/// Encode as `sha256$<salt>$<digest>`
fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut salt);

    format!(
        "{}${}${}",
        PASSWORD_HASH_SCHEME,
        STANDARD_NO_PAD.encode(salt),
        STANDARD_NO_PAD.encode(digest(&salt, password))
    )
}

fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    let (Some(scheme), Some(salt), Some(expected)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if scheme != PASSWORD_HASH_SCHEME {
        return false;
    }

    let (Ok(salt), Ok(expected)) = (STANDARD_NO_PAD.decode(salt), STANDARD_NO_PAD.decode(expected))
    else {
        return false;
    };

    digest(&salt, password) == expected
}

fn validate_registration(username: &str, password: &str) -> Result<(), AppError> {
    if username.is_empty() || username.chars().count() > MAX_USERNAME_CHARS {
        return Err(AppError::InvalidParam(format!(
            "username must be 1 to {} characters",
            MAX_USERNAME_CHARS
        )));
    }

    let password_chars = password.chars().count();
    if !(MIN_PASSWORD_CHARS..=MAX_PASSWORD_CHARS).contains(&password_chars) {
        return Err(AppError::InvalidParam(format!(
            "password must be {} to {} characters",
            MIN_PASSWORD_CHARS, MAX_PASSWORD_CHARS
        )));
    }

    Ok(())
}

#[async_trait]
impl UserService for SqlUserService {
    async fn register(&self, username: &str, password: &str) -> Result<User, AppError> {
        let username = username.trim();
        validate_registration(username, password)?;

        let user = self
            .db
            .insert_user(username, &hash_password(password))
            .await?;

        tracing::info!(user_id = user.id, username = %user.username, "user registered");
        Ok(user)
    }

    async fn verify_credentials(&self, username: &str, password: &str) -> Result<User, AppError> {
        let user = self
            .db
            .get_user_by_username(username.trim())
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password_hash) {
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    async fn get_user(&self, user_id: UserId) -> Result<User, AppError> {
        if user_id < 1 {
            return Err(AppError::InvalidParam(format!(
                "invalid user_id {}",
                user_id
            )));
        }
        self.db.get_user(user_id).await?.ok_or(AppError::NotFound)
    }

    async fn get_users(&self, user_ids: &[UserId]) -> Result<Vec<User>, AppError> {
        self.db.get_users_by_ids(user_ids).await
    }
}
