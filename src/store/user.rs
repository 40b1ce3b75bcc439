use sqlx::MySqlPool;
use tracing::error;

use crate::{
    error::{AppError, is_unique_violation},
    model::user::User,
};

const FIND_USER: &str = "SELECT id, username, password FROM users WHERE username = ?";

const INSERT_USER: &str = "INSERT INTO users (username, password) VALUES (?, ?)";

const TOUCH_LAST_LOGIN: &str = "UPDATE users SET last_login_at = NOW() WHERE id = ?";

pub async fn find_user_by_username(
    pool: &MySqlPool,
    username: &str,
) -> Result<Option<User>, AppError> {
    Ok(sqlx::query_as::<_, User>(FIND_USER)
        .bind(username)
        .fetch_optional(pool)
        .await?)
}

/// Stores a user with an already hashed password.
pub async fn insert_user(pool: &MySqlPool, username: &str, password_hash: &str) -> Result<u64, AppError> {
    let result = sqlx::query(INSERT_USER)
        .bind(username)
        .bind(password_hash)
        .execute(pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Username already exists".to_string())
            } else {
                AppError::from(e)
            }
        })?;
    Ok(result.last_insert_id())
}

/// Best effort; a failure here never fails a login.
pub async fn touch_last_login(pool: &MySqlPool, user_id: u64) {
    if let Err(e) = sqlx::query(TOUCH_LAST_LOGIN).bind(user_id).execute(pool).await {
        error!(error = %e, user_id, "Failed to update last_login_at");
    }
}
