use sqlx::MySqlPool;

use crate::error::AppError;

const INSERT_REFRESH_TOKEN: &str =
    "INSERT INTO refresh_tokens (user_id, jti, expires_at) VALUES (?, ?, FROM_UNIXTIME(?))";

// Only unrevoked tokens can be revoked, so exactly one of two racing refreshes wins.
const REVOKE_REFRESH_TOKEN: &str =
    "UPDATE refresh_tokens SET revoked = 1 WHERE jti = ? AND revoked = 0";

pub async fn insert_refresh_token(
    pool: &MySqlPool,
    user_id: u64,
    jti: &str,
    expires_at: usize,
) -> Result<(), AppError> {
    sqlx::query(INSERT_REFRESH_TOKEN)
        .bind(user_id)
        .bind(jti)
        .bind(expires_at as i64)
        .execute(pool)
        .await?;
    Ok(())
}

/// Revokes a live refresh token. Returns false when the token was unknown or already revoked.
pub async fn revoke_refresh_token(pool: &MySqlPool, jti: &str) -> Result<bool, AppError> {
    let result = sqlx::query(REVOKE_REFRESH_TOKEN)
        .bind(jti)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
