use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;
use sqlx::mysql::MySqlDatabaseError;
use tracing::error;

/// Errors surfaced by request handlers. Rendered as `{"message": ...}`.
#[derive(Debug, Display)]
pub enum AppError {
    #[display(fmt = "{}", _0)]
    NotFound(String),
    #[display(fmt = "{}", _0)]
    Conflict(String),
    #[display(fmt = "{}", _0)]
    Unauthorized(String),
    #[display(fmt = "{}", _0)]
    BadRequest(String),
    // details are logged, never sent to the client
    #[display(fmt = "Internal Server Error")]
    Database(sqlx::Error),
    #[display(fmt = "Internal Server Error")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "message": self.to_string()
        }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        error!(error = %e, "Database error");
        AppError::Database(e)
    }
}

/// MySQL error number for a duplicate key (ER_DUP_ENTRY).
const ER_DUP_ENTRY: u16 = 1062;

/// True only for duplicate keys; other SQLSTATE 23000 errors (null or
/// foreign key violations) are not conflicts.
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err
            .try_downcast_ref::<MySqlDatabaseError>()
            .is_some_and(|mysql_err| mysql_err.number() == ER_DUP_ENTRY),
        _ => false,
    }
}


#[cfg(feature = "integration-test")]
#[cfg(test)]
mod integration_test {
    use super::*;
    use sqlx::MySqlPool;

    #[sqlx::test]
    async fn test_duplicate_key_is_unique_violation(pool: MySqlPool) {
        let insert = "INSERT INTO users (username, password) VALUES ('alice', 'x')";
        sqlx::query(insert).execute(&pool).await.unwrap();
        let err = sqlx::query(insert).execute(&pool).await.unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[sqlx::test]
    async fn test_null_column_is_not_unique_violation(pool: MySqlPool) {
        // SQLSTATE 23000 as well, but error 1048
        let err = sqlx::query(
            "INSERT INTO salaries (employee_number, gross_salary, total_deduction, net_salary, month) VALUES (NULL, 0, 0, 0, '')",
        )
        .execute(&pool)
        .await
        .unwrap_err();
        assert!(!is_unique_violation(&err));
    }
}
