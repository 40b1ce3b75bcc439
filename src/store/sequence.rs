//! Named counters stored in the `sequences` table.
//!
//! Callers advance a counter inside their own transaction so the row lock
//! taken by the UPDATE is held until the dependent insert commits.

use sqlx::{Executor, MySql, MySqlConnection};

use crate::error::AppError;

pub const EMPLOYEE_NUMBER_SEQUENCE: &str = "employee_number";

const ADVANCE_SEQUENCE: &str = "UPDATE sequences SET value = value + 1 WHERE name = ?";

const CURRENT_VALUE: &str = "SELECT value FROM sequences WHERE name = ?";

const RAISE_SEQUENCE: &str = "UPDATE sequences SET value = GREATEST(value, ?) WHERE name = ?";

/// Increments the counter and returns its new value.
pub async fn next_value(conn: &mut MySqlConnection, name: &str) -> Result<u64, AppError> {
    let advanced = sqlx::query(ADVANCE_SEQUENCE)
        .bind(name)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    if advanced == 0 {
        return Err(AppError::Internal(format!("Sequence {name} is missing")));
    }

    let value: u64 = sqlx::query_scalar(CURRENT_VALUE)
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;
    Ok(value)
}

/// Moves the counter up to `at_least`; never moves it down.
///
/// Accepts a pool or an open transaction, so a caller already holding the
/// row lock can raise the counter without releasing it.
pub async fn raise_to<'e, E>(executor: E, name: &str, at_least: u64) -> Result<(), AppError>
where
    E: Executor<'e, Database = MySql>,
{
    sqlx::query(RAISE_SEQUENCE)
        .bind(at_least)
        .bind(name)
        .execute(executor)
        .await?;
    Ok(())
}

#[cfg(feature = "integration-test")]
#[cfg(test)]
mod integration_test {
    use super::*;
    use sqlx::MySqlPool;

    #[sqlx::test]
    async fn test_next_value_increments(pool: MySqlPool) {
        let mut conn = pool.acquire().await.unwrap();
        let first = next_value(&mut conn, EMPLOYEE_NUMBER_SEQUENCE).await.unwrap();
        let second = next_value(&mut conn, EMPLOYEE_NUMBER_SEQUENCE).await.unwrap();
        assert_eq!(first, 1);
        assert_eq!(second, 2);
    }

    #[sqlx::test]
    async fn test_raise_never_lowers(pool: MySqlPool) {
        raise_to(&pool, EMPLOYEE_NUMBER_SEQUENCE, 41).await.unwrap();
        raise_to(&pool, EMPLOYEE_NUMBER_SEQUENCE, 3).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        assert_eq!(next_value(&mut conn, EMPLOYEE_NUMBER_SEQUENCE).await.unwrap(), 42);
    }

    #[sqlx::test]
    async fn test_unknown_sequence_fails(pool: MySqlPool) {
        let mut conn = pool.acquire().await.unwrap();
        let result = next_value(&mut conn, "missing").await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[sqlx::test]
    async fn test_raise_inside_transaction(pool: MySqlPool) {
        let mut tx = pool.begin().await.unwrap();
        next_value(&mut tx, EMPLOYEE_NUMBER_SEQUENCE).await.unwrap();
        raise_to(&mut *tx, EMPLOYEE_NUMBER_SEQUENCE, 9).await.unwrap();
        assert_eq!(next_value(&mut tx, EMPLOYEE_NUMBER_SEQUENCE).await.unwrap(), 10);
        tx.commit().await.unwrap();
    }
}
