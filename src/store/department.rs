use sqlx::MySqlPool;
use tracing::{debug, info};

use crate::{
    error::{AppError, is_unique_violation},
    model::department::{DEFAULT_DEPARTMENTS, Department, NewDepartment},
};

const LIST_DEPARTMENTS: &str =
    "SELECT id, department_code, department_name, gross_salary FROM departments ORDER BY id";

const FIND_DEPARTMENT_BY_CODE: &str = "SELECT id, department_code, department_name, gross_salary FROM departments WHERE department_code = ? ORDER BY id LIMIT 1";

const INSERT_DEPARTMENT: &str =
    "INSERT INTO departments (department_code, department_name, gross_salary) VALUES (?, ?, ?)";

const DELETE_ALL_DEPARTMENTS: &str = "DELETE FROM departments";

pub async fn list_departments(pool: &MySqlPool) -> Result<Vec<Department>, AppError> {
    let departments = sqlx::query_as::<_, Department>(LIST_DEPARTMENTS)
        .fetch_all(pool)
        .await?;
    debug!(count = departments.len(), "Fetched departments");
    Ok(departments)
}

pub async fn find_department_by_code(
    pool: &MySqlPool,
    code: &str,
) -> Result<Option<Department>, AppError> {
    Ok(sqlx::query_as::<_, Department>(FIND_DEPARTMENT_BY_CODE)
        .bind(code)
        .fetch_optional(pool)
        .await?)
}

pub async fn insert_department(
    pool: &MySqlPool,
    department: NewDepartment,
) -> Result<Department, AppError> {
    let result = sqlx::query(INSERT_DEPARTMENT)
        .bind(&department.department_code)
        .bind(&department.department_name)
        .bind(department.gross_salary)
        .execute(pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Department code already exists".to_string())
            } else {
                AppError::from(e)
            }
        })?;

    Ok(Department {
        id: result.last_insert_id(),
        department_code: department.department_code,
        department_name: department.department_name,
        gross_salary: department.gross_salary,
    })
}

/// Replaces every department with the default seed in one transaction.
pub async fn reset_departments(pool: &MySqlPool) -> Result<Vec<Department>, AppError> {
    let mut tx = pool.begin().await?;

    let removed = sqlx::query(DELETE_ALL_DEPARTMENTS)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    for seed in DEFAULT_DEPARTMENTS {
        sqlx::query(INSERT_DEPARTMENT)
            .bind(seed.code)
            .bind(seed.name)
            .bind(seed.gross_salary)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    info!(removed, "Departments reset to defaults");

    list_departments(pool).await
}

#[cfg(feature = "integration-test")]
#[cfg(test)]
mod integration_test {
    use super::*;

    fn new_department(code: &str) -> NewDepartment {
        NewDepartment {
            department_code: code.to_string(),
            department_name: format!("{code} department"),
            gross_salary: 1_000.0,
        }
    }

    #[sqlx::test]
    async fn test_reset_replaces_existing_rows(pool: MySqlPool) {
        insert_department(&pool, new_department("HR")).await.unwrap();
        insert_department(&pool, new_department("CW")).await.unwrap();

        let departments = reset_departments(&pool).await.unwrap();

        let rows: Vec<(&str, &str, f64)> = departments
            .iter()
            .map(|d| (d.department_code.as_str(), d.department_name.as_str(), d.gross_salary))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("CW", "Carwash", 300_000.0),
                ("ST", "Stock", 200_000.0),
                ("MC", "Mechanic", 450_000.0),
                ("ADMS", "Administration Staff", 600_000.0),
            ]
        );
    }

    #[sqlx::test]
    async fn test_reset_is_repeatable(pool: MySqlPool) {
        reset_departments(&pool).await.unwrap();
        let departments = reset_departments(&pool).await.unwrap();
        assert_eq!(departments.len(), 4);
    }

    #[sqlx::test]
    async fn test_duplicate_code_conflicts(pool: MySqlPool) {
        insert_department(&pool, new_department("HR")).await.unwrap();
        let result = insert_department(&pool, new_department("HR")).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[sqlx::test]
    async fn test_find_by_code(pool: MySqlPool) {
        reset_departments(&pool).await.unwrap();
        let found = find_department_by_code(&pool, "MC").await.unwrap().unwrap();
        assert_eq!(found.department_name, "Mechanic");
        assert!(find_department_by_code(&pool, "NOPE").await.unwrap().is_none());
    }
}
