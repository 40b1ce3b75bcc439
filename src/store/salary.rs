use sqlx::MySqlPool;
use tracing::debug;

use crate::{error::AppError, model::salary::Salary, payroll::net_salary::SalaryAmounts};

const LIST_SALARIES: &str = r#"
    SELECT id, employee_number, gross_salary, total_deduction, net_salary, month
    FROM salaries
    WHERE (? IS NULL OR month = ?)
    ORDER BY id
"#;

const FIND_SALARY: &str = "SELECT id, employee_number, gross_salary, total_deduction, net_salary, month FROM salaries WHERE id = ?";

const INSERT_SALARY: &str = r#"
    INSERT INTO salaries (employee_number, gross_salary, total_deduction, net_salary, month)
    VALUES (?, ?, ?, ?, ?)
"#;

const LOCK_SALARY: &str = "SELECT id, employee_number, gross_salary, total_deduction, net_salary, month FROM salaries WHERE id = ? FOR UPDATE";

const UPDATE_SALARY: &str = r#"
    UPDATE salaries
    SET employee_number = ?, gross_salary = ?, total_deduction = ?, net_salary = ?, month = ?
    WHERE id = ?
"#;

const DELETE_SALARY: &str = "DELETE FROM salaries WHERE id = ?";

/// Salaries in insertion order, optionally restricted to one month label.
pub async fn list_salaries(pool: &MySqlPool, month: Option<&str>) -> Result<Vec<Salary>, AppError> {
    let salaries = sqlx::query_as::<_, Salary>(LIST_SALARIES)
        .bind(month)
        .bind(month)
        .fetch_all(pool)
        .await?;
    debug!(count = salaries.len(), month = ?month, "Fetched salaries");
    Ok(salaries)
}

pub async fn find_salary(pool: &MySqlPool, salary_id: u64) -> Result<Option<Salary>, AppError> {
    Ok(sqlx::query_as::<_, Salary>(FIND_SALARY)
        .bind(salary_id)
        .fetch_optional(pool)
        .await?)
}

pub async fn insert_salary(
    pool: &MySqlPool,
    employee_number: String,
    month: String,
    amounts: SalaryAmounts,
) -> Result<Salary, AppError> {
    let result = sqlx::query(INSERT_SALARY)
        .bind(&employee_number)
        .bind(amounts.gross_salary)
        .bind(amounts.total_deduction)
        .bind(amounts.net_salary)
        .bind(&month)
        .execute(pool)
        .await?;

    Ok(Salary {
        id: result.last_insert_id(),
        employee_number,
        gross_salary: amounts.gross_salary,
        total_deduction: amounts.total_deduction,
        net_salary: amounts.net_salary,
        month,
    })
}

/// Applies `change` to the stored salary and writes every column back.
///
/// The row is locked from read to write, so a concurrent delete either
/// happens first (`None`) or waits for the update to commit. The result does
/// not depend on affected-row counts, which MySQL reports as 0 for an
/// update that changes nothing.
pub async fn update_salary<F>(
    pool: &MySqlPool,
    salary_id: u64,
    change: F,
) -> Result<Option<Salary>, AppError>
where
    F: FnOnce(Salary) -> Salary,
{
    let mut tx = pool.begin().await?;

    let Some(current) = sqlx::query_as::<_, Salary>(LOCK_SALARY)
        .bind(salary_id)
        .fetch_optional(&mut *tx)
        .await?
    else {
        return Ok(None);
    };

    let updated = Salary {
        id: current.id,
        ..change(current)
    };

    sqlx::query(UPDATE_SALARY)
        .bind(&updated.employee_number)
        .bind(updated.gross_salary)
        .bind(updated.total_deduction)
        .bind(updated.net_salary)
        .bind(&updated.month)
        .bind(updated.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(Some(updated))
}

/// Returns false when no salary had that id.
pub async fn delete_salary(pool: &MySqlPool, salary_id: u64) -> Result<bool, AppError> {
    let result = sqlx::query(DELETE_SALARY)
        .bind(salary_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
