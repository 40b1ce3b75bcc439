use sqlx::MySqlPool;
use tracing::debug;

use crate::{
    error::AppError,
    payroll::report::{PayrollReportRow, build_payroll_report, referenced_employee_numbers},
    store::{department::list_departments, employee::find_employees_by_numbers, salary::list_salaries},
};

/// Loads salaries, the employees they reference and all departments in
/// three queries, then joins them in memory.
pub async fn load_payroll_report(
    pool: &MySqlPool,
    month: Option<&str>,
) -> Result<Vec<PayrollReportRow>, AppError> {
    let salaries = list_salaries(pool, month).await?;
    let numbers = referenced_employee_numbers(&salaries);
    let employees = find_employees_by_numbers(pool, &numbers).await?;
    let departments = list_departments(pool).await?;

    let rows = build_payroll_report(&salaries, &employees, &departments, month);
    debug!(
        salaries = salaries.len(),
        rows = rows.len(),
        "Payroll report built"
    );
    Ok(rows)
}
