use sqlx::{Executor, MySql, MySqlConnection, MySqlPool};
use tracing::{debug, info, warn};

use crate::{
    error::{AppError, is_unique_violation},
    model::employee::{Employee, NewEmployee},
    payroll::employee_number::{format_employee_number, highest_counter, next_employee_number},
    store::sequence::{self, EMPLOYEE_NUMBER_SEQUENCE},
};

const EMPLOYEE_COLUMNS: &str = "id, employee_number, first_name, last_name, position, address, telephone, gender, hired_date, department_code";

const INSERT_EMPLOYEE: &str = r#"
    INSERT INTO employees
    (employee_number, first_name, last_name, position, address, telephone, gender, hired_date, department_code)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

const ALL_EMPLOYEE_NUMBERS: &str = "SELECT employee_number FROM employees";

pub async fn list_employees(pool: &MySqlPool) -> Result<Vec<Employee>, AppError> {
    let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY id");
    let employees = sqlx::query_as::<_, Employee>(&sql).fetch_all(pool).await?;
    debug!(count = employees.len(), "Fetched employees");
    Ok(employees)
}

pub async fn find_employee_by_number(
    pool: &MySqlPool,
    employee_number: &str,
) -> Result<Option<Employee>, AppError> {
    let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE employee_number = ?");
    Ok(sqlx::query_as::<_, Employee>(&sql)
        .bind(employee_number)
        .fetch_optional(pool)
        .await?)
}

/// Upper bound on placeholders per `IN (...)` lookup.
const LOOKUP_CHUNK_SIZE: usize = 1000;

/// Loads every employee whose number is in `numbers`, ordered by id.
///
/// Numbers are looked up in chunks of [`LOOKUP_CHUNK_SIZE`] so a large report
/// never builds a statement past the server's placeholder limit.
pub async fn find_employees_by_numbers(
    pool: &MySqlPool,
    numbers: &[String],
) -> Result<Vec<Employee>, AppError> {
    let mut employees = Vec::new();

    for chunk in numbers.chunks(LOOKUP_CHUNK_SIZE) {
        let placeholders = vec!["?"; chunk.len()].join(", ");
        let sql = format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE employee_number IN ({placeholders})"
        );
        debug!(count = chunk.len(), "Fetching employees by number");

        let mut query = sqlx::query_as::<_, Employee>(&sql);
        for number in chunk {
            query = query.bind(number);
        }
        employees.extend(query.fetch_all(pool).await?);
    }

    employees.sort_by_key(|e| e.id);
    Ok(employees)
}

async fn insert_row(
    conn: &mut MySqlConnection,
    employee_number: &str,
    employee: &NewEmployee,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(INSERT_EMPLOYEE)
        .bind(employee_number)
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(&employee.position)
        .bind(&employee.address)
        .bind(&employee.telephone)
        .bind(&employee.gender)
        .bind(employee.hired_date)
        .bind(&employee.department_code)
        .execute(&mut *conn)
        .await?;
    Ok(result.last_insert_id())
}

/// Greatest counter among stored employee numbers, 0 when there are none.
async fn stored_highest_counter<'e, E>(executor: E) -> Result<u64, AppError>
where
    E: Executor<'e, Database = MySql>,
{
    let numbers: Vec<String> = sqlx::query_scalar(ALL_EMPLOYEE_NUMBERS)
        .fetch_all(executor)
        .await?;
    Ok(highest_counter(numbers.iter().map(String::as_str)).unwrap_or(0))
}

/// Inserts an employee under the next number of the employee sequence.
///
/// The sequence row stays locked until the insert commits, so concurrent
/// creations are serialized instead of reading the same last number. If the
/// number is already taken by a row written outside the service, the counter
/// is raised past the stored numbers under the same lock and the insert is
/// retried once.
pub async fn insert_employee(
    pool: &MySqlPool,
    employee: NewEmployee,
) -> Result<Employee, AppError> {
    let mut tx = pool.begin().await?;

    let mut counter = sequence::next_value(&mut tx, EMPLOYEE_NUMBER_SEQUENCE).await?;
    let mut employee_number = format_employee_number(counter);

    let first_attempt = insert_row(&mut tx, &employee_number, &employee).await;
    let id = match first_attempt {
        Ok(id) => id,
        Err(e) if is_unique_violation(&e) => {
            warn!(employee_number = %employee_number, "Employee number taken, resyncing sequence");

            let highest = stored_highest_counter(&mut *tx).await?;
            sequence::raise_to(&mut *tx, EMPLOYEE_NUMBER_SEQUENCE, highest).await?;
            counter = sequence::next_value(&mut tx, EMPLOYEE_NUMBER_SEQUENCE).await?;
            employee_number = format_employee_number(counter);

            insert_row(&mut tx, &employee_number, &employee)
                .await
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        AppError::Conflict(format!(
                            "Employee number {employee_number} already exists"
                        ))
                    } else {
                        AppError::from(e)
                    }
                })?
        }
        Err(e) => return Err(e.into()),
    };

    tx.commit().await?;
    info!(employee_number = %employee_number, counter, "Employee created");

    Ok(employee.into_employee(id, employee_number))
}

/// Raises the employee sequence to the greatest number already stored, so
/// rows written outside the service are never handed out again.
pub async fn reconcile_employee_sequence(pool: &MySqlPool) -> Result<(), AppError> {
    let numbers: Vec<String> = sqlx::query_scalar(ALL_EMPLOYEE_NUMBERS)
        .fetch_all(pool)
        .await?;

    if let Some(highest) = highest_counter(numbers.iter().map(String::as_str)) {
        sequence::raise_to(pool, EMPLOYEE_NUMBER_SEQUENCE, highest).await?;
        info!(
            highest,
            next = %next_employee_number(numbers.iter().map(String::as_str)),
            "Employee sequence reconciled"
        );
    }
    Ok(())
}

#[cfg(feature = "integration-test")]
#[cfg(test)]
mod integration_test {
    use super::*;

    fn new_employee(first_name: &str) -> NewEmployee {
        NewEmployee {
            first_name: first_name.to_string(),
            last_name: "Doe".to_string(),
            department_code: "CW".to_string(),
            ..Default::default()
        }
    }

    #[sqlx::test]
    async fn test_first_employee_gets_first_number(pool: MySqlPool) {
        let employee = insert_employee(&pool, new_employee("John")).await.unwrap();
        assert_eq!(employee.employee_number, "EMP001");
    }

    #[sqlx::test]
    async fn test_numbers_increment(pool: MySqlPool) {
        insert_employee(&pool, new_employee("John")).await.unwrap();
        let second = insert_employee(&pool, new_employee("Jane")).await.unwrap();
        assert_eq!(second.employee_number, "EMP002");

        let found = find_employee_by_number(&pool, "EMP002").await.unwrap().unwrap();
        assert_eq!(found, second);
    }

    #[sqlx::test]
    async fn test_concurrent_creations_get_distinct_numbers(pool: MySqlPool) {
        let names: Vec<String> = (0..8).map(|i| format!("E{i}")).collect();
        let results = futures::future::join_all(
            names.iter().map(|name| insert_employee(&pool, new_employee(name))),
        )
        .await;

        let mut numbers: Vec<String> = results
            .into_iter()
            .map(|r| r.unwrap().employee_number)
            .collect();
        numbers.sort();
        numbers.dedup();
        assert_eq!(numbers.len(), 8);
    }

    #[sqlx::test]
    async fn test_reconcile_continues_after_existing_numbers(pool: MySqlPool) {
        sqlx::query("INSERT INTO employees (employee_number) VALUES ('EMP041')")
            .execute(&pool)
            .await
            .unwrap();

        reconcile_employee_sequence(&pool).await.unwrap();
        let employee = insert_employee(&pool, new_employee("John")).await.unwrap();

        assert_eq!(employee.employee_number, "EMP042");
    }

    #[sqlx::test]
    async fn test_find_by_numbers(pool: MySqlPool) {
        insert_employee(&pool, new_employee("John")).await.unwrap();
        insert_employee(&pool, new_employee("Jane")).await.unwrap();

        let found = find_employees_by_numbers(&pool, &["EMP002".to_string(), "EMP404".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].first_name, "Jane");
        assert!(find_employees_by_numbers(&pool, &[]).await.unwrap().is_empty());
    }

    #[sqlx::test]
    async fn test_number_taken_outside_service_is_skipped(pool: MySqlPool) {
        // written after startup reconciliation, so the counter still points at it
        reconcile_employee_sequence(&pool).await.unwrap();
        sqlx::query("INSERT INTO employees (employee_number) VALUES ('EMP001')")
            .execute(&pool)
            .await
            .unwrap();

        let employee = insert_employee(&pool, new_employee("John")).await.unwrap();
        assert_eq!(employee.employee_number, "EMP002");

        let next = insert_employee(&pool, new_employee("Jane")).await.unwrap();
        assert_eq!(next.employee_number, "EMP003");
    }

    #[sqlx::test]
    async fn test_find_by_numbers_spans_chunks(pool: MySqlPool) {
        for _ in 0..3 {
            insert_employee(&pool, new_employee("John")).await.unwrap();
        }

        // EMP003 lands in the second chunk
        let mut numbers: Vec<String> = (1000..1000 + LOOKUP_CHUNK_SIZE as u64)
            .map(format_employee_number)
            .collect();
        numbers.insert(0, "EMP001".to_string());
        numbers.push("EMP003".to_string());

        let found = find_employees_by_numbers(&pool, &numbers).await.unwrap();
        let found: Vec<&str> = found.iter().map(|e| e.employee_number.as_str()).collect();
        assert_eq!(found, vec!["EMP001", "EMP003"]);
    }
}
