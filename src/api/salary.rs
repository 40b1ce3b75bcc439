use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::salary::Salary,
    payroll::net_salary::SalaryAmounts,
    store::{department, employee, salary as store},
};

/// Net salary is always derived; a client supplied `net_salary` is ignored.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSalary {
    #[schema(example = "EMP001")]
    pub employee_number: String,

    /// Defaults to the gross salary of the employee's department
    #[schema(example = 300000.0)]
    pub gross_salary: Option<f64>,

    #[schema(example = 20000.0)]
    pub total_deduction: Option<f64>,

    #[schema(example = "2024-05")]
    pub month: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSalary {
    #[schema(example = "EMP001")]
    pub employee_number: Option<String>,

    #[schema(example = 320000.0)]
    pub gross_salary: Option<f64>,

    #[schema(example = 25000.0)]
    pub total_deduction: Option<f64>,

    #[schema(example = "2024-06")]
    pub month: Option<String>,
}

/// Gross salary configured on the department of `employee_number`, if both exist.
async fn department_gross_salary(
    pool: &MySqlPool,
    employee_number: &str,
) -> Result<Option<f64>, AppError> {
    let Some(employee) = employee::find_employee_by_number(pool, employee_number).await? else {
        return Ok(None);
    };
    let department = department::find_department_by_code(pool, &employee.department_code).await?;
    Ok(department.map(|d| d.gross_salary))
}

/// Amounts for a new salary: an omitted gross falls back to the department
/// gross, an omitted deduction counts as 0.
async fn salary_amounts(
    pool: &MySqlPool,
    payload: &CreateSalary,
) -> Result<SalaryAmounts, AppError> {
    let gross_salary = match payload.gross_salary {
        Some(gross) => gross,
        None => {
            debug!("Gross salary omitted, using department gross");
            department_gross_salary(pool, &payload.employee_number)
                .await?
                .ok_or_else(|| {
                    AppError::BadRequest(
                        "gross_salary is required when the employee's department is unknown"
                            .to_string(),
                    )
                })?
        }
    };

    Ok(SalaryAmounts::new(gross_salary, payload.total_deduction.unwrap_or(0.0)))
}

/// Merges a partial update into `current`; net salary is recomputed.
fn apply_update(current: Salary, body: UpdateSalary) -> Salary {
    let amounts = SalaryAmounts::new(current.gross_salary, current.total_deduction)
        .with_changes(body.gross_salary, body.total_deduction);

    Salary {
        id: current.id,
        employee_number: body.employee_number.unwrap_or(current.employee_number),
        gross_salary: amounts.gross_salary,
        total_deduction: amounts.total_deduction,
        net_salary: amounts.net_salary,
        month: body.month.unwrap_or(current.month),
    }
}

#[utoipa::path(
    get,
    path = "/api/salaries",
    responses(
        (status = 200, description = "All salary records in insertion order", body = [Salary]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn list_salaries(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, AppError> {
    let salaries = store::list_salaries(pool.get_ref(), None).await?;
    Ok(HttpResponse::Ok().json(salaries))
}

#[utoipa::path(
    post,
    path = "/api/salaries",
    request_body = CreateSalary,
    responses(
        (status = 200, description = "Salary created", body = Salary),
        (status = 400, description = "Gross salary missing and not derivable from the department"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
#[instrument(skip(pool, payload), fields(user_id = auth.user_id, employee_number = %payload.employee_number))]
pub async fn create_salary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateSalary>,
) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();

    let amounts = salary_amounts(pool.get_ref(), &payload).await?;
    let salary =
        store::insert_salary(pool.get_ref(), payload.employee_number, payload.month, amounts).await?;

    info!(id = salary.id, net_salary = salary.net_salary, "Salary created");
    Ok(HttpResponse::Ok().json(salary))
}

#[utoipa::path(
    put,
    path = "/api/salaries/{salary_id}",
    request_body = UpdateSalary,
    params(
        ("salary_id", Path, description = "Salary ID")
    ),
    responses(
        (status = 200, description = "Salary updated", body = Salary),
        (status = 404, description = "Salary not found", body = Object, example = json!({
            "message": "Salary not found"
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
#[instrument(skip(pool, body), fields(user_id = auth.user_id))]
pub async fn update_salary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdateSalary>,
) -> Result<HttpResponse, AppError> {
    let salary_id = path.into_inner();
    let body = body.into_inner();

    let updated = store::update_salary(pool.get_ref(), salary_id, |current| {
        apply_update(current, body)
    })
    .await?
    .ok_or_else(|| AppError::NotFound("Salary not found".to_string()))?;

    info!(salary_id, net_salary = updated.net_salary, "Salary updated");
    Ok(HttpResponse::Ok().json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/salaries/{salary_id}",
    params(
        ("salary_id", Path, description = "Salary ID")
    ),
    responses(
        (status = 200, description = "Deleted", body = Object, example = json!({
            "message": "Deleted"
        })),
        (status = 404, description = "Salary not found"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
#[instrument(skip(pool), fields(user_id = auth.user_id))]
pub async fn delete_salary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let salary_id = path.into_inner();

    if !store::delete_salary(pool.get_ref(), salary_id).await? {
        return Err(AppError::NotFound("Salary not found".to_string()));
    }

    info!(salary_id, "Salary deleted");
    Ok(HttpResponse::Ok().json(json!({
        "message": "Deleted"
    })))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_create_salary_ignores_net_salary() {
        let payload: CreateSalary = serde_json::from_str(
            r#"{"employee_number":"EMP001","gross_salary":300000,"total_deduction":20000,"net_salary":1,"month":"2024-05"}"#,
        )
        .unwrap();
        let amounts = SalaryAmounts::new(
            payload.gross_salary.unwrap(),
            payload.total_deduction.unwrap_or(0.0),
        );
        assert_eq!(amounts.net_salary, 280_000.0);
    }

    #[test]
    fn test_update_salary_fields_are_optional() {
        let payload: UpdateSalary = serde_json::from_str(r#"{"total_deduction":5}"#).unwrap();
        assert!(payload.gross_salary.is_none());
        assert!(payload.month.is_none());
        assert_eq!(payload.total_deduction, Some(5.0));
    }

    #[test]
    fn test_apply_update_recomputes_net() {
        let current = Salary {
            id: 7,
            employee_number: "EMP001".to_string(),
            gross_salary: 300_000.0,
            total_deduction: 20_000.0,
            net_salary: 280_000.0,
            month: "2024-05".to_string(),
        };
        let body: UpdateSalary = serde_json::from_str(r#"{"total_deduction":50000}"#).unwrap();

        let updated = apply_update(current, body);

        assert_eq!(updated.id, 7);
        assert_eq!(updated.gross_salary, 300_000.0);
        assert_eq!(updated.net_salary, 250_000.0);
        assert_eq!(updated.month, "2024-05");
    }
}

#[cfg(feature = "integration-test")]
#[cfg(test)]
mod integration_test {
    use super::*;
    use crate::model::employee::NewEmployee;

    fn create(employee_number: &str, gross_salary: Option<f64>) -> CreateSalary {
        CreateSalary {
            employee_number: employee_number.to_string(),
            gross_salary,
            total_deduction: Some(20_000.0),
            month: "2024-05".to_string(),
        }
    }

    async fn employee_in(pool: &MySqlPool, department_code: &str) -> String {
        let new = NewEmployee {
            first_name: "John".to_string(),
            department_code: department_code.to_string(),
            ..Default::default()
        };
        employee::insert_employee(pool, new).await.unwrap().employee_number
    }

    #[sqlx::test]
    async fn test_omitted_gross_uses_department_gross(pool: MySqlPool) {
        department::reset_departments(&pool).await.unwrap();
        let number = employee_in(&pool, "CW").await;

        let amounts = salary_amounts(&pool, &create(&number, None)).await.unwrap();

        assert_eq!(amounts.gross_salary, 300_000.0);
        assert_eq!(amounts.net_salary, 280_000.0);
    }

    #[sqlx::test]
    async fn test_given_gross_overrides_department(pool: MySqlPool) {
        department::reset_departments(&pool).await.unwrap();
        let number = employee_in(&pool, "CW").await;

        let amounts = salary_amounts(&pool, &create(&number, Some(1_000.0))).await.unwrap();

        assert_eq!(amounts.gross_salary, 1_000.0);
    }

    #[sqlx::test]
    async fn test_omitted_gross_with_unknown_department_is_rejected(pool: MySqlPool) {
        department::reset_departments(&pool).await.unwrap();
        let number = employee_in(&pool, "ZZ").await;

        let result = salary_amounts(&pool, &create(&number, None)).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[sqlx::test]
    async fn test_omitted_gross_with_unknown_employee_is_rejected(pool: MySqlPool) {
        department::reset_departments(&pool).await.unwrap();

        let result = salary_amounts(&pool, &create("EMP404", None)).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[sqlx::test]
    async fn test_omitted_deduction_counts_as_zero(pool: MySqlPool) {
        department::reset_departments(&pool).await.unwrap();
        let number = employee_in(&pool, "MC").await;
        let payload = CreateSalary {
            total_deduction: None,
            ..create(&number, None)
        };

        let amounts = salary_amounts(&pool, &payload).await.unwrap();

        assert_eq!(amounts.net_salary, 450_000.0);
    }
}
