use actix_web::{HttpResponse, web};
use sqlx::MySqlPool;
use tracing::{info, instrument};

use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::employee::{Employee, NewEmployee},
    store::employee as store,
};

#[utoipa::path(
    get,
    path = "/api/employees",
    responses(
        (status = 200, description = "All employees in insertion order", body = [Employee]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn list_employees(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, AppError> {
    let employees = store::list_employees(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(employees))
}

/// Create Employee. The employee number is generated; any supplied one is ignored.
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = NewEmployee,
    responses(
        (status = 200, description = "Employee created", body = Employee),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Employee number already taken", body = Object, example = json!({
            "message": "Employee number EMP042 already exists"
        })),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "message": "Internal Server Error"
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
#[instrument(skip(pool, payload), fields(user_id = auth.user_id))]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<NewEmployee>,
) -> Result<HttpResponse, AppError> {
    let employee = store::insert_employee(pool.get_ref(), payload.into_inner()).await?;
    info!(employee_number = %employee.employee_number, "Employee created");
    Ok(HttpResponse::Ok().json(employee))
}

#[utoipa::path(
    get,
    path = "/api/employees/{employee_number}",
    params(
        ("employee_number", Path, description = "Employee number, e.g. EMP001")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn get_employee(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let employee_number = path.into_inner();

    match store::find_employee_by_number(pool.get_ref(), &employee_number).await? {
        Some(employee) => Ok(HttpResponse::Ok().json(employee)),
        None => Err(AppError::NotFound("Employee not found".to_string())),
    }
}
