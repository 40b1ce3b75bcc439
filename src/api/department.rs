use actix_web::{HttpResponse, web};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{info, instrument};

use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::department::{Department, NewDepartment},
    store::department as store,
};

#[utoipa::path(
    get,
    path = "/api/departments",
    responses(
        (status = 200, description = "All departments in insertion order", body = [Department]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn list_departments(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, AppError> {
    let departments = store::list_departments(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(departments))
}

#[utoipa::path(
    post,
    path = "/api/departments",
    request_body = NewDepartment,
    responses(
        (status = 200, description = "Department created", body = Department),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Department code already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
#[instrument(skip(pool, payload), fields(user_id = auth.user_id, code = %payload.department_code))]
pub async fn create_department(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<NewDepartment>,
) -> Result<HttpResponse, AppError> {
    let department = store::insert_department(pool.get_ref(), payload.into_inner()).await?;
    info!(id = department.id, "Department created");
    Ok(HttpResponse::Ok().json(department))
}

/// Deletes every department and writes the four default rows.
#[utoipa::path(
    post,
    path = "/api/departments/init",
    responses(
        (status = 200, description = "Departments initialized", body = Object, example = json!({
            "message": "Departments initialized",
            "data": [{"id": 1, "department_code": "CW", "department_name": "Carwash", "gross_salary": 300000.0}]
        }))
    ),
    tag = "Department"
)]
pub async fn init_departments(pool: web::Data<MySqlPool>) -> Result<HttpResponse, AppError> {
    let departments = store::reset_departments(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Departments initialized",
        "data": departments
    })))
}
