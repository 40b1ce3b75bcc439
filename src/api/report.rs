use actix_web::{HttpResponse, web};
use sqlx::MySqlPool;

use crate::{
    auth::auth::AuthUser,
    error::AppError,
    payroll::report::PayrollReportRow,
    store::report::load_payroll_report,
};

#[utoipa::path(
    get,
    path = "/api/reports/payroll",
    responses(
        (status = 200, description = "Payroll report over every salary record", body = [PayrollReportRow]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Report"
)]
pub async fn payroll_report(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, AppError> {
    let rows = load_payroll_report(pool.get_ref(), None).await?;
    Ok(HttpResponse::Ok().json(rows))
}

#[utoipa::path(
    get,
    path = "/api/reports/payroll/{month}",
    params(
        ("month", Path, description = "Month label, matched exactly, e.g. 2024-05")
    ),
    responses(
        (status = 200, description = "Payroll report for one month", body = [PayrollReportRow]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Report"
)]
pub async fn payroll_report_by_month(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let month = path.into_inner();
    let rows = load_payroll_report(pool.get_ref(), Some(&month)).await?;
    Ok(HttpResponse::Ok().json(rows))
}
