use crate::api::salary::{CreateSalary, UpdateSalary};
use crate::model::department::{Department, NewDepartment};
use crate::model::employee::{Employee, NewEmployee};
use crate::model::salary::Salary;
use crate::models::{LoginReqDto, TokenPair, UserReq};
use crate::payroll::report::PayrollReportRow;
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Payroll API",
        version = "1.0.0",
        description = r#"
## Employee Payroll Management

Tracks departments, employees and monthly salary records, and produces payroll reports.

### Key Features
- **Departments**: list, create, reset to the four default departments
- **Employees**: list, create (employee numbers `EMP001`, `EMP002`, ... are generated), look up by number
- **Salaries**: list, create, update, delete; net salary is always gross minus deduction
- **Reports**: payroll report over all salaries or one month

### Security
Everything except registration, login, refresh, logout and the department reset requires a
**JWT Bearer** access token obtained from `/api/auth/login`.
"#,
    ),
    paths(
        crate::auth::handlers::register,
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,

        crate::api::department::list_departments,
        crate::api::department::create_department,
        crate::api::department::init_departments,

        crate::api::employee::list_employees,
        crate::api::employee::create_employee,
        crate::api::employee::get_employee,

        crate::api::salary::list_salaries,
        crate::api::salary::create_salary,
        crate::api::salary::update_salary,
        crate::api::salary::delete_salary,

        crate::api::report::payroll_report,
        crate::api::report::payroll_report_by_month
    ),
    components(
        schemas(
            UserReq,
            LoginReqDto,
            TokenPair,
            Department,
            NewDepartment,
            Employee,
            NewEmployee,
            Salary,
            CreateSalary,
            UpdateSalary,
            PayrollReportRow
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration and token APIs"),
        (name = "Department", description = "Department APIs"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Salary", description = "Monthly salary record APIs"),
        (name = "Report", description = "Payroll report APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use utoipa::openapi::PathItemType;

    #[test]
    fn test_openapi_lists_payroll_routes() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/reports/payroll/{month}"));
        assert!(paths.contains_key("/api/employees/{employee_number}"));
        assert!(paths.contains_key("/api/departments/init"));
    }

    #[test]
    fn test_conflicts_are_documented() {
        let doc = ApiDoc::openapi();
        let responses = |path: &str| {
            let operation = &doc.paths.paths[path].operations[&PathItemType::Post];
            operation.responses.responses.keys().cloned().collect::<Vec<_>>()
        };

        assert!(responses("/api/employees").contains(&"409".to_string()));
        assert!(responses("/api/departments").contains(&"409".to_string()));
        assert!(responses("/api/auth/register").contains(&"409".to_string()));
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
