use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "department_code": "CW",
        "department_name": "Carwash",
        "gross_salary": 300000.0
    })
)]
pub struct Department {
    pub id: u64,
    pub department_code: String,
    pub department_name: String,
    pub gross_salary: f64,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewDepartment {
    #[schema(example = "CW")]
    pub department_code: String,
    #[schema(example = "Carwash")]
    pub department_name: String,
    #[serde(default)]
    #[schema(example = 300000.0)]
    pub gross_salary: f64,
}

/// A row of the fixed department seed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepartmentSeed {
    pub code: &'static str,
    pub name: &'static str,
    pub gross_salary: f64,
}

/// Rows written by the department reset, in insertion order.
pub const DEFAULT_DEPARTMENTS: [DepartmentSeed; 4] = [
    DepartmentSeed { code: "CW", name: "Carwash", gross_salary: 300_000.0 },
    DepartmentSeed { code: "ST", name: "Stock", gross_salary: 200_000.0 },
    DepartmentSeed { code: "MC", name: "Mechanic", gross_salary: 450_000.0 },
    DepartmentSeed { code: "ADMS", name: "Administration Staff", gross_salary: 600_000.0 },
];
