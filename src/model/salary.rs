use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_number": "EMP001",
        "gross_salary": 300000.0,
        "total_deduction": 20000.0,
        "net_salary": 280000.0,
        "month": "2024-05"
    })
)]
pub struct Salary {
    pub id: u64,
    /// May reference an employee that no longer exists
    pub employee_number: String,
    pub gross_salary: f64,
    pub total_deduction: f64,
    pub net_salary: f64,
    #[schema(example = "2024-05")]
    pub month: String,
}
