use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::{department::Department, employee::Employee, salary::Salary};

/// Department label used when an employee's department code matches nothing.
pub const UNKNOWN_DEPARTMENT: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "first_name": "John",
        "last_name": "Doe",
        "position": "Washer",
        "department": "Carwash",
        "net_salary": 280000.0,
        "month": "2024-05"
    })
)]
pub struct PayrollReportRow {
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    pub department: String,
    pub net_salary: f64,
    pub month: String,
}

/// Joins salaries to their employee and that employee's department.
///
/// Rows follow the order of `salaries`. A salary whose employee is missing is
/// left out; an employee whose department is missing reports
/// [`UNKNOWN_DEPARTMENT`]. With `month` set only salaries of exactly that
/// month are considered.
pub fn build_payroll_report(
    salaries: &[Salary],
    employees: &[Employee],
    departments: &[Department],
    month: Option<&str>,
) -> Vec<PayrollReportRow> {
    let mut employees_by_number: HashMap<&str, &Employee> = HashMap::with_capacity(employees.len());
    for employee in employees {
        employees_by_number
            .entry(employee.employee_number.as_str())
            .or_insert(employee);
    }

    let mut department_names: HashMap<&str, &str> = HashMap::with_capacity(departments.len());
    for department in departments {
        department_names
            .entry(department.department_code.as_str())
            .or_insert(department.department_name.as_str());
    }

    salaries
        .iter()
        .filter(|salary| month.is_none_or(|m| salary.month == m))
        .filter_map(|salary| {
            let employee = employees_by_number.get(salary.employee_number.as_str())?;
            let department = department_names
                .get(employee.department_code.as_str())
                .copied()
                .unwrap_or(UNKNOWN_DEPARTMENT);

            Some(PayrollReportRow {
                first_name: employee.first_name.clone(),
                last_name: employee.last_name.clone(),
                position: employee.position.clone(),
                department: department.to_string(),
                net_salary: salary.net_salary,
                month: salary.month.clone(),
            })
        })
        .collect()
}

/// Distinct employee numbers referenced by `salaries`, first occurrence first.
pub fn referenced_employee_numbers(salaries: &[Salary]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(salaries.len());
    salaries
        .iter()
        .filter(|salary| seen.insert(salary.employee_number.as_str()))
        .map(|salary| salary.employee_number.clone())
        .collect()
}
