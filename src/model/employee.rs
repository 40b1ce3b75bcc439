use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_number": "EMP001",
        "first_name": "John",
        "last_name": "Doe",
        "position": "Washer",
        "address": "KG 11 Ave",
        "telephone": "+250788000000",
        "gender": "Male",
        "hired_date": "2024-01-01",
        "department_code": "CW"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "EMP001")]
    pub employee_number: String,

    #[schema(example = "John")]
    pub first_name: String,

    #[schema(example = "Doe")]
    pub last_name: String,

    #[schema(example = "Washer")]
    pub position: String,

    pub address: String,

    pub telephone: String,

    #[schema(example = "Male")]
    pub gender: String,

    #[schema(
        example = "2024-01-01",
        value_type = Option<String>,
        format = "date",
        nullable = true
    )]
    pub hired_date: Option<NaiveDate>,

    /// Not checked against existing departments
    #[schema(example = "CW")]
    pub department_code: String,
}

/// Employee fields accepted on creation. The employee number is always generated.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct NewEmployee {
    #[schema(example = "John")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "Washer")]
    pub position: String,
    #[schema(example = "KG 11 Ave")]
    pub address: String,
    #[schema(example = "+250788000000")]
    pub telephone: String,
    #[schema(example = "Male")]
    pub gender: String,
    #[schema(example = "2024-01-01", value_type = Option<String>, format = "date")]
    pub hired_date: Option<NaiveDate>,
    #[schema(example = "CW")]
    pub department_code: String,
}

impl NewEmployee {
    pub fn into_employee(self, id: u64, employee_number: String) -> Employee {
        Employee {
            id,
            employee_number,
            first_name: self.first_name,
            last_name: self.last_name,
            position: self.position,
            address: self.address,
            telephone: self.telephone,
            gender: self.gender,
            hired_date: self.hired_date,
            department_code: self.department_code,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_new_employee_ignores_supplied_number() {
        let payload: NewEmployee = serde_json::from_str(
            r#"{"employee_number":"EMP999","first_name":"Jane","hired_date":"2024-02-01"}"#,
        )
        .unwrap();
        let employee = payload.into_employee(7, "EMP003".to_string());
        assert_eq!(employee.employee_number, "EMP003");
        assert_eq!(employee.first_name, "Jane");
        assert_eq!(employee.last_name, "");
        assert_eq!(employee.hired_date, NaiveDate::from_ymd_opt(2024, 2, 1));
    }
}
