/// Net pay for a month. Deductions larger than the gross give a negative result.
pub fn net_salary(gross_salary: f64, total_deduction: f64) -> f64 {
    gross_salary - total_deduction
}

/// The three stored figures of a salary record, net always derived from the other two.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SalaryAmounts {
    pub gross_salary: f64,
    pub total_deduction: f64,
    pub net_salary: f64,
}

impl SalaryAmounts {
    pub fn new(gross_salary: f64, total_deduction: f64) -> Self {
        Self {
            gross_salary,
            total_deduction,
            net_salary: net_salary(gross_salary, total_deduction),
        }
    }

    /// Applies a partial update and recomputes net.
    pub fn with_changes(self, gross_salary: Option<f64>, total_deduction: Option<f64>) -> Self {
        Self::new(
            gross_salary.unwrap_or(self.gross_salary),
            total_deduction.unwrap_or(self.total_deduction),
        )
    }
}
