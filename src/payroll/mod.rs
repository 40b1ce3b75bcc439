//! Payroll rules that do not touch the database.

pub mod employee_number;
pub mod net_salary;
pub mod report;
