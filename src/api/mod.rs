pub mod department;
pub mod employee;
pub mod report;
pub mod salary;
