//! MySQL-backed record store: one module per collection.

pub mod department;
pub mod employee;
pub mod report;
pub mod salary;
pub mod sequence;
pub mod token;
pub mod user;
