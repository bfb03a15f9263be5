pub mod payroll;
pub mod payroll_config;
