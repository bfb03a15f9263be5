pub mod attendance;
pub mod employee;
pub mod payroll;
pub mod payroll_config;
pub mod role;
