//! MySQL implementations of the payroll collaborators.

pub mod attendance;
pub mod employee;
pub mod payroll;
pub mod payroll_config;

pub use attendance::MySqlAttendance;
pub use employee::MySqlEmployees;
pub use payroll::MySqlPayrolls;
pub use payroll_config::MySqlPayrollConfigs;
