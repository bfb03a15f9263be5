//! Payroll calculation engine.
//!
//! `tax`, `resolver`, `calculator` and `lifecycle` are pure; `service` wires
//! them to the collaborators declared in `store`.

pub mod batch;
pub mod calculator;
pub mod error;
pub mod lifecycle;
pub mod period;
pub mod resolver;
pub mod service;
pub mod store;
pub mod tax;

pub use batch::{BatchError, BatchResult, CancelToken, GeneratePayroll};
pub use error::{PayrollError, PayrollResult};
pub use lifecycle::ApprovePolicy;
pub use period::PayPeriod;
pub use resolver::ConfigLookup;
pub use service::{PayrollService, PayrollSettings, RecalculationPolicy};
pub use tax::compute_tax;
