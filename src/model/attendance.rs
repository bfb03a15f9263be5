use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr)]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
    Leave,
}

impl AttendanceStatus {
    /// Statuses that count towards actual working days.
    pub const WORKING: [AttendanceStatus; 2] = [AttendanceStatus::Present, AttendanceStatus::Late];

    pub fn counts_as_working_day(self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::Late)
    }
}
