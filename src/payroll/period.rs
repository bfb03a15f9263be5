use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::payroll::error::{PayrollError, PayrollResult};

/// A payroll month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PayPeriod {
    pub year: i32,
    pub month: u32,
}

impl PayPeriod {
    pub fn new(year: i32, month: u32) -> PayrollResult<Self> {
        let period = Self { year, month };
        period.validate()?;
        Ok(period)
    }

    pub fn validate(&self) -> PayrollResult<()> {
        if (1..=9999).contains(&self.year) && self.first_day().is_some() {
            Ok(())
        } else {
            Err(PayrollError::InvalidPeriod {
                year: self.year,
                month: self.month,
            })
        }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// First day of the following month; attendance queries use `[first, next)`.
    pub fn next_first_day(&self) -> Option<NaiveDate> {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.next_first_day().and_then(|d| d.pred_opt())
    }
}

impl fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_months() {
        assert!(PayPeriod::new(2026, 0).is_err());
        assert!(PayPeriod::new(2026, 13).is_err());
        assert!(PayPeriod::new(0, 5).is_err());
        assert!(PayPeriod::new(2026, 12).is_ok());
    }

    #[test]
    fn last_day_handles_leap_years_and_december() {
        let feb = PayPeriod::new(2028, 2).unwrap();
        assert_eq!(feb.last_day(), NaiveDate::from_ymd_opt(2028, 2, 29));
        let dec = PayPeriod::new(2026, 12).unwrap();
        assert_eq!(dec.next_first_day(), NaiveDate::from_ymd_opt(2027, 1, 1));
        assert_eq!(dec.last_day(), NaiveDate::from_ymd_opt(2026, 12, 31));
        assert_eq!(dec.to_string(), "2026-12");
    }
}
