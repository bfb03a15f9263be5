//! Payroll state machine: `Draft -> Approved -> Paid`.
//!
//! Paid is terminal and immutable; no transition into Paid is exposed here.

use std::str::FromStr;

use crate::model::payroll::PayrollStatus;
use crate::payroll::error::{PayrollError, PayrollResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Approve,
    Recalculate,
    Delete,
    Adjust,
}

impl LifecycleAction {
    pub fn verb(self) -> &'static str {
        match self {
            LifecycleAction::Approve => "approve",
            LifecycleAction::Recalculate => "recalculate",
            LifecycleAction::Delete => "delete",
            LifecycleAction::Adjust => "adjust",
        }
    }
}

/// What approving an already Approved payroll does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApprovePolicy {
    /// Succeeds without changes.
    #[default]
    Idempotent,
    /// Fails with `InvalidState`.
    Strict,
}

impl FromStr for ApprovePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "idempotent" => Ok(ApprovePolicy::Idempotent),
            "strict" => Ok(ApprovePolicy::Strict),
            other => Err(format!("unknown approve policy `{other}`")),
        }
    }
}

/// Outcome of a permitted transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The record moves to this status.
    To(PayrollStatus),
    /// Nothing to write.
    NoOp,
}

fn invalid(payroll_id: u64, status: PayrollStatus, action: LifecycleAction) -> PayrollError {
    PayrollError::InvalidState {
        payroll_id,
        status,
        action: action.verb(),
    }
}

/// Decide whether `action` may run on a record in `status`.
///
/// `Delete` and `Adjust` keep the current status; the caller sets
/// `deleted_at` or the adjusted fields.
pub fn transition(
    payroll_id: u64,
    status: PayrollStatus,
    action: LifecycleAction,
    approve_policy: ApprovePolicy,
) -> PayrollResult<Transition> {
    use PayrollStatus::*;

    match (status, action) {
        (Paid, _) => Err(invalid(payroll_id, status, action)),

        (Draft, LifecycleAction::Approve) => Ok(Transition::To(Approved)),
        (Approved, LifecycleAction::Approve) => match approve_policy {
            ApprovePolicy::Idempotent => Ok(Transition::NoOp),
            ApprovePolicy::Strict => Err(invalid(payroll_id, status, action)),
        },

        (Draft | Approved, LifecycleAction::Recalculate) => Ok(Transition::To(Draft)),
        (Draft | Approved, LifecycleAction::Delete | LifecycleAction::Adjust) => {
            Ok(Transition::To(status))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PayrollStatus::*;

    const ALL_ACTIONS: [LifecycleAction; 4] = [
        LifecycleAction::Approve,
        LifecycleAction::Recalculate,
        LifecycleAction::Delete,
        LifecycleAction::Adjust,
    ];

    #[test]
    fn paid_rejects_every_action() {
        for action in ALL_ACTIONS {
            for policy in [ApprovePolicy::Idempotent, ApprovePolicy::Strict] {
                let err = transition(1, Paid, action, policy).unwrap_err();
                assert!(matches!(err, PayrollError::InvalidState { status: Paid, .. }));
            }
        }
    }

    #[test]
    fn draft_approves() {
        assert_eq!(
            transition(1, Draft, LifecycleAction::Approve, ApprovePolicy::Idempotent).unwrap(),
            Transition::To(Approved)
        );
    }

    #[test]
    fn approving_twice_depends_on_policy() {
        assert_eq!(
            transition(1, Approved, LifecycleAction::Approve, ApprovePolicy::Idempotent).unwrap(),
            Transition::NoOp
        );
        assert!(transition(1, Approved, LifecycleAction::Approve, ApprovePolicy::Strict).is_err());
    }

    #[test]
    fn recalculation_returns_to_draft() {
        for status in [Draft, Approved] {
            assert_eq!(
                transition(1, status, LifecycleAction::Recalculate, ApprovePolicy::default()).unwrap(),
                Transition::To(Draft)
            );
        }
    }

    #[test]
    fn delete_and_adjust_keep_status() {
        for status in [Draft, Approved] {
            for action in [LifecycleAction::Delete, LifecycleAction::Adjust] {
                assert_eq!(
                    transition(1, status, action, ApprovePolicy::default()).unwrap(),
                    Transition::To(status)
                );
            }
        }
    }

    #[test]
    fn parses_policy_names() {
        assert_eq!("Strict".parse::<ApprovePolicy>().unwrap(), ApprovePolicy::Strict);
        assert_eq!(" idempotent ".parse::<ApprovePolicy>().unwrap(), ApprovePolicy::Idempotent);
        assert!("maybe".parse::<ApprovePolicy>().is_err());
    }
}
