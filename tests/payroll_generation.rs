mod common;

use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use common::{MemoryAttendance, default_config, employee, harness, inactive};
use hrm_payroll::model::payroll::PayrollStatus;
use hrm_payroll::payroll::{CancelToken, GeneratePayroll, PayrollError, PayrollSettings};

fn request(year: i32, month: u32) -> GeneratePayroll {
    GeneratePayroll {
        year,
        month,
        employee_ids: None,
    }
}

fn for_ids(year: i32, month: u32, ids: &[u64]) -> GeneratePayroll {
    GeneratePayroll {
        year,
        month,
        employee_ids: Some(ids.to_vec()),
    }
}

#[actix_web::test]
async fn generates_draft_for_every_active_employee() {
    let h = harness(
        vec![
            employee(1, dec!(30000000)),
            employee(2, dec!(15000000)),
            inactive(3, dec!(20000000)),
        ],
        MemoryAttendance::uniform(22).with_days(2, 20),
        vec![default_config()],
        PayrollSettings::default(),
    );

    let result = h
        .service
        .generate(request(2026, 1), &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(result.total, 2);
    assert_eq!(result.succeeded, 2);
    assert_eq!(result.failed, 0);
    assert!(!result.cancelled);
    assert_eq!(result.created_ids.len(), 2);

    let first = h.service.get_by_employee_and_period(1, 2026, 1).await.unwrap().unwrap();
    assert_eq!(first.status, PayrollStatus::Draft);
    assert_eq!(first.personal_income_tax, dec!(1627500));
    assert_eq!(first.net_salary, dec!(25222500));
    assert_eq!(first.kpi_bonus, Decimal::ZERO);

    let second = h.service.get_by_employee_and_period(2, 2026, 1).await.unwrap().unwrap();
    assert_eq!(second.actual_working_days, 20);
    assert_eq!(second.personal_income_tax, dec!(53068));
    assert_eq!(second.net_salary, dec!(12008295.64));

    assert!(h.service.get_by_employee_and_period(3, 2026, 1).await.unwrap().is_none());
}

#[actix_web::test]
async fn second_run_reports_duplicates_without_new_records() {
    let h = harness(
        vec![employee(1, dec!(10000000)), employee(2, dec!(12000000))],
        MemoryAttendance::uniform(22),
        vec![default_config()],
        PayrollSettings::default(),
    );

    let first = h.service.generate(request(2026, 2), &CancelToken::new()).await.unwrap();
    assert_eq!(first.succeeded, 2);

    let second = h.service.generate(request(2026, 2), &CancelToken::new()).await.unwrap();
    assert_eq!(second.total, 2);
    assert_eq!(second.succeeded, 0);
    assert_eq!(second.failed, 2);
    assert!(second.errors.iter().all(|e| e.kind == "duplicate_payroll"));
    assert_eq!(second.errors[0].employee_name.as_deref(), Some("Test Employee1 (EMP-001)"));
    assert_eq!(h.payrolls.live_count(), 2);
}

#[actix_web::test]
async fn one_failing_employee_does_not_abort_the_batch() {
    let h = harness(
        vec![
            employee(1, dec!(10000000)),
            employee(2, dec!(10000000)),
            employee(3, dec!(10000000)),
        ],
        MemoryAttendance::uniform(22).failing_for(2),
        vec![default_config()],
        PayrollSettings::default(),
    );

    let result = h.service.generate(request(2026, 3), &CancelToken::new()).await.unwrap();

    assert_eq!(result.total, 3);
    assert_eq!(result.succeeded, 2);
    assert_eq!(result.failed, 1);
    assert_eq!(result.errors[0].employee_id, 2);
    assert_eq!(result.errors[0].kind, "attendance_lookup_error");
    assert_eq!(h.payrolls.live_count(), 2);
    // one retry for the failing employee
    assert_eq!(h.attendance.calls(), 4);
}

#[actix_web::test]
async fn concurrent_runs_create_one_record_per_employee() {
    let h = harness(
        vec![employee(1, dec!(10000000)), employee(2, dec!(11000000))],
        MemoryAttendance::uniform(22).slow(Duration::from_millis(20)),
        vec![default_config()],
        PayrollSettings::default(),
    );

    let cancel = CancelToken::new();
    let (a, b) = futures::join!(
        h.service.generate(request(2026, 4), &cancel),
        h.service.generate(request(2026, 4), &cancel),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.succeeded + b.succeeded, 2);
    assert_eq!(a.failed + b.failed, 2);
    assert!(
        a.errors
            .iter()
            .chain(b.errors.iter())
            .all(|e| e.kind == "duplicate_payroll")
    );
    assert_eq!(h.payrolls.live_count(), 2);
}

#[actix_web::test]
async fn explicit_ids_report_missing_and_inactive_employees() {
    let h = harness(
        vec![employee(1, dec!(10000000)), inactive(2, dec!(10000000))],
        MemoryAttendance::uniform(22),
        vec![default_config()],
        PayrollSettings::default(),
    );

    let result = h
        .service
        .generate(for_ids(2026, 5, &[1, 2, 99, 1]), &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(result.total, 3);
    assert_eq!(result.succeeded, 1);
    assert_eq!(result.failed, 2);
    assert_eq!(result.errors[0].employee_id, 2);
    assert_eq!(result.errors[0].kind, "inactive_employee");
    assert_eq!(result.errors[1].employee_id, 99);
    assert_eq!(result.errors[1].kind, "employee_not_found");
    assert_eq!(result.errors[1].employee_name, None);
}

#[actix_web::test]
async fn empty_id_list_means_all_active_employees() {
    let h = harness(
        vec![employee(1, dec!(10000000)), employee(2, dec!(10000000))],
        MemoryAttendance::uniform(22),
        vec![default_config()],
        PayrollSettings::default(),
    );

    let result = h
        .service
        .generate(for_ids(2026, 5, &[]), &CancelToken::new())
        .await
        .unwrap();
    assert_eq!(result.succeeded, 2);
}

#[actix_web::test]
async fn cancelled_batch_leaves_employees_unprocessed() {
    let h = harness(
        vec![employee(1, dec!(10000000)), employee(2, dec!(10000000))],
        MemoryAttendance::uniform(22),
        vec![default_config()],
        PayrollSettings::default(),
    );

    let cancel = CancelToken::new();
    cancel.cancel();
    let result = h.service.generate(request(2026, 6), &cancel).await.unwrap();

    assert!(result.cancelled);
    assert_eq!(result.total, 2);
    assert_eq!(result.not_processed, 2);
    assert_eq!(result.succeeded + result.failed + result.not_processed, result.total);
    assert_eq!(h.payrolls.live_count(), 0);
}

#[actix_web::test]
async fn missing_config_fails_the_whole_call() {
    let h = harness(
        vec![employee(1, dec!(10000000))],
        MemoryAttendance::uniform(22),
        vec![],
        PayrollSettings::default(),
    );

    let err = h
        .service
        .generate(request(2026, 1), &CancelToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, PayrollError::ConfigNotFound));

    let mut retired = default_config();
    retired.is_active = false;
    let h = harness(
        vec![employee(1, dec!(10000000))],
        MemoryAttendance::uniform(22),
        vec![retired],
        PayrollSettings::default(),
    );
    let err = h
        .service
        .generate(request(2026, 1), &CancelToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, PayrollError::ConfigNotFound));
    assert_eq!(h.payrolls.live_count(), 0);
}

#[actix_web::test]
async fn invalid_period_is_rejected() {
    let h = harness(
        vec![employee(1, dec!(10000000))],
        MemoryAttendance::uniform(22),
        vec![default_config()],
        PayrollSettings::default(),
    );

    let err = h
        .service
        .generate(request(2026, 13), &CancelToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, PayrollError::InvalidPeriod { month: 13, .. }));
    assert_eq!(h.attendance.calls(), 0);
}

#[actix_web::test]
async fn slow_attendance_times_out_per_employee() {
    let settings = PayrollSettings {
        attendance_timeout: Duration::from_millis(10),
        attendance_retries: 0,
        ..PayrollSettings::default()
    };
    let h = harness(
        vec![employee(1, dec!(10000000))],
        MemoryAttendance::uniform(22).slow(Duration::from_millis(200)),
        vec![default_config()],
        settings,
    );

    let result = h.service.generate(request(2026, 7), &CancelToken::new()).await.unwrap();

    assert_eq!(result.failed, 1);
    assert_eq!(result.errors[0].kind, "attendance_lookup_error");
    assert!(result.errors[0].message.contains("timed out"));
    assert_eq!(h.payrolls.live_count(), 0);
}

#[actix_web::test]
async fn insurance_uses_full_base_salary() {
    let h = harness(
        vec![employee(1, dec!(22000000))],
        MemoryAttendance::uniform(11),
        vec![default_config()],
        PayrollSettings::default(),
    );

    h.service.generate(request(2026, 8), &CancelToken::new()).await.unwrap();
    let payroll = h.service.get_by_employee_and_period(1, 2026, 8).await.unwrap().unwrap();

    assert_eq!(payroll.insurance_salary, dec!(22000000));
    assert_eq!(payroll.employee_insurance, dec!(2310000));
    assert_eq!(payroll.company_insurance, dec!(3850000));
    assert_eq!(payroll.personal_income_tax, Decimal::ZERO);
    assert_eq!(payroll.net_salary, dec!(8690000));
}

#[actix_web::test]
async fn regenerates_after_soft_delete() {
    let h = harness(
        vec![employee(1, dec!(10000000))],
        MemoryAttendance::uniform(22),
        vec![default_config()],
        PayrollSettings::default(),
    );

    let first = h.service.generate(request(2026, 9), &CancelToken::new()).await.unwrap();
    h.service.delete(first.created_ids[0]).await.unwrap();

    let second = h.service.generate(request(2026, 9), &CancelToken::new()).await.unwrap();
    assert_eq!(second.succeeded, 1);
    assert_ne!(second.created_ids[0], first.created_ids[0]);
    assert_eq!(h.payrolls.live_count(), 1);
}
