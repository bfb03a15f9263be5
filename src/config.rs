use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use dotenvy::dotenv;

use crate::payroll::{ApprovePolicy, PayrollSettings, RecalculationPolicy};

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    pub payroll: PayrollSettings,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn parsed_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow!("invalid value `{raw}` for {key}: {e}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let defaults = PayrollSettings::default();
        let timeout_ms = parsed_or(
            "PAYROLL_ATTENDANCE_TIMEOUT_MS",
            defaults.attendance_timeout.as_millis() as u64,
        )?;

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,

            rate_protected_per_min: parsed_or("RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            payroll: PayrollSettings {
                recalculation_policy: parsed_or::<RecalculationPolicy>(
                    "PAYROLL_RECALC_POLICY",
                    defaults.recalculation_policy,
                )?,
                approve_policy: parsed_or::<ApprovePolicy>(
                    "PAYROLL_APPROVE_POLICY",
                    defaults.approve_policy,
                )?,
                batch_concurrency: parsed_or::<usize>(
                    "PAYROLL_BATCH_CONCURRENCY",
                    defaults.batch_concurrency,
                )?
                .max(1),
                attendance_timeout: Duration::from_millis(timeout_ms),
                attendance_retries: parsed_or("PAYROLL_ATTENDANCE_RETRIES", defaults.attendance_retries)?,
            },
        })
    }
}
