use std::env;

use anyhow::{bail, Context};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,

    pub jwt_secret: String,
    pub jwt_issuer: String,

    /// Timezone used to bucket completions into calendar days.
    pub reporting_offset: FixedOffset,
    pub calendar_default_days: u32,
    pub calendar_max_days: u32,

    pub log_rate_limit_per_minute: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let offset_minutes: i32 = parse_var("STREAK_UTC_OFFSET_MINUTES", 0)?;
        let reporting_offset = reporting_offset(offset_minutes)?;

        let calendar_default_days: u32 = parse_var("CALENDAR_DEFAULT_DAYS", 30)?;
        let calendar_max_days: u32 = parse_var("CALENDAR_MAX_DAYS", 366)?;
        if calendar_default_days == 0 || calendar_default_days > calendar_max_days {
            bail!("CALENDAR_DEFAULT_DAYS must be between 1 and CALENDAR_MAX_DAYS");
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://serious_saturday.db".into()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_var("PORT", 8080)?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3001".into()),

            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER")
                .unwrap_or_else(|_| "serious-saturday-api".into()),

            reporting_offset,
            calendar_default_days,
            calendar_max_days,

            log_rate_limit_per_minute: parse_var("LOG_RATE_LIMIT_PER_MINUTE", 30)?,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The calendar day `now` falls on in the reporting timezone.
    pub fn today_at(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.reporting_offset).date_naive()
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} must be a number")),
        Err(_) => Ok(default),
    }
}

fn reporting_offset(minutes: i32) -> anyhow::Result<FixedOffset> {
    if minutes.abs() > 18 * 60 {
        bail!("STREAK_UTC_OFFSET_MINUTES must be within ±1080, got {minutes}");
    }
    FixedOffset::east_opt(minutes * 60).context("invalid STREAK_UTC_OFFSET_MINUTES")
}
