// src/services/dashboard_service.rs

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, db::DashboardRepository, models::dashboard::DashboardSummary};

/// Fuso fixo do negócio (ex.: -3 = Brasília).
pub fn business_offset(utc_offset_hours: i32) -> Result<FixedOffset, AppError> {
    Ok(FixedOffset::east_opt(utc_offset_hours * 3600)
        .ok_or_else(|| anyhow::anyhow!("Offset de fuso inválido: {}", utc_offset_hours))?)
}

/// Início do mês corrente no fuso do negócio, convertido para UTC.
/// Ex.: com offset -3, 01/05 00:00 (Brasília) = 01/05 03:00 UTC.
pub fn month_start(now: DateTime<Utc>, utc_offset_hours: i32) -> Result<DateTime<Utc>, AppError> {
    let local = now.with_timezone(&business_offset(utc_offset_hours)?);

    let local_midnight = NaiveDate::from_ymd_opt(local.year(), local.month(), 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| anyhow::anyhow!("Data inválida para início do mês: {}", local))?;

    let utc_naive = local_midnight - Duration::hours(i64::from(utc_offset_hours));
    Ok(Utc.from_utc_datetime(&utc_naive))
}

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    low_stock_threshold: i32,
    business_utc_offset_hours: i32,
}

impl DashboardService {
    pub fn new(
        repo: DashboardRepository,
        low_stock_threshold: i32,
        business_utc_offset_hours: i32,
    ) -> Self {
        Self { repo, low_stock_threshold, business_utc_offset_hours }
    }

    pub async fn get_summary<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
    ) -> Result<DashboardSummary, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let since = month_start(Utc::now(), self.business_utc_offset_hours)?;
        self.repo
            .get_summary(executor, user_id, since, self.low_stock_threshold)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn month_start_in_brasilia_is_three_hours_after_utc_midnight() {
        assert_eq!(month_start(utc(2024, 5, 15, 12), -3).unwrap(), utc(2024, 5, 1, 3));
    }

    #[test]
    fn late_night_on_last_day_still_belongs_to_previous_month() {
        // 01/06 01:00 UTC = 31/05 22:00 em Brasília
        assert_eq!(month_start(utc(2024, 6, 1, 1), -3).unwrap(), utc(2024, 5, 1, 3));
    }

    #[test]
    fn january_with_positive_offset_crosses_the_year() {
        // 01/01 00:00 em UTC+3 = 31/12 21:00 UTC
        assert_eq!(month_start(utc(2024, 1, 10, 0), 3).unwrap(), utc(2023, 12, 31, 21));
    }

    #[test]
    fn zero_offset_is_plain_utc_midnight() {
        assert_eq!(month_start(utc(2024, 2, 29, 23), 0).unwrap(), utc(2024, 2, 1, 0));
    }

    #[test]
    fn absurd_offset_is_an_error() {
        assert!(month_start(utc(2024, 2, 1, 0), 48).is_err());
    }
}
