//! Job triggers for the external scheduler, behind the cron bearer secret.

use super::orders::ApiResult;
use crate::http::envelope::Envelope;
use crate::http::error::ApiError;
use crate::http::extract::{ApiQuery, CronAuth};
use crate::http::AppState;
use crate::jobs::JobSummary;
use axum::extract::State;
use chrono::{Days, NaiveDate, Utc};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    /// `YYYY-MM-DD`; each job has its own default.
    pub date: Option<String>,
}

impl PeriodQuery {
    fn date_or(&self, default: NaiveDate) -> Result<NaiveDate, ApiError> {
        match self.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| ApiError::validation("date must be YYYY-MM-DD")),
            None => Ok(default),
        }
    }
}

/// Alerts for today (UTC) unless a date is given.
pub async fn inventory_check(
    _: CronAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PeriodQuery>,
) -> ApiResult<JobSummary> {
    let period = query.date_or(Utc::now().date_naive())?;
    Ok(Envelope::ok(state.jobs.inventory_check(period).await?))
}

/// Snapshots the previous UTC day unless a date is given: the scheduler
/// runs shortly after midnight, when that day is complete.
pub async fn analytics_snapshot(
    _: CronAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PeriodQuery>,
) -> ApiResult<JobSummary> {
    let today = Utc::now().date_naive();
    let yesterday = today.checked_sub_days(Days::new(1)).unwrap_or(today);
    let date = query.date_or(yesterday)?;
    Ok(Envelope::ok(state.jobs.analytics_snapshot(date).await?))
}

pub async fn cart_recovery(
    _: CronAuth,
    State(state): State<AppState>,
) -> ApiResult<JobSummary> {
    Ok(Envelope::ok(state.jobs.cart_recovery(Utc::now()).await?))
}
