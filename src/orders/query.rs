//! Listing criteria as they arrive from the outside, and their parsing.
//!
//! Pagination is forgiving: a missing, zero or unparsable `page`/`limit`
//! falls back to the defaults instead of failing the request. Filters are
//! strict: an unknown status or a malformed date is a validation error.

use crate::model::{OrderFilter, OrderStatus};
use crate::order_actor::OrderError;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Raw listing query. Every field is optional text.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    /// Vendor listings only: which vendor (admins).
    pub vendor_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Self {
        let positive = |raw: Option<&str>| {
            raw.and_then(|value| value.trim().parse::<u32>().ok())
                .filter(|value| *value > 0)
        };
        Self {
            page: positive(page).unwrap_or(DEFAULT_PAGE),
            limit: positive(limit).map_or(DEFAULT_LIMIT, |limit| limit.min(MAX_LIMIT)),
        }
    }

    fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.limit as usize)
    }

    /// Cuts one page out of `items` and describes it.
    pub fn slice<T>(&self, items: Vec<T>) -> (Vec<T>, Pagination) {
        let total = items.len();
        let pagination = Pagination {
            page: self.page,
            limit: self.limit,
            total,
            total_pages: total.div_ceil(self.limit as usize),
        };
        let page = items
            .into_iter()
            .skip(self.offset())
            .take(self.limit as usize)
            .collect();
        (page, pagination)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: usize,
    pub total_pages: usize,
}

fn blank_to_none(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Accepts RFC 3339 timestamps or plain dates. A plain date means the start
/// of that day for `from` and its end for `to`, so both bounds are inclusive.
fn parse_bound(field: &str, raw: &str, end_of_day: bool) -> Result<DateTime<Utc>, OrderError> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| OrderError::ValidationError(format!("{field} must be a date (YYYY-MM-DD)")))?;
    let naive = if end_of_day {
        date.and_hms_milli_opt(23, 59, 59, 999)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    naive
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| OrderError::ValidationError(format!("{field} is out of range")))
}

impl OrderQuery {
    /// Splits the query into store criteria and the requested page.
    pub fn parse(&self) -> Result<(OrderFilter, PageRequest), OrderError> {
        let status = blank_to_none(&self.status)
            .map(|raw| {
                raw.parse::<OrderStatus>()
                    .map_err(|_| OrderError::ValidationError(format!("unknown status: {raw}")))
            })
            .transpose()?;
        let created_from = blank_to_none(&self.from)
            .map(|raw| parse_bound("from", raw, false))
            .transpose()?;
        let created_to = blank_to_none(&self.to)
            .map(|raw| parse_bound("to", raw, true))
            .transpose()?;
        if let (Some(from), Some(to)) = (created_from, created_to) {
            if from > to {
                return Err(OrderError::ValidationError(
                    "from must not be after to".into(),
                ));
            }
        }
        let filter = OrderFilter {
            status,
            search: blank_to_none(&self.search).map(str::to_string),
            created_from,
            created_to,
            ..OrderFilter::default()
        };
        let page = PageRequest::parse(self.page.as_deref(), self.limit.as_deref());
        Ok((filter, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_pagination_falls_back_to_defaults() {
        for (page, limit) in [
            (None, None),
            (Some("0"), Some("0")),
            (Some("abc"), Some("-3")),
            (Some(""), Some("1.5")),
        ] {
            assert_eq!(
                PageRequest::parse(page, limit),
                PageRequest { page: 1, limit: 10 }
            );
        }
        assert_eq!(
            PageRequest::parse(Some("3"), Some("500")),
            PageRequest { page: 3, limit: 100 }
        );
    }

    #[test]
    fn slice_reports_totals_for_all_items() {
        let request = PageRequest { page: 2, limit: 5 };
        let (page, pagination) = request.slice((1..=12).collect::<Vec<_>>());
        assert_eq!(page, vec![6, 7, 8, 9, 10]);
        assert_eq!(pagination.total, 12);
        assert_eq!(pagination.total_pages, 3);

        let (empty, pagination) = PageRequest { page: 9, limit: 5 }.slice((1..=12).collect::<Vec<_>>());
        assert!(empty.is_empty());
        assert_eq!(pagination.page, 9);
    }

    #[test]
    fn date_bounds_cover_whole_days() {
        let query = OrderQuery {
            from: Some("2024-01-15".into()),
            to: Some("2024-01-15".into()),
            status: Some("shipped".into()),
            ..OrderQuery::default()
        };
        let (filter, _) = query.parse().unwrap();
        assert_eq!(filter.status, Some(OrderStatus::Shipped));
        assert_eq!(
            filter.created_from.unwrap().to_rfc3339(),
            "2024-01-15T00:00:00+00:00"
        );
        assert!(filter.created_to.unwrap() > Utc.with_ymd_and_hms(2024, 1, 15, 23, 59, 59).unwrap());
    }

    #[test]
    fn malformed_filters_are_rejected() {
        let bad_status = OrderQuery {
            status: Some("lost".into()),
            ..OrderQuery::default()
        };
        assert!(matches!(bad_status.parse(), Err(OrderError::ValidationError(_))));

        let bad_date = OrderQuery {
            from: Some("15/01/2024".into()),
            ..OrderQuery::default()
        };
        assert!(matches!(bad_date.parse(), Err(OrderError::ValidationError(_))));
    }
}
