use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::auth::permissions::Permission;
use crate::auth::AuthUser;
use crate::candidates::repository::list_created_between;
use crate::candidates::validation::parse_datetime;
use crate::errors::{AppError, FieldError};
use crate::reports::export::candidates_to_csv;
use crate::reports::metrics::{build_report, Report, ReportType};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReportQuery {
    #[serde(alias = "startDate")]
    pub start_date: Option<String>,
    #[serde(alias = "endDate")]
    pub end_date: Option<String>,
    #[serde(rename = "type")]
    pub report_type: Option<ReportType>,
    pub include_raw: bool,
}

/// A bare date as an upper bound covers that whole day.
fn parse_bound(field: &str, raw: Option<&str>, end_of_day: bool, errors: &mut Vec<FieldError>) -> Option<DateTime<Utc>> {
    let raw = raw.map(str::trim).filter(|r| !r.is_empty())?;
    if end_of_day {
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return date.and_hms_milli_opt(23, 59, 59, 999).map(|d| d.and_utc());
        }
    }
    let parsed = parse_datetime(raw);
    if parsed.is_none() {
        errors.push(FieldError::new(field, "Fecha inválida. Use AAAA-MM-DD."));
    }
    parsed
}

impl ReportQuery {
    pub fn bounds(&self) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>), AppError> {
        let mut errors = Vec::new();
        let start = parse_bound("start_date", self.start_date.as_deref(), false, &mut errors);
        let end = parse_bound("end_date", self.end_date.as_deref(), true, &mut errors);
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                errors.push(FieldError::new("end_date", "La fecha final debe ser posterior a la inicial."));
            }
        }
        if errors.is_empty() {
            Ok((start, end))
        } else {
            Err(AppError::InvalidInput(errors))
        }
    }
}

/// GET /api/reports
pub async fn handle_get_report(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Report>, AppError> {
    user.require(Permission::ReportsRead)?;
    let (start, end) = query.bounds()?;
    let candidates = list_created_between(&state.db, start, end).await?;
    let report = build_report(
        candidates,
        start,
        end,
        query.report_type.unwrap_or_default(),
        query.include_raw,
        Utc::now(),
    );
    Ok(Json(report))
}

/// GET /api/reports/candidates.csv
pub async fn handle_export_csv(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, AppError> {
    user.require(Permission::ReportsRead)?;
    let (start, end) = query.bounds()?;
    let candidates = list_created_between(&state.db, start, end).await?;
    let file_name = format!("candidatos_{}.csv", Utc::now().format("%Y%m%d"));

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{file_name}\"")),
        ],
        candidates_to_csv(&candidates),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn query(start: &str, end: &str) -> ReportQuery {
        ReportQuery {
            start_date: Some(start.into()),
            end_date: Some(end.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_end_date_covers_whole_day() {
        let (start, end) = query("2026-01-01", "2026-01-31").bounds().unwrap();
        assert_eq!(start, Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()));
        let end = end.unwrap();
        assert!(end > Utc.with_ymd_and_hms(2026, 1, 31, 23, 59, 59).unwrap());
        assert!(end < Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_inverted_or_malformed_bounds_rejected() {
        assert!(query("2026-02-01", "2026-01-01").bounds().is_err());
        assert!(query("01/02/2026", "2026-03-01").bounds().is_err());
    }

    #[test]
    fn test_missing_bounds_are_open() {
        assert_eq!(ReportQuery::default().bounds().unwrap(), (None, None));
    }
}
