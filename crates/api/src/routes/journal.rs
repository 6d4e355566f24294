//! Journal report download.

use axum::{
    Router,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;

use crate::{AppState, error::ApiError, middleware::AuthCaller};
use claimflow_core::workflow::Role;

/// Creates the journal routes, mounted below `/creditors`.
pub fn routes() -> Router<AppState> {
    Router::new().route("/expenses/journal", get(journal_report))
}

/// Query parameters for the journal report.
#[derive(Debug, Deserialize)]
pub struct JournalQuery {
    /// First day, inclusive.
    pub from: NaiveDate,
    /// Last day, inclusive.
    pub to: NaiveDate,
}

impl JournalQuery {
    /// UTC bounds covering both days completely.
    fn bounds(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), ApiError> {
        if self.from > self.to {
            return Err(ApiError::bad_request("'from' must not be after 'to'"));
        }
        let start = self.from.and_time(NaiveTime::MIN).and_utc();
        let end = self
            .to
            .and_hms_nano_opt(23, 59, 59, 999_999_999)
            .ok_or_else(|| ApiError::bad_request("Invalid 'to' date"))?
            .and_utc();
        Ok((start, end))
    }

    fn filename(&self) -> String {
        format!("journal_{}_{}.csv", self.from, self.to)
    }
}

/// GET /expenses/journal?from&to - Changes in the period as CSV.
async fn journal_report(
    State(state): State<AppState>,
    caller: AuthCaller,
    Query(query): Query<JournalQuery>,
) -> Result<Response, ApiError> {
    caller.require(Role::Creditor)?;
    let (from, to) = query.bounds()?;
    let csv = state.expenses.journal_csv(from, to).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", query.filename()),
            ),
        ],
        csv,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn query(from: &str, to: &str) -> JournalQuery {
        JournalQuery {
            from: from.parse().unwrap(),
            to: to.parse().unwrap(),
        }
    }

    #[test]
    fn test_bounds_cover_whole_days() {
        let (from, to) = query("2024-04-01", "2024-04-30").bounds().unwrap();
        assert_eq!(from, Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap());
        assert!(to > Utc.with_ymd_and_hms(2024, 4, 30, 23, 59, 59).unwrap());
        assert!(to < Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_reversed_bounds_rejected() {
        assert!(query("2024-05-01", "2024-04-01").bounds().is_err());
    }

    #[test]
    fn test_filename() {
        assert_eq!(
            query("2024-04-01", "2024-04-30").filename(),
            "journal_2024-04-01_2024-04-30.csv"
        );
    }
}
