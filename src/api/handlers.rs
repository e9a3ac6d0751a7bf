//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use chrono::NaiveDateTime;

use super::AppState;
use super::types::{ErrorResponse, RowsQuery, SummaryResponse};
use crate::io::import::parse_datetime;
use crate::sim::types::OutputRow;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(error: String) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error }))
}

fn parse_bound(name: &str, raw: Option<&str>) -> Result<Option<NaiveDateTime>, ApiError> {
    raw.map(|s| {
        parse_datetime(s).ok_or_else(|| bad_request(format!("invalid `{name}` timestamp \"{s}\"")))
    })
    .transpose()
}

/// `GET /summary` → 200 + `SummaryResponse` JSON
pub async fn get_summary(State(state): State<Arc<AppState>>) -> Json<SummaryResponse> {
    Json(SummaryResponse::new(
        &state.scenario,
        &state.summary,
        state.rows.last(),
    ))
}

/// Returns rows, optionally filtered by an inclusive timestamp range.
///
/// `GET /rows` → 200 + `Vec<OutputRow>` JSON
/// `GET /rows?from=2025-01-01T06:00&to=2025-01-01T09:00` → filtered range
/// `GET /rows?from=<later>&to=<earlier>` → 400 + `ErrorResponse`
pub async fn get_rows(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RowsQuery>,
) -> Result<Json<Vec<OutputRow>>, ApiError> {
    let from = parse_bound("from", query.from.as_deref())?;
    let to = parse_bound("to", query.to.as_deref())?;

    if let (Some(from), Some(to)) = (from, to)
        && from > to
    {
        return Err(bad_request(format!("`from` ({from}) must be <= `to` ({to})")));
    }

    let rows: Vec<OutputRow> = state
        .rows
        .iter()
        .filter(|r| from.is_none_or(|f| r.timestamp >= f) && to.is_none_or(|t| r.timestamp <= t))
        .cloned()
        .collect();

    Ok(Json(rows))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{Duration, NaiveDate};
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::sim::summary::SimulationSummary;

    fn make_test_state() -> Arc<AppState> {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let rows: Vec<OutputRow> = (0..24)
            .map(|h| OutputRow {
                timestamp: start + Duration::hours(h),
                consumption: 400.0,
                reversed: 0.0,
                previous_soc: 500.0,
                battery_soc: 500.0,
                charge: 0.0,
                discharge: 0.0,
                bought: 400.0,
                sold: 0.0,
                cost_without_battery: 0.12,
                revenue_without_battery: 0.0,
                cost_with_battery: 0.12,
                revenue_with_battery: 0.0,
                cycles: 0.0,
                max_charge: 950.0,
                min_charge: 50.0,
                capacity: 1000.0,
            })
            .collect();
        let summary = SimulationSummary::from_rows(&rows);
        Arc::new(AppState {
            scenario: "default".to_string(),
            summary,
            rows,
        })
    }

    async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
        let app = router(make_test_state());
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn summary_returns_200() {
        let (status, json) = get("/summary").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["scenario"], "default");
        assert_eq!(json["summary"]["intervals"], 24);
        assert_eq!(json["latest_row"]["timestamp"], "2025-01-01T23:00:00");
        assert!(json.get("savings").is_some());
    }

    #[tokio::test]
    async fn rows_returns_all() {
        let (status, json) = get("/rows").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().map(Vec::len), Some(24));
    }

    #[tokio::test]
    async fn rows_range_query_is_inclusive() {
        let (status, json) = get("/rows?from=2025-01-01T05:00:00&to=2025-01-01T10:00").await;
        assert_eq!(status, StatusCode::OK);
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0]["timestamp"], "2025-01-01T05:00:00");
        assert_eq!(rows[5]["timestamp"], "2025-01-01T10:00:00");
    }

    #[tokio::test]
    async fn rows_open_ended_range() {
        let (_, json) = get("/rows?from=2025-01-01T20:00").await;
        assert_eq!(json.as_array().map(Vec::len), Some(4));
    }

    #[tokio::test]
    async fn rows_inverted_range_returns_400() {
        let (status, json) = get("/rows?from=2025-01-01T10:00&to=2025-01-01T05:00").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json.get("error").is_some());
    }

    #[tokio::test]
    async fn rows_bad_timestamp_returns_400() {
        let (status, _) = get("/rows?from=noon").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
