use axum::{extract::Query, http::StatusCode, Json};
use chrono::NaiveDate;
use contracts::domain::a001_imported_shipment::StoredImportRecord;
use serde::Deserialize;

use super::u501_import_shipments::executor;

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: String,
}

fn parse_date(value: &str) -> Result<NaiveDate, StatusCode> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| StatusCode::BAD_REQUEST)
}

/// GET /api/a001/imported-shipments?date=YYYY-MM-DD
pub async fn list_by_date(
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<StoredImportRecord>>, StatusCode> {
    let date = parse_date(&query.date)?;
    match executor()?.list_by_date(date).await {
        Ok(records) => Ok(Json(records)),
        Err(e) => {
            tracing::error!("{:#}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
