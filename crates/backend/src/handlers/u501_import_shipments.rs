use axum::{extract::rejection::JsonRejection, http::StatusCode, Json};
use contracts::usecases::u501_import_shipments::{
    ImportRecordsRequest, ImportResponse, ImportTextRequest, ParsePreview,
};
use once_cell::sync::OnceCell;
use std::sync::Arc;

use crate::usecases::u501_import_shipments::ImportExecutor;

static IMPORT_EXECUTOR: OnceCell<Arc<ImportExecutor>> = OnceCell::new();

/// Регистрирует executor при старте сервера
pub fn install_executor(executor: Arc<ImportExecutor>) -> anyhow::Result<()> {
    IMPORT_EXECUTOR
        .set(executor)
        .map_err(|_| anyhow::anyhow!("Import executor is already installed"))
}

pub(crate) fn executor() -> Result<&'static Arc<ImportExecutor>, StatusCode> {
    IMPORT_EXECUTOR.get().ok_or_else(|| {
        tracing::error!("Import executor is not installed");
        StatusCode::SERVICE_UNAVAILABLE
    })
}

/// Неверная дата или структура тела - 400
fn request_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, StatusCode> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        tracing::warn!("Rejected request body: {}", rejection.body_text());
        StatusCode::BAD_REQUEST
    })
}

/// POST /api/u501/import-shipments/preview
pub async fn preview(
    payload: Result<Json<ImportTextRequest>, JsonRejection>,
) -> Result<Json<ParsePreview>, StatusCode> {
    let request = request_body(payload)?;
    Ok(Json(executor()?.preview_text(&request)))
}

/// POST /api/u501/import-shipments/text
pub async fn import_text(
    payload: Result<Json<ImportTextRequest>, JsonRejection>,
) -> Result<Json<ImportResponse>, StatusCode> {
    let request = request_body(payload)?;
    let date = request.date;
    match executor()?.import_text(request).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            tracing::error!("Shipment import for {} failed: {:#}", date, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/u501/import-shipments/records
pub async fn import_records(
    payload: Result<Json<ImportRecordsRequest>, JsonRejection>,
) -> Result<Json<ImportResponse>, StatusCode> {
    let request = request_body(payload)?;
    let date = request.date;
    match executor()?.import_records(request).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            tracing::error!("Structured shipment import for {} failed: {:#}", date, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
