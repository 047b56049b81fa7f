use async_trait::async_trait;
use chrono::NaiveDate;
use contracts::domain::a001_imported_shipment::{ImportRecord, ImportRecordId, StoredImportRecord};
use thiserror::Error;

/// Ошибки хранилища импортированных перевозок
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Record not found: {0}")]
    NotFound(ImportRecordId),

    #[error("Corrupted record {id}: {reason}")]
    Corrupted { id: String, reason: String },
}

/// Хранилище записей импорта, сгруппированных по дате.
/// Ошибки не повторяются внутри, а сразу возвращаются вызывающему.
#[async_trait]
pub trait ShipmentStore: Send + Sync {
    async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<StoredImportRecord>, StoreError>;

    async fn delete_by_id(&self, id: ImportRecordId) -> Result<(), StoreError>;

    /// ID назначает хранилище
    async fn insert(&self, record: &ImportRecord) -> Result<ImportRecordId, StoreError>;
}
