use chrono::NaiveDate;
use contracts::domain::a001_imported_shipment::StoredImportRecord;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::store::{ShipmentStore, StoreError};

/// Кэш записей импорта по датам (in-memory, read-through).
///
/// Заполняется только тем, что вернуло хранилище; после записи
/// обновляется повторным чтением, а не правкой на месте.
#[derive(Clone, Default)]
pub struct ImportCache {
    dates: Arc<RwLock<HashMap<NaiveDate, Vec<StoredImportRecord>>>>,
}

impl ImportCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, date: NaiveDate) -> Option<Vec<StoredImportRecord>> {
        let dates = self.dates.read().unwrap_or_else(PoisonError::into_inner);
        dates.get(&date).cloned()
    }

    /// Заменить содержимое даты результатом чтения из хранилища
    pub fn refresh(&self, date: NaiveDate, records: Vec<StoredImportRecord>) {
        let mut dates = self.dates.write().unwrap_or_else(PoisonError::into_inner);
        dates.insert(date, records);
    }

    pub fn invalidate(&self, date: NaiveDate) {
        let mut dates = self.dates.write().unwrap_or_else(PoisonError::into_inner);
        dates.remove(&date);
    }

    pub async fn get_or_load<S>(
        &self,
        store: &S,
        date: NaiveDate,
    ) -> Result<Vec<StoredImportRecord>, StoreError>
    where
        S: ShipmentStore + ?Sized,
    {
        if let Some(records) = self.get(date) {
            return Ok(records);
        }
        let records = store.list_by_date(date).await?;
        self.refresh(date, records.clone());
        Ok(records)
    }
}
