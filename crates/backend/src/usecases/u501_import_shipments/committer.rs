use chrono::NaiveDate;
use contracts::domain::a001_imported_shipment::{ImportRecord, StoredImportRecord};

use super::store::{ShipmentStore, StoreError};

/// Заменяет данные даты целиком: удалить все записи за дату, вставить новые,
/// перечитать итог.
///
/// Шаги не атомарны. Первая же ошибка хранилища прерывает оставшиеся шаги,
/// уже выполненные удаления не откатываются.
pub async fn replace_by_date<S>(
    store: &S,
    date: NaiveDate,
    records: &[ImportRecord],
) -> Result<Vec<StoredImportRecord>, StoreError>
where
    S: ShipmentStore + ?Sized,
{
    let existing = store.list_by_date(date).await?;
    tracing::info!(
        "Replacing {} record(s) for {} with {} new record(s)",
        existing.len(),
        date,
        records.len()
    );

    for stored in &existing {
        store.delete_by_id(stored.id).await?;
        tracing::debug!("Deleted {} ({})", stored.id, stored.record.transport_reference);
    }

    for record in records {
        let record = record.clone().with_date(date);
        let id = store.insert(&record).await?;
        tracing::debug!("Inserted {} ({})", id, record.transport_reference);
    }

    store.list_by_date(date).await
}

#[cfg(test)]
mod tests {
    use super::super::store::memory::InMemoryShipmentStore;
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn rec(reference: &str, date: NaiveDate) -> ImportRecord {
        ImportRecord::new(reference, format!("route {reference}"), 10.0, 1, date)
    }

    fn refs(records: &[ImportRecord]) -> Vec<String> {
        let mut refs: Vec<String> = records
            .iter()
            .map(|r| r.transport_reference.clone())
            .collect();
        refs.sort();
        refs
    }

    #[tokio::test]
    async fn test_replace_removes_previous_records() {
        let store = InMemoryShipmentStore::with_records(vec![
            rec("1", d(14)),
            rec("2", d(14)),
            rec("3", d(14)),
            rec("9", d(15)),
        ]);

        let result = replace_by_date(&store, d(14), &[rec("4", d(14)), rec("5", d(14))])
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(refs(&store.rows_for(d(14))), vec!["4", "5"]);
        // другие даты не трогаем
        assert_eq!(refs(&store.rows_for(d(15))), vec!["9"]);
    }

    #[tokio::test]
    async fn test_records_are_stamped_with_target_date() {
        let store = InMemoryShipmentStore::default();
        replace_by_date(&store, d(14), &[rec("1", d(1))]).await.unwrap();
        assert_eq!(store.rows_for(d(14)).len(), 1);
        assert!(store.rows_for(d(1)).is_empty());
    }

    #[tokio::test]
    async fn test_empty_set_clears_date() {
        let store = InMemoryShipmentStore::with_records(vec![rec("1", d(14))]);
        let result = replace_by_date(&store, d(14), &[]).await.unwrap();
        assert!(result.is_empty());
        assert!(store.rows().is_empty());
    }

    #[tokio::test]
    async fn test_list_failure_aborts_before_any_change() {
        let store = InMemoryShipmentStore::with_records(vec![rec("1", d(14))]);
        store.fail_list();
        let err = replace_by_date(&store, d(14), &[rec("2", d(14))]).await;
        assert!(matches!(err, Err(StoreError::Database(_))));
        assert_eq!(store.rows().len(), 1);
        assert_eq!(store.insert_calls(), 0);
    }

    #[tokio::test]
    async fn test_delete_failure_skips_inserts() {
        let store = InMemoryShipmentStore::with_records(vec![
            rec("1", d(14)),
            rec("2", d(14)),
            rec("3", d(14)),
        ]);
        store.fail_delete_after(1);
        let err = replace_by_date(&store, d(14), &[rec("4", d(14))]).await;
        assert!(err.is_err());
        // одно удаление прошло, вставок не было
        assert_eq!(store.rows_for(d(14)).len(), 2);
        assert_eq!(store.insert_calls(), 0);
    }

    #[tokio::test]
    async fn test_insert_failure_stops_remaining_inserts() {
        let store = InMemoryShipmentStore::with_records(vec![rec("1", d(14))]);
        store.fail_insert_after(1);
        let err = replace_by_date(
            &store,
            d(14),
            &[rec("4", d(14)), rec("5", d(14)), rec("6", d(14))],
        )
        .await;
        assert!(err.is_err());
        assert_eq!(refs(&store.rows_for(d(14))), vec!["4"]);
    }
}
