use anyhow::{Context, Result};
use chrono::NaiveDate;
use contracts::domain::a001_imported_shipment::{ImportRecord, ImportRecordId, StoredImportRecord};
use contracts::usecases::u501_import_shipments::{
    ImportRecordsRequest, ImportResponse, ImportSummary, ImportTextRequest, ParsePreview,
    SkippedLine,
};
use std::collections::HashSet;
use std::sync::Arc;

use super::cache::ImportCache;
use super::committer::replace_by_date;
use super::dedup::{deduplicate, DuplicatePolicy};
use super::parser::TextParser;
use super::store::ShipmentStore;
use crate::shared::config::ImportConfig;
use crate::shared::format::format_weight;

/// Executor для UseCase импорта перевозок за дату
#[derive(Clone)]
pub struct ImportExecutor {
    store: Arc<dyn ShipmentStore>,
    cache: ImportCache,
    parser: TextParser,
    policy: DuplicatePolicy,
}

impl ImportExecutor {
    pub fn new(store: Arc<dyn ShipmentStore>, config: &ImportConfig) -> Self {
        Self {
            store,
            cache: ImportCache::new(),
            parser: TextParser::new(config.delimiter),
            policy: config.duplicate_policy,
        }
    }

    /// Разобрать текст без записи (предпросмотр)
    pub fn preview_text(&self, request: &ImportTextRequest) -> ParsePreview {
        let parsed = self.parser.parse(&request.text, request.date);
        ParsePreview {
            date: request.date,
            layout: parsed.layout,
            records: parsed.records,
            skipped: parsed.skipped,
        }
    }

    /// Импорт вставленного текста: разбор, отсев дублей, замена данных даты
    pub async fn import_text(&self, request: ImportTextRequest) -> Result<ImportResponse> {
        let parsed = self.parser.parse(&request.text, request.date);
        tracing::info!(
            "Parsed {} candidate(s) for {} ({:?} layout, {} line(s) skipped)",
            parsed.records.len(),
            request.date,
            parsed.layout,
            parsed.skipped.len()
        );
        self.run(request.date, parsed.records, parsed.skipped).await
    }

    /// Импорт готовых строк, минуя разбор текста
    pub async fn import_records(&self, request: ImportRecordsRequest) -> Result<ImportResponse> {
        let date = request.date;
        let candidates = request.into_records();
        tracing::info!("Received {} structured record(s) for {}", candidates.len(), date);
        self.run(date, candidates, Vec::new()).await
    }

    /// Записи за дату (через кэш)
    pub async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<StoredImportRecord>> {
        self.cache
            .get_or_load(self.store.as_ref(), date)
            .await
            .with_context(|| format!("Failed to load imported shipments for {}", date))
    }

    async fn run(
        &self,
        date: NaiveDate,
        candidates: Vec<ImportRecord>,
        skipped: Vec<SkippedLine>,
    ) -> Result<ImportResponse> {
        let existing = self
            .store
            .list_by_date(date)
            .await
            .with_context(|| format!("Failed to read existing shipments for {}", date))?;

        // Пустой импорт не должен стирать данные даты
        if candidates.is_empty() {
            tracing::warn!("Nothing to import for {}, existing data kept", date);
            self.cache.refresh(date, existing.clone());
            return Ok(build_response(date, 0, Vec::new(), skipped, existing));
        }

        let outcome = deduplicate(candidates, &existing, self.policy);
        tracing::info!(
            "Dedup for {}: {} accepted, {} duplicate(s)",
            date,
            outcome.accepted.len(),
            outcome.duplicate_count()
        );

        let matched: HashSet<ImportRecordId> = outcome.matched_existing().collect();
        let duplicates: Vec<String> = outcome
            .duplicates
            .iter()
            .map(|d| d.record.transport_reference.clone())
            .collect();
        let accepted = outcome.accepted.len();

        // Повторный импорт того же набора ничего не меняет
        if accepted == 0 && matched.len() == existing.len() {
            tracing::info!("No new shipments for {}, store left unchanged", date);
            self.cache.refresh(date, existing.clone());
            return Ok(build_response(date, 0, duplicates, skipped, existing));
        }

        let to_persist: Vec<ImportRecord> = existing
            .into_iter()
            .filter(|stored| matched.contains(&stored.id))
            .map(|stored| stored.record)
            .chain(outcome.accepted)
            .collect();

        let committed = match replace_by_date(self.store.as_ref(), date, &to_persist).await {
            Ok(records) => records,
            Err(e) => {
                // Состояние хранилища неизвестно
                self.cache.invalidate(date);
                tracing::error!("Import commit for {} failed: {}", date, e);
                return Err(anyhow::Error::new(e)
                    .context(format!("Failed to commit imported shipments for {}", date)));
            }
        };
        self.cache.refresh(date, committed.clone());

        let response = build_response(date, accepted, duplicates, skipped, committed);
        tracing::info!(
            "Import for {} committed: {} record(s), {} kg, {} box(es)",
            date,
            response.summary.record_count,
            format_weight(response.summary.total_weight),
            response.summary.total_boxes
        );
        Ok(response)
    }
}

fn build_response(
    date: NaiveDate,
    accepted: usize,
    duplicates: Vec<String>,
    skipped: Vec<SkippedLine>,
    records: Vec<StoredImportRecord>,
) -> ImportResponse {
    ImportResponse {
        date,
        accepted,
        duplicate_count: duplicates.len(),
        duplicates,
        skipped,
        summary: ImportSummary::from_records(records.iter().map(|r| &r.record)),
        records,
    }
}

#[cfg(test)]
mod tests {
    use super::super::store::memory::InMemoryShipmentStore;
    use super::*;
    use contracts::usecases::u501_import_shipments::ImportRow;

    const PASTE: &str = "Transporte SAP\tROTAS\tPESO\tCaixas\n\
        52736285\tRAH8604-SC / BOA MESA\t4.965,30\t1.295\n\
        52736286\tQJK1D23-SC / CHAPECO\t12.000\t840\n\
        52736287\tMMX9F10-PR / CASCAVEL\t850,5\t62\n";

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn executor(store: &Arc<InMemoryShipmentStore>) -> ImportExecutor {
        ImportExecutor::new(store.clone(), &ImportConfig::default())
    }

    fn text(date: NaiveDate, text: &str) -> ImportTextRequest {
        ImportTextRequest {
            date,
            text: text.to_string(),
        }
    }

    fn sorted_refs(records: &[ImportRecord]) -> Vec<String> {
        let mut refs: Vec<String> = records
            .iter()
            .map(|r| r.transport_reference.clone())
            .collect();
        refs.sort();
        refs
    }

    #[tokio::test]
    async fn test_import_text_persists_records() {
        let store = Arc::new(InMemoryShipmentStore::default());
        let response = executor(&store).import_text(text(d(14), PASTE)).await.unwrap();

        assert_eq!(response.accepted, 3);
        assert_eq!(response.duplicate_count, 0);
        assert_eq!(response.records.len(), 3);
        assert_eq!(response.summary.total_boxes, 1295 + 840 + 62);
        assert_eq!(store.rows_for(d(14)).len(), 3);
    }

    #[tokio::test]
    async fn test_reimport_is_idempotent() {
        let store = Arc::new(InMemoryShipmentStore::default());
        let executor = executor(&store);

        executor.import_text(text(d(14), PASTE)).await.unwrap();
        let first = store.rows_for(d(14));
        let second = executor.import_text(text(d(14), PASTE)).await.unwrap();

        assert_eq!(second.accepted, 0);
        assert_eq!(second.duplicate_count, 3);
        assert_eq!(store.rows_for(d(14)), first);
        // второй импорт ничего не пишет
        assert_eq!(store.insert_calls(), 3);
    }

    #[tokio::test]
    async fn test_batch_self_dedup() {
        let paste = "Transporte SAP\tROTAS\tPESO\tCaixas\n\
            52736285\tRAH8604-SC / BOA MESA\t4.965,30\t1.295\n\
            52736285\tOUTRA ROTA\t1,00\t1\n";
        let store = Arc::new(InMemoryShipmentStore::default());
        let response = executor(&store).import_text(text(d(14), paste)).await.unwrap();

        assert_eq!(response.accepted, 1);
        assert_eq!(response.duplicate_count, 1);
        assert_eq!(response.duplicates, vec!["52736285".to_string()]);
        let rows = store.rows_for(d(14));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].route, "RAH8604-SC / BOA MESA");
    }

    #[tokio::test]
    async fn test_new_batch_replaces_date() {
        let store = Arc::new(InMemoryShipmentStore::with_records(vec![
            ImportRecord::new("1", "A", 1.0, 1, d(14)),
            ImportRecord::new("2", "B", 2.0, 2, d(14)),
            ImportRecord::new("52736285", "OLD ROUTE", 9.0, 9, d(14)),
            ImportRecord::new("7", "OTHER DAY", 1.0, 1, d(15)),
        ]));
        let response = executor(&store).import_text(text(d(14), PASTE)).await.unwrap();

        assert_eq!(response.accepted, 2);
        assert_eq!(response.duplicate_count, 1);
        let rows = store.rows_for(d(14));
        assert_eq!(
            sorted_refs(&rows),
            vec!["52736285", "52736286", "52736287"]
        );
        // отклоненный дубль не перезаписывает сохраненную запись
        let kept = rows
            .iter()
            .find(|r| r.transport_reference == "52736285")
            .unwrap();
        assert_eq!(kept.route, "OLD ROUTE");
        assert_eq!(store.rows_for(d(15)).len(), 1);
    }

    #[tokio::test]
    async fn test_empty_paste_keeps_existing_data() {
        let store = Arc::new(InMemoryShipmentStore::with_records(vec![ImportRecord::new(
            "1", "A", 1.0, 1, d(14),
        )]));
        let response = executor(&store)
            .import_text(text(d(14), "just some words\n"))
            .await
            .unwrap();

        assert_eq!(response.accepted, 0);
        assert_eq!(response.skipped.len(), 1);
        assert_eq!(response.records.len(), 1);
        assert_eq!(store.rows_for(d(14)).len(), 1);
    }

    #[tokio::test]
    async fn test_import_records_bypasses_parser() {
        let store = Arc::new(InMemoryShipmentStore::default());
        let request = ImportRecordsRequest {
            date: d(14),
            records: vec![
                ImportRow {
                    transport_reference: "100".into(),
                    route: "A".into(),
                    weight: 1.5,
                    box_count: 3,
                },
                ImportRow {
                    transport_reference: "100".into(),
                    route: "A".into(),
                    weight: 1.5,
                    box_count: 3,
                },
            ],
        };
        let response = executor(&store).import_records(request).await.unwrap();
        assert_eq!(response.accepted, 1);
        assert_eq!(response.duplicate_count, 1);
        assert_eq!(store.rows_for(d(14)).len(), 1);
    }

    #[tokio::test]
    async fn test_storage_fault_is_propagated() {
        let store = Arc::new(InMemoryShipmentStore::with_records(vec![ImportRecord::new(
            "1", "A", 1.0, 1, d(14),
        )]));
        let executor = executor(&store);
        // наполнить кэш
        executor.list_by_date(d(14)).await.unwrap();

        store.fail_insert_after(0);
        let result = executor.import_text(text(d(14), PASTE)).await;
        assert!(result.is_err());
        // удаление прошло, вставка нет: принятая несогласованность
        assert!(store.rows_for(d(14)).is_empty());
        // кэш сброшен и перечитывается из хранилища
        assert!(executor.list_by_date(d(14)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_by_date_refreshed_after_commit() {
        let store = Arc::new(InMemoryShipmentStore::default());
        let executor = executor(&store);
        assert!(executor.list_by_date(d(14)).await.unwrap().is_empty());

        executor.import_text(text(d(14), PASTE)).await.unwrap();
        assert_eq!(executor.list_by_date(d(14)).await.unwrap().len(), 3);
    }

    #[test]
    fn test_preview_does_not_touch_store() {
        let store = Arc::new(InMemoryShipmentStore::default());
        let preview = executor(&store).preview_text(&text(d(14), PASTE));
        assert_eq!(preview.records.len(), 3);
        assert!(store.rows().is_empty());
    }
}
