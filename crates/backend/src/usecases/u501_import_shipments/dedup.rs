use contracts::domain::a001_imported_shipment::{
    BusinessKey, ContentKey, ImportRecord, ImportRecordId, StoredImportRecord,
};
use serde::Deserialize;
use std::collections::HashMap;

/// Какие признаки считаются дублем
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Дата + номер транспорта
    #[default]
    BusinessKey,
    /// Дата + номер транспорта, либо дата + маршрут + вес + коробки.
    /// Достаточно совпадения любого из двух ключей.
    BusinessKeyOrContent,
}

/// С чем совпала отклоненная запись
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedRecord {
    /// Запись, уже сохраненная за дату
    Existing(ImportRecordId),
    /// Более ранняя строка того же импорта
    Batch,
}

#[derive(Debug, Clone)]
pub struct Duplicate {
    pub record: ImportRecord,
    pub matched: MatchedRecord,
}

#[derive(Debug, Clone, Default)]
pub struct DedupOutcome {
    pub accepted: Vec<ImportRecord>,
    pub duplicates: Vec<Duplicate>,
}

impl DedupOutcome {
    pub fn duplicate_count(&self) -> usize {
        self.duplicates.len()
    }

    /// ID сохраненных записей, которые повторно пришли в импорте
    pub fn matched_existing(&self) -> impl Iterator<Item = ImportRecordId> + '_ {
        self.duplicates.iter().filter_map(|d| match d.matched {
            MatchedRecord::Existing(id) => Some(id),
            MatchedRecord::Batch => None,
        })
    }
}

/// Отбрасывает записи, которые уже есть за дату, и повторы внутри самого импорта.
///
/// Порядок входа сохраняется; из повторов внутри импорта остается первый.
pub fn deduplicate(
    candidates: Vec<ImportRecord>,
    existing: &[StoredImportRecord],
    policy: DuplicatePolicy,
) -> DedupOutcome {
    let mut by_key: HashMap<BusinessKey, MatchedRecord> = HashMap::new();
    let mut by_content: HashMap<ContentKey, MatchedRecord> = HashMap::new();

    for stored in existing {
        let matched = MatchedRecord::Existing(stored.id);
        by_key.entry(stored.record.business_key()).or_insert(matched);
        if policy == DuplicatePolicy::BusinessKeyOrContent {
            by_content
                .entry(stored.record.content_key())
                .or_insert(matched);
        }
    }

    let mut outcome = DedupOutcome::default();

    for record in candidates {
        let key = record.business_key();
        let content = match policy {
            DuplicatePolicy::BusinessKey => None,
            DuplicatePolicy::BusinessKeyOrContent => Some(record.content_key()),
        };

        let hit = by_key.get(&key).copied().or_else(|| {
            content
                .as_ref()
                .and_then(|c| by_content.get(c).copied())
        });

        match hit {
            Some(matched) => outcome.duplicates.push(Duplicate { record, matched }),
            None => {
                by_key.insert(key, MatchedRecord::Batch);
                if let Some(content) = content {
                    by_content.insert(content, MatchedRecord::Batch);
                }
                outcome.accepted.push(record);
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn rec(reference: &str, route: &str, weight: f64, boxes: u64, date: NaiveDate) -> ImportRecord {
        ImportRecord::new(reference, route, weight, boxes, date)
    }

    fn stored(record: ImportRecord) -> StoredImportRecord {
        StoredImportRecord {
            id: ImportRecordId::new_v4(),
            record,
        }
    }

    #[test]
    fn test_empty_input() {
        let outcome = deduplicate(Vec::new(), &[], DuplicatePolicy::BusinessKey);
        assert!(outcome.accepted.is_empty());
        assert_eq!(outcome.duplicate_count(), 0);
    }

    #[test]
    fn test_rejects_existing_business_key() {
        let existing = vec![stored(rec("100", "A", 1.0, 1, d(14)))];
        let candidates = vec![
            rec("100", "DIFFERENT", 99.0, 9, d(14)),
            rec("200", "B", 2.0, 2, d(14)),
        ];
        let outcome = deduplicate(candidates, &existing, DuplicatePolicy::BusinessKey);
        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.accepted[0].transport_reference, "200");
        assert_eq!(outcome.duplicate_count(), 1);
        assert_eq!(
            outcome.duplicates[0].matched,
            MatchedRecord::Existing(existing[0].id)
        );
    }

    #[test]
    fn test_same_reference_other_date_is_not_duplicate() {
        let existing = vec![stored(rec("100", "A", 1.0, 1, d(13)))];
        let outcome = deduplicate(
            vec![rec("100", "A", 1.0, 1, d(14))],
            &existing,
            DuplicatePolicy::BusinessKey,
        );
        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.duplicate_count(), 0);
    }

    #[test]
    fn test_batch_self_dedup_first_wins() {
        for second in [
            rec("100", "A", 1.0, 1, d(14)),
            rec("100", "OTHER", 5.0, 7, d(14)),
        ] {
            let candidates = vec![rec("100", "A", 1.0, 1, d(14)), second];
            let outcome = deduplicate(candidates, &[], DuplicatePolicy::BusinessKey);
            assert_eq!(outcome.accepted.len(), 1);
            assert_eq!(outcome.accepted[0].route, "A");
            assert_eq!(outcome.duplicate_count(), 1);
            assert_eq!(outcome.duplicates[0].matched, MatchedRecord::Batch);
        }
    }

    #[test]
    fn test_business_key_policy_ignores_content_match() {
        let existing = vec![stored(rec("100", "A", 1.0, 1, d(14)))];
        let outcome = deduplicate(
            vec![rec("101", "A", 1.0, 1, d(14))],
            &existing,
            DuplicatePolicy::BusinessKey,
        );
        assert_eq!(outcome.accepted.len(), 1);
    }

    #[test]
    fn test_content_signal_is_independent() {
        let existing = vec![stored(rec("100", "Route A", 1.0, 1, d(14)))];
        let candidates = vec![
            // другой номер, тот же груз
            rec("101", "route  a", 1.0, 1, d(14)),
            // тот же номер, другой груз
            rec("100", "B", 2.0, 2, d(14)),
            rec("102", "C", 3.0, 3, d(14)),
            // повтор содержимого внутри импорта
            rec("103", "C", 3.0, 3, d(14)),
        ];
        let outcome = deduplicate(candidates, &existing, DuplicatePolicy::BusinessKeyOrContent);
        let accepted: Vec<_> = outcome
            .accepted
            .iter()
            .map(|r| r.transport_reference.as_str())
            .collect();
        assert_eq!(accepted, vec!["102"]);
        assert_eq!(outcome.duplicate_count(), 3);
        assert_eq!(outcome.matched_existing().count(), 2);
    }
}
