use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::a001_imported_shipment::ImportRecord;

/// Запрос на импорт вставленного текста за дату
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportTextRequest {
    pub date: NaiveDate,
    pub text: String,
}

/// Запрос на импорт уже структурированных строк (без разбора текста)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRecordsRequest {
    pub date: NaiveDate,
    pub records: Vec<ImportRow>,
}

/// Строка импорта без даты: дата берется из запроса
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRow {
    pub transport_reference: String,
    #[serde(default)]
    pub route: String,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub box_count: u64,
}

impl ImportRow {
    pub fn into_record(self, date: NaiveDate) -> ImportRecord {
        ImportRecord {
            transport_reference: self.transport_reference,
            route: self.route,
            weight: self.weight.max(0.0),
            box_count: self.box_count,
            date,
        }
    }
}

impl ImportRecordsRequest {
    pub fn into_records(self) -> Vec<ImportRecord> {
        let date = self.date;
        self.records
            .into_iter()
            .map(|row| row.into_record(date))
            .collect()
    }
}
