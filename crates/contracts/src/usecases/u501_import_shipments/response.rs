use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::a001_imported_shipment::{ImportRecord, StoredImportRecord};

/// Распознанный формат вставленного текста
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextLayout {
    /// Строки с разделителем и заголовком (копия из Excel)
    Delimited,
    /// Свободный многострочный формат
    Loose,
}

/// Причина пропуска строки при разборе
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Меньше четырех колонок
    TooFewColumns { found: usize },
    /// Строка не начинается с номера транспорта
    NoTransportReference,
    /// Номер транспорта найден, маршрут нет
    MissingRoute,
}

/// Пропущенная строка (номер строки с 1)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedLine {
    pub line_no: usize,
    pub content: String,
    pub reason: SkipReason,
}

/// Результат разбора без записи в хранилище
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsePreview {
    pub date: NaiveDate,
    pub layout: TextLayout,
    pub records: Vec<ImportRecord>,
    pub skipped: Vec<SkippedLine>,
}

/// Итоги по набору записей за дату
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub record_count: usize,
    pub total_weight: f64,
    pub total_boxes: u64,
}

impl ImportSummary {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ImportRecord>) -> Self {
        records
            .into_iter()
            .fold(Self::default(), |mut acc, record| {
                acc.record_count += 1;
                acc.total_weight += record.weight;
                acc.total_boxes += record.box_count;
                acc
            })
    }
}

/// Результат импорта
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResponse {
    pub date: NaiveDate,
    /// Количество новых записей
    pub accepted: usize,
    /// Количество отклоненных дублей
    pub duplicate_count: usize,
    /// Номера транспорта отклоненных дублей, в порядке ввода
    pub duplicates: Vec<String>,
    pub skipped: Vec<SkippedLine>,
    /// Итоги по данным даты после записи
    pub summary: ImportSummary,
    /// Данные даты после записи
    pub records: Vec<StoredImportRecord>,
}
