use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::AggregateId;

// ============================================================================
// ID Type
// ============================================================================

/// Идентификатор записи импорта, назначается хранилищем при вставке
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportRecordId(pub Uuid);

impl ImportRecordId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for ImportRecordId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(ImportRecordId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

impl std::fmt::Display for ImportRecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// Record
// ============================================================================

/// Одна строка импорта перевозок (транспорт SAP) за дату
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRecord {
    /// Номер транспорта SAP, бизнес-ключ в пределах даты
    pub transport_reference: String,
    pub route: String,
    /// Вес, кг
    pub weight: f64,
    pub box_count: u64,
    pub date: NaiveDate,
}

impl ImportRecord {
    pub fn new(
        transport_reference: impl Into<String>,
        route: impl Into<String>,
        weight: f64,
        box_count: u64,
        date: NaiveDate,
    ) -> Self {
        Self {
            transport_reference: transport_reference.into(),
            route: route.into(),
            weight,
            box_count,
            date,
        }
    }

    /// Копия записи, привязанная к другой дате
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    pub fn business_key(&self) -> BusinessKey {
        BusinessKey {
            date: self.date,
            transport_reference: self.transport_reference.trim().to_string(),
        }
    }

    pub fn content_key(&self) -> ContentKey {
        ContentKey {
            date: self.date,
            route: normalize_route(&self.route),
            weight_hundredths: (self.weight * 100.0).round() as i64,
            box_count: self.box_count,
        }
    }
}

/// Запись, уже сохраненная в хранилище
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredImportRecord {
    pub id: ImportRecordId,
    #[serde(flatten)]
    pub record: ImportRecord,
}

// ============================================================================
// Keys
// ============================================================================

/// Дата + номер транспорта
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BusinessKey {
    pub date: NaiveDate,
    pub transport_reference: String,
}

/// Дата + маршрут + вес + количество коробок.
/// Вес сравнивается с точностью до сотых.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentKey {
    pub date: NaiveDate,
    pub route: String,
    pub weight_hundredths: i64,
    pub box_count: u64,
}

fn normalize_route(route: &str) -> String {
    route
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[test]
    fn test_business_key_ignores_other_fields() {
        let a = ImportRecord::new("52736285", "RAH8604-SC / BOA MESA", 4965.3, 1295, date());
        let b = ImportRecord::new(" 52736285 ", "OTHER", 1.0, 1, date());
        assert_eq!(a.business_key(), b.business_key());
        assert_ne!(a.content_key(), b.content_key());
    }

    #[test]
    fn test_content_key_normalizes_route() {
        let a = ImportRecord::new("1", "RAH8604-SC /  BOA MESA", 4965.30, 1295, date());
        let b = ImportRecord::new("2", "rah8604-sc / boa mesa", 4965.301, 1295, date());
        assert_eq!(a.content_key(), b.content_key());
    }

    #[test]
    fn test_serde_uses_camel_case() {
        let record = ImportRecord::new("52736285", "ROUTE", 10.5, 3, date());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["transportReference"], "52736285");
        assert_eq!(json["boxCount"], 3);
        assert_eq!(json["date"], "2025-03-14");
    }

    #[test]
    fn test_id_roundtrip_from_string() {
        let id = ImportRecordId::new_v4();
        assert_eq!(ImportRecordId::from_string(&id.as_string()), Ok(id));
        assert!(ImportRecordId::from_string("not-a-uuid").is_err());
    }
}
