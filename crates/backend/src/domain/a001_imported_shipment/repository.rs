use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use contracts::domain::a001_imported_shipment::{ImportRecord, ImportRecordId, StoredImportRecord};
use contracts::domain::common::AggregateId;
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::usecases::u501_import_shipments::store::{ShipmentStore, StoreError};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a001_imported_shipment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub transport_reference: String,
    pub route: String,
    pub weight: f64,
    pub box_count: i64,
    pub date: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for StoredImportRecord {
    type Error = StoreError;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let id = ImportRecordId::from_string(&m.id).map_err(|reason| StoreError::Corrupted {
            id: m.id.clone(),
            reason,
        })?;
        let date =
            NaiveDate::parse_from_str(&m.date, DATE_FORMAT).map_err(|e| StoreError::Corrupted {
                id: m.id.clone(),
                reason: format!("invalid date '{}': {}", m.date, e),
            })?;

        Ok(StoredImportRecord {
            id,
            record: ImportRecord {
                transport_reference: m.transport_reference,
                route: m.route,
                weight: m.weight.max(0.0),
                box_count: u64::try_from(m.box_count).unwrap_or(0),
                date,
            },
        })
    }
}

/// Хранилище импортированных перевозок в SQLite
#[derive(Clone)]
pub struct SeaOrmShipmentStore {
    conn: DatabaseConnection,
}

impl SeaOrmShipmentStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl ShipmentStore for SeaOrmShipmentStore {
    async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<StoredImportRecord>, StoreError> {
        Entity::find()
            .filter(Column::Date.eq(date.format(DATE_FORMAT).to_string()))
            .order_by_desc(Column::CreatedAt)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(StoredImportRecord::try_from)
            .collect()
    }

    async fn delete_by_id(&self, id: ImportRecordId) -> Result<(), StoreError> {
        let result = Entity::delete_by_id(id.as_string()).exec(&self.conn).await?;
        if result.rows_affected == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn insert(&self, record: &ImportRecord) -> Result<ImportRecordId, StoreError> {
        let id = ImportRecordId::new_v4();
        let now = Utc::now();
        let active = ActiveModel {
            id: Set(id.as_string()),
            transport_reference: Set(record.transport_reference.clone()),
            route: Set(record.route.clone()),
            weight: Set(record.weight),
            box_count: Set(i64::try_from(record.box_count).unwrap_or(i64::MAX)),
            date: Set(record.date.format(DATE_FORMAT).to_string()),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        };
        active.insert(&self.conn).await?;
        Ok(id)
    }
}
