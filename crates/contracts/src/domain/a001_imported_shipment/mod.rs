pub mod aggregate;

pub use aggregate::{BusinessKey, ContentKey, ImportRecord, ImportRecordId, StoredImportRecord};
