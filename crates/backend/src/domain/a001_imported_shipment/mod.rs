pub mod repository;

pub use repository::SeaOrmShipmentStore;
