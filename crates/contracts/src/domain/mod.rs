pub mod a001_imported_shipment;
pub mod common;
