pub mod a001_imported_shipment;
pub mod u501_import_shipments;
