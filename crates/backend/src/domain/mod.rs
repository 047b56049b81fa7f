pub mod a001_imported_shipment;
