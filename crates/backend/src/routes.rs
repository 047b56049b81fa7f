use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::{handlers, system};

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(|| async { "ok" }))
        // UseCase u501: Import shipments
        .route(
            "/api/u501/import-shipments/preview",
            post(handlers::u501_import_shipments::preview),
        )
        .route(
            "/api/u501/import-shipments/text",
            post(handlers::u501_import_shipments::import_text),
        )
        .route(
            "/api/u501/import-shipments/records",
            post(handlers::u501_import_shipments::import_records),
        )
        // A001 Imported shipments
        .route(
            "/api/a001/imported-shipments",
            get(handlers::a001_imported_shipment::list_by_date),
        )
        .layer(middleware::from_fn(
            system::middleware::request_logger::request_logger,
        ))
        .layer(cors)
}
