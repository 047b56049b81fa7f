pub mod domain;
pub mod handlers;
pub mod routes;
pub mod shared;
pub mod system;
pub mod usecases;

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::u501_import_shipments::ImportShipments;

use crate::domain::a001_imported_shipment::SeaOrmShipmentStore;
use crate::usecases::u501_import_shipments::ImportExecutor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    system::tracing::initialize()?;

    let config = shared::config::load_config()?;
    let db_path = shared::config::get_database_path(&config);

    shared::data::db::initialize_database(&db_path)
        .await
        .map_err(|e| anyhow::anyhow!("db init failed: {e}"))?;

    let store = SeaOrmShipmentStore::new(shared::data::db::get_connection().clone());
    let executor = ImportExecutor::new(Arc::new(store), &config.import);
    handlers::u501_import_shipments::install_executor(Arc::new(executor))?;
    tracing::info!(
        "{} ready (delimiter: {:?}, duplicate policy: {:?})",
        ImportShipments::full_name(),
        config.import.delimiter,
        config.import.duplicate_policy
    );

    let app = routes::configure_routes();

    let port = config.server.port;
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Please ensure no other process is using this port.",
                    port
                );
            } else {
                tracing::error!("Failed to bind to port {}. Error: {}", port, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
