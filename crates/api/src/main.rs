use std::env;

use agro_api::build_app;
use agro_observability::init_tracing;
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("agro_api");

    let catalog_path =
        env::var("AGRO_CATALOG_PATH").unwrap_or_else(|_| "catalog/catalog.json".to_string());
    let bind = env::var("AGRO_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let app = build_app(&catalog_path).await?;

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(bind = %bind, catalog_path = %catalog_path, "agro concierge api started");

    axum::serve(listener, app).await?;
    Ok(())
}
