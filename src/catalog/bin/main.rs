include!("../../lib.rs");
use std::net::SocketAddr;
use lambda_http::{run, Error};
use tracing::info;
use crate::utils::logging::setup_tracing;
use crate::core::controller::AppState;
use crate::core::domain::Configuration;
use crate::catalog::controller::routes;
use crate::catalog::factory::create_catalog_service;

// See https://docs.aws.amazon.com/lambda/latest/dg/rust-http-events.html
// Set BOOKSHELF_LAMBDA=true to serve API Gateway events instead of plain HTTP.

#[tokio::main]
async fn main() -> Result<(), Error> {
    setup_tracing();

    let config = Configuration::from_env();
    let catalog = create_catalog_service(&config).await?;
    let state = AppState::new(catalog.clone());

    if config.lambda {
        info!(books_file = ?config.books_file, "starting catalog as lambda function");
        run(routes::<lambda_http::Body>(state)).await?;
    } else {
        let app = routes::<axum::body::Body>(state);
        let addr: SocketAddr = config.listen_addr.parse()?;
        info!(books_file = ?config.books_file, %addr, "starting catalog server");
        axum::Server::bind(&addr)
            .serve(app.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await?;
    }

    catalog.close().await?;
    info!("catalog closed");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", err);
    }
    info!("shutdown signal received");
}
