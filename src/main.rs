use std::net::SocketAddr;

use client_info::{server, SystemResolver};
use thiserror::Error;

#[derive(Debug, Error)]
enum ServerError {
    #[error("failed to load the system resolver configuration: {0}")]
    Resolver(#[from] hickory_resolver::error::ResolveError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    if let Err(err) = run().await {
        tracing::error!("fatal: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    let resolver = SystemResolver::from_system_conf()?;
    let app = server::app(resolver);

    // use 0.0.0.0 to use it in container
    let addr = SocketAddr::from(([0, 0, 0, 0], 5000));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("client-info listening on {addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
