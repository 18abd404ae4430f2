//! Server lifecycle: bind, serve, shut down on Ctrl-C.

use tokio::net::TcpListener;

use crate::router::build_router;
use crate::types::ApiContext;

/// Bind `addr` and serve the API until Ctrl-C.
pub async fn serve(ctx: ApiContext, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(%local_addr, "Vitalis API listening");

    axum::serve(listener, build_router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Vitalis API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
