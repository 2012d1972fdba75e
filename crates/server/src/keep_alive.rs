use axum::{routing::get, Router};
use tracing::{error, info, warn};

/// Minimal liveness responder for uptime monitors and host probes.
pub fn router() -> Router {
    Router::new().route("/", get(ok))
}

async fn ok() -> &'static str {
    "OK"
}

/// Start the keep-alive endpoint in the background.
///
/// The endpoint is a convenience, not a dependency: failing to bind the
/// port is logged and the bot keeps running without it.
pub async fn spawn(bind_address: &str, port: u16) {
    let address = format!("{bind_address}:{port}");

    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(error) => {
            warn!(
                event_name = "system.keep_alive.bind_failed",
                bind_address = %address,
                error = %error,
                "keep-alive endpoint failed to start; continuing without it"
            );
            return;
        }
    };

    info!(
        event_name = "system.keep_alive.start",
        bind_address = %address,
        "keep-alive endpoint started"
    );

    tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, router()).await {
            error!(
                event_name = "system.keep_alive.error",
                error = %error,
                "keep-alive endpoint terminated unexpectedly"
            );
        }
    });
}
