use std::sync::Arc;

use tracing::info;

use formbot_core::config::AppConfig;
use formbot_discord::events::InteractionRouter;
use formbot_discord::gateway::{GatewayRunner, NoopGatewayTransport};
use formbot_store::FileStore;

pub struct Application {
    pub config: AppConfig,
    pub store: Arc<FileStore>,
    pub runner: GatewayRunner,
}

/// Wire the record store, router, and gateway runner from loaded config.
pub fn bootstrap(config: AppConfig) -> Application {
    let store = Arc::new(FileStore::new(&config.store.path));
    info!(
        event_name = "system.bootstrap.store_ready",
        path = %store.path().display(),
        "record store configured"
    );

    let router = InteractionRouter::new(store.clone(), config.discord.prefix.clone());
    let runner = GatewayRunner::new(Arc::new(NoopGatewayTransport), router);

    Application { config, store, runner }
}
