use greentic_comments::config::{AppConfig, EnvSiteConfig, WidgetConfiguration};
use greentic_comments::server::{self, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = AppConfig::from_env()?;
    let site = EnvSiteConfig;
    match WidgetConfiguration::resolve(&site) {
        Ok(widget) => tracing::info!(account = %widget.account, locale = ?widget.locale, "comment widget configured"),
        Err(err) => tracing::warn!(%err, "pages will render without comments"),
    }

    let addr: SocketAddr = config.bind_addr;
    tracing::info!(%addr, page_root = %config.page_root.display(), "starting greentic-comments server");
    let state = AppState::new(config, Arc::new(site));
    server::run(addr, state).await?;
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
