use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use resorter_admin::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    // Startup banner at info level so something always prints at default verbosity
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    let cfg = Config::from_env();
    info!(
        target: "resorter",
        "resorter-admin starting: RUST_LOG='{}', http_port={}, auth_base='{}'",
        rust_log, cfg.http_port, cfg.auth_base_url
    );

    resorter_admin::server::run_with_config(cfg).await
}
