use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    // Startup banner at info level so something always prints at default verbosity
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    let config = otogift_auth::config::Config::from_env();
    info!(
        target: "otogift",
        "otogift-auth starting: RUST_LOG='{}', http_port={}, session_ttl_secs={}, federated={}",
        rust_log,
        config.http_port,
        config.session_ttl.as_secs(),
        if config.federated.is_some() { "enabled" } else { "disabled" }
    );

    otogift_auth::server::run_with_config(config).await
}
