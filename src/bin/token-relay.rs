use std::sync::Arc;
use std::time::Duration;

use clap::arg;
use clap::command;
use clap::Parser;
use token_relay::observability::metrics::get_metrics;
use token_relay::observability::observer::TracingObserver;
use token_relay::server;
use token_relay::transport::http_client::ReqwestTransport;
use token_relay::utils::config_loader;
use token_relay::utils::constants::DEFAULT_CONNECT_TIMEOUT_MS;
use token_relay::utils::logging;
use anyhow::Result;
use token_relay::utils::logging::LogLevel;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "token-relay.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL" , value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Read args, load YAML config
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level.to_owned()).await?;

    // -------------------------------
    // 2. Create request client
    // -------------------------------

    let transport = ReqwestTransport::with_connect_timeout(Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS))?;

    // -------------------------------
    // 3. Wire fetcher, token cache and forwarder
    // -------------------------------

    let observer = Arc::new(TracingObserver::new(get_metrics().await.clone()));
    let forwarder = server::server::build_forwarder(&service_config, transport, observer);

    // -------------------------------
    // 4. Start http server
    // -------------------------------

    info!("Service starting...");
    server::server::start(&service_config.settings, Arc::new(forwarder)).await?;

    Ok(())
}
