use std::sync::Arc;

use clap::Parser;
use qbroker::{Broker, Config, RespServer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> qbroker::Result<()> {
    let config = Config::parse();

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let broker = Arc::new(Broker::new());
    let server = RespServer::bind(&config, broker).await?;
    server.run().await?;

    tracing::info!("qbroker stopped");
    Ok(())
}
