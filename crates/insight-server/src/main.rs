use anyhow::Result;
use clap::Parser;
use insight_server::{ServerConfig, logging, serve};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();
    logging::init(&config.log_filter)?;
    serve(config).await
}
