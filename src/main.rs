//! `ludo-relay`: the room relay binary.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ludo_engine::relay::{self, RelayConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = RelayConfig::parse();

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log)
            .with_context(|| format!("invalid log filter {:?}", config.log))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    relay::run(config).await
}
