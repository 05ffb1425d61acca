use anyhow::Context;
use std::sync::Arc;

// Entry point for `cargo run -p web-server`. Reads `config.toml` and the
// environment, then serves the API on `server.addr`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = configuration::load_config().context("Failed to load configuration")?;
    let _guard = web_server::telemetry::init_tracing(&config.logging)?;

    let addr = config.server.addr;
    let state = Arc::new(web_server::AppState::new(config));
    web_server::run_server(addr, state).await
}
