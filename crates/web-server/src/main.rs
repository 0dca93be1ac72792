use std::net::SocketAddr;
use std::path::Path;
use tracing_subscriber::EnvFilter;

// This main function is the entry point when running `cargo run -p web-server`.
// It loads `config.toml` (if present) and serves on the configured address.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = configuration::load_config(Path::new("config.toml"))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level)),
        )
        .init();

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    web_server::run_server(addr, settings).await
}
