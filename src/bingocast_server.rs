// src/bingocast_server.rs
// Entry point for the bingocast broadcast hub.

use clap::Parser;

use bingocast::config::ServerConfig;
use bingocast::logging::{log_error_stderr, log_info};
use bingocast::server;

#[derive(Parser)]
#[command(name = env!("CARGO_BIN_NAME"))]
#[command(about = "Bingocast Server - Broadcast hub for the live bingo caller")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Override the listen host from conf/server.conf
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port from conf/server.conf (PORT env also works)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let mut config = ServerConfig::load_or_default();
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    log_info(&format!("Starting bingocast server on {}:{}", config.host, config.port));

    let server_handle = server::start_server(config);

    if let Err(e) = server_handle.await {
        log_error_stderr(&format!("Server task failed: {e:?}"));
        std::process::exit(1);
    }
}
