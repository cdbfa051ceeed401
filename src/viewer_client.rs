// src/viewer_client.rs
// The guest client: a passive, silent mirror of the shared board. Numbers
// appear as the admin draws them, announcements overlay the screen, and a
// reset clears everything. No audio, no input beyond quitting.

use std::error::Error;

use clap::Parser;

use bingocast::client::{self, ClientOptions};
use bingocast::config::ClientConfig;
use bingocast::role::Role;

#[derive(Parser)]
#[command(name = env!("CARGO_BIN_NAME"))]
#[command(about = "Bingocast Viewer - Watch the shared board live")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {}

async fn run() -> Result<(), Box<dyn Error>> {
    print!("\x1Bc");
    println!("Bingocast Viewer");

    let config = ClientConfig::load_or_default();

    client::run_client(ClientOptions {
        config,
        role: Role::Guest,
        line_prize: None,
        bingo_prize: None,
        reset_on_start: false,
    })
    .await
}

#[tokio::main]
async fn main() {
    let _args = Args::parse();

    match run().await {
        Ok(_) => {
            println!("Viewer finished successfully.");
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
