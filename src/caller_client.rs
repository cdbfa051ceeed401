// src/caller_client.rs
// The admin client: draws numbers, corrects miscalls, broadcasts win
// announcements, and hears each call voiced locally.
//
// Interactive controls:
// - ENTER: draw a random un-called number
// - digits + ENTER: toggle a specific number (correction path)
// - L / B: announce a line / bingo win
// - ESC: hide the announcement overlay
// - R: reset the game for everyone
// - Q: exit
//
// CLI options:
// - --reset: reset the game state before starting
// - --line-prize / --bingo-prize: prize amounts shown in announcements

use std::error::Error;

use clap::Parser;

use bingocast::client::{self, ClientOptions};
use bingocast::config::ClientConfig;
use bingocast::role;

#[derive(Parser)]
#[command(name = env!("CARGO_BIN_NAME"))]
#[command(about = "Bingocast Caller - Draw numbers and drive the shared board")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Claim the admin role even against a remote server
    #[arg(long)]
    admin: bool,

    /// Reset the game state before starting
    #[arg(long)]
    reset: bool,

    /// Prize amount for a line win (e.g. 150€)
    #[arg(long)]
    line_prize: Option<String>,

    /// Prize amount for a bingo win (e.g. 500€)
    #[arg(long)]
    bingo_prize: Option<String>,
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    print!("\x1Bc");
    println!("Bingocast Caller");

    let config = ClientConfig::load_or_default();
    let role = role::classify(args.admin, &config.host);

    client::run_client(ClientOptions {
        config,
        role,
        line_prize: args.line_prize,
        bingo_prize: args.bingo_prize,
        reset_on_start: args.reset,
    })
    .await
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match run(args).await {
        Ok(_) => {
            println!("Caller finished successfully.");
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
