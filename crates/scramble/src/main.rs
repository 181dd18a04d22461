//! `scramble-server`: runs the game on a TCP port.
//!
//! The server stops on Ctrl-C or when its standard input reaches end of
//! file, so `Ctrl-D` in the launching terminal shuts it down.

use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use scramble::prelude::*;
use tracing_subscriber::EnvFilter;

/// Multiplayer word-unscrambling game server.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Port to listen on
    #[arg(default_value_t = 5000)]
    port: u16,

    /// Address to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: String,

    /// Word list file, one word per line (`#` starts a comment)
    #[arg(short, long)]
    words: Option<PathBuf>,

    /// Rooms that may be open at once
    #[arg(long, default_value_t = RoomConfig::default().max_rooms)]
    max_rooms: usize,

    /// Wrong guesses allowed per player
    #[arg(short, long, default_value_t = SessionConfig::default().guess_budget)]
    guesses: u32,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), ScrambleError> {
    let mut builder = ScrambleServer::builder()
        .bind(&format!("{}:{}", args.host, args.port))
        .session_config(SessionConfig {
            guess_budget: args.guesses,
        })
        .room_config(RoomConfig {
            max_rooms: args.max_rooms,
            ..RoomConfig::default()
        });
    if let Some(path) = &args.words {
        builder = builder.words(WordList::from_file(path)?);
    }

    let server = builder.build().await?;
    let handle = server.shutdown_handle();

    // A blocking stdin read can't be cancelled, so it lives on a plain
    // thread that never holds up runtime shutdown.
    let on_eof = handle.clone();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if line.is_err() {
                break;
            }
        }
        tracing::info!("end of input, shutting down");
        on_eof.trigger();
    });

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted, shutting down");
            handle.trigger();
        }
    });

    server.run().await
}
