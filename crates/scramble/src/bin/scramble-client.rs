//! `scramble-client`: a line client for the game.
//!
//! Lines typed on stdin go to the server as guesses; lines from the
//! server are printed as they arrive. The client exits on end of input.

use std::io::BufRead;
use std::process::ExitCode;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Connects to a Scramble server.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Server port
    #[arg(default_value_t = 5000)]
    port: u16,

    /// Server host
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let addr = format!("{}:{}", args.host, args.port);
    let stream = match TcpStream::connect(&addr).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::error!(%addr, error = %e, "connect failed");
            return ExitCode::FAILURE;
        }
    };
    let (read, mut write) = stream.into_split();

    tokio::spawn(async move {
        let mut lines = BufReader::new(read).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => println!("{line}"),
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "read failed");
                    break;
                }
            }
        }
        tracing::debug!("server closed the connection");
    });

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    // Keep reading input after the server hangs up; the goodbye line
    // tells the player to press Ctrl-D.
    let mut connected = true;
    while let Some(line) = rx.recv().await {
        if !connected {
            continue;
        }
        let mut bytes = line.into_bytes();
        bytes.push(b'\n');
        if let Err(e) = write.write_all(&bytes).await {
            tracing::debug!(error = %e, "write failed");
            connected = false;
        }
    }

    ExitCode::SUCCESS
}
