//! Headless gitport server binary
//!
//! Reads newline-delimited JSON messages on stdin, dispatches each against
//! a single gateway session and writes one JSON response per line to
//! stdout. Suitable for embedding under any host that can speak pipes.
//!
//! Usage:
//!   GITPORT_DATA_ROOT=/var/lib/gitport ./gitport-server
//!
//! Environment variables:
//!   - GITPORT_DATA_ROOT: Sandbox data root (default: ~/.gitport)
//!   - RUST_LOG: tracing filter (default: info)

use std::sync::Arc;

use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use gitport::commands::{dispatch, Response};
use gitport::error::CommandError;
use gitport::message::Message;
use gitport::utils::paths;
use gitport::{session, GatewayConfig};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let data_root = match paths::get_data_root() {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Failed to resolve data root: {}", e);
            std::process::exit(1);
        }
    };

    let config = GatewayConfig::load_or_default(&paths::config_file_path(&data_root));

    let session = match session::create_session(&config) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Failed to create session: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(session = %session.id(), data_root = %data_root.display(), "gitport server ready");

    let stdin = BufReader::new(io::stdin());
    let mut lines = stdin.lines();
    let mut stdout = io::stdout();

    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }

        let response = match Message::parse(&line) {
            Ok(message) => {
                let session = Arc::clone(&session);
                // Commands run on the blocking pool; awaiting each result
                // before the next read keeps execution against the session
                // handle strictly serialized
                match tokio::task::spawn_blocking(move || dispatch(&session, &message)).await {
                    Ok(response) => response,
                    Err(e) => Response::failure(
                        "",
                        CommandError::git(format!("Command task failed: {}", e)),
                    ),
                }
            }
            Err(error) => Response::failure("", error),
        };

        let json = match serde_json::to_string(&response) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize response: {}", e);
                continue;
            }
        };

        if stdout.write_all(json.as_bytes()).await.is_err()
            || stdout.write_all(b"\n").await.is_err()
            || stdout.flush().await.is_err()
        {
            break;
        }
    }

    tracing::info!(session = %session.id(), "gitport server shutting down");
}
