// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tracklink host simulator.
//
// Entry point. Initialises logging, loads the bridge config, and relays
// line-delimited JSON commands from stdin to the dispatcher, writing one
// response line per command to stdout. Logs go to stderr.
//
// Pass `--stub` to dispatch against the stub provider instead of the
// in-memory recording provider.

mod services;

use std::process::ExitCode;
use std::sync::Arc;

use tokio::io::BufReader;
use tracklink_bridge::{Dispatcher, RecordingProvider, TrackingProvider, platform_provider};
use tracklink_core::types::Platform;

use services::config::{config_path, load_config};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config();
    let provider: Arc<dyn TrackingProvider> = if std::env::args().skip(1).any(|a| a == "--stub") {
        platform_provider()
    } else {
        let platform = config.platform.unwrap_or_else(Platform::current);
        Arc::new(RecordingProvider::immediate(platform))
    };

    tracing::info!(
        provider = provider.name(),
        platform = %provider.platform(),
        config = %config_path().display(),
        "Tracklink host starting"
    );

    let dispatcher = Dispatcher::new(provider, config);
    let stdin = BufReader::new(tokio::io::stdin());

    match services::session::run(dispatcher, stdin, tokio::io::stdout()).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "host session failed");
            ExitCode::FAILURE
        }
    }
}
