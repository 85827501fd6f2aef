// SPDX-FileCopyrightText: 2026 Mixdown Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mixdown serve` command implementation.
//!
//! Wires the Telegram gateway, yt-dlp fetcher, job supervisor, and
//! dialogue engine together, then pumps inbound chat events through the
//! engine one at a time until a shutdown signal arrives.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, warn};

use mixdown_config::model::MixdownConfig;
use mixdown_core::MixdownError;
use mixdown_dialogue::DialogueEngine;
use mixdown_fetcher::{FetchOptions, YtDlpFetcher, cookies};
use mixdown_jobs::JobSupervisor;
use mixdown_telegram::TelegramGateway;

use crate::{health, shutdown};

/// Runs the `mixdown serve` command.
pub async fn run_serve(config: MixdownConfig) -> Result<(), MixdownError> {
    init_tracing(&config.agent.log_level);

    info!("starting mixdown serve");

    let download_dir = PathBuf::from(&config.downloads.dir);
    std::fs::create_dir_all(&download_dir).map_err(|e| {
        MixdownError::Config(format!(
            "cannot create download directory {}: {e}",
            download_dir.display()
        ))
    })?;

    let cookie_file = match config.fetcher.cookies_b64.as_deref() {
        Some(blob) => cookies::materialize_cookies(blob, &download_dir)?,
        None => None,
    };

    let fetcher = Arc::new(YtDlpFetcher::new(FetchOptions {
        ytdlp_path: config.fetcher.ytdlp_path.clone(),
        download_dir,
        audio_format: config.fetcher.audio_format.clone(),
        audio_quality: config.fetcher.audio_quality.clone(),
        retries: config.fetcher.retries,
        fragment_retries: config.fetcher.fragment_retries,
        ffmpeg_location: config.fetcher.ffmpeg_location.clone(),
        cookie_file,
    }));

    let mut gateway = TelegramGateway::new(&config.telegram)?;
    gateway.connect();
    let gateway = Arc::new(gateway);

    let supervisor = JobSupervisor::new();
    let engine = DialogueEngine::new(Arc::clone(&gateway), fetcher, supervisor);

    if config.health.enabled {
        let health_config = config.health.clone();
        let service = config.agent.name.clone();
        tokio::spawn(async move {
            if let Err(e) = health::run_probe(health_config, service).await {
                warn!(error = %e, "liveness probe stopped");
            }
        });
    }

    let cancel = shutdown::install_signal_handler();

    // Events are handled strictly one at a time; only granted jobs run
    // detached, so the loop stays free to serve the cancel command.
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("shutdown requested");
                break;
            }
            event = gateway.next_event() => {
                match event {
                    Ok(event) => {
                        if let Err(e) = engine.handle_event(event).await {
                            error!(error = %e, "failed to handle chat event");
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "inbound event stream closed");
                        break;
                    }
                }
            }
        }
    }

    info!("mixdown serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mixdown={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
