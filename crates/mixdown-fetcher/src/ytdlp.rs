// SPDX-FileCopyrightText: 2026 Mixdown Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The [`MediaFetcher`] implementation over the `yt-dlp` subprocess.

use async_trait::async_trait;
use tracing::{debug, info};

use mixdown_core::types::TrackInfo;
use mixdown_core::{MediaFetcher, MixdownError, link};

use crate::invocation::{self, FetchOptions};

/// Fetches media by invoking `yt-dlp` and reading its printed output.
pub struct YtDlpFetcher {
    options: FetchOptions,
}

impl YtDlpFetcher {
    pub fn new(options: FetchOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    async fn fetch(&self, url: &str) -> Result<TrackInfo, MixdownError> {
        // The dialogue already validated the link; re-check here so a
        // misbehaving caller can never hand yt-dlp a collection.
        if !link::is_well_formed(url) || !link::is_single_item(url) {
            return Err(MixdownError::fetch(format!(
                "refusing to fetch non-single-item link: {url}"
            )));
        }

        let args = invocation::build_args(&self.options, url);
        debug!(binary = self.options.ytdlp_path.as_str(), "spawning yt-dlp");

        let output = tokio::process::Command::new(&self.options.ytdlp_path)
            .args(&args)
            .output()
            .await
            .map_err(|e| MixdownError::Fetch {
                message: format!("failed to spawn {}", self.options.ytdlp_path),
                source: Some(Box::new(e)),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let exit_code = output.status.code().unwrap_or(-1);
            return Err(MixdownError::fetch(format!(
                "yt-dlp exited with code {exit_code}: {}",
                invocation::stderr_tail(&stderr, 5)
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let parsed = invocation::parse_output(&stdout)?;
        info!(title = parsed.title.as_str(), "fetch complete");
        Ok(TrackInfo {
            path: parsed.path,
            title: parsed.title,
        })
    }
}
