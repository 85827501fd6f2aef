// SPDX-FileCopyrightText: 2026 Mixdown Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cookie material for authenticated downloads.
//!
//! Operators supply the cookie jar as a base64 blob in config or the
//! environment; it is decoded once at startup into a file yt-dlp can
//! read with `--cookies`.

use std::path::{Path, PathBuf};

use mixdown_core::MixdownError;
use tracing::info;

const COOKIE_FILE_NAME: &str = "cookies.txt";

/// Decodes the base64 blob and writes it under `dir`, returning the
/// file path. An empty or whitespace-only blob yields `None`.
pub fn materialize_cookies(blob: &str, dir: &Path) -> Result<Option<PathBuf>, MixdownError> {
    let blob = blob.trim();
    if blob.is_empty() {
        return Ok(None);
    }

    use base64::Engine as _;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(blob)
        .map_err(|e| MixdownError::Fetch {
            message: "cookie blob is not valid base64".into(),
            source: Some(Box::new(e)),
        })?;

    let path = dir.join(COOKIE_FILE_NAME);
    std::fs::write(&path, bytes).map_err(|e| MixdownError::Fetch {
        message: "failed to write cookie file".into(),
        source: Some(Box::new(e)),
    })?;
    info!(path = %path.display(), "cookie file materialized");
    Ok(Some(path))
}
