// SPDX-FileCopyrightText: 2026 Mixdown Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argument construction and output parsing for the `yt-dlp` invocation.
//!
//! Kept free of I/O so the exact command line is unit-testable.

use std::path::PathBuf;

use mixdown_core::MixdownError;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Everything a fetch needs besides the link itself.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Path or name of the `yt-dlp` binary.
    pub ytdlp_path: String,
    /// Directory downloads land in.
    pub download_dir: PathBuf,
    /// Target audio container, e.g. `mp3`.
    pub audio_format: String,
    /// Target bitrate passed to the extractor, e.g. `192`.
    pub audio_quality: String,
    pub retries: u32,
    pub fragment_retries: u32,
    /// Directory holding the ffmpeg binaries, when not on PATH.
    pub ffmpeg_location: Option<String>,
    /// Netscape-format cookie file, when one was materialized.
    pub cookie_file: Option<PathBuf>,
}

/// Builds the full `yt-dlp` argument list for one fetch.
///
/// `--print title` and `--print after_move:filepath` make yt-dlp emit
/// exactly two stdout lines per download (`--no-simulate` keeps the
/// download itself happening), which [`parse_output`] consumes.
pub fn build_args(options: &FetchOptions, url: &str) -> Vec<String> {
    let mut args = vec![
        "-f".to_string(),
        "bestaudio/best".to_string(),
        "--no-playlist".to_string(),
        "-x".to_string(),
        "--audio-format".to_string(),
        options.audio_format.clone(),
        "--audio-quality".to_string(),
        options.audio_quality.clone(),
        "--retries".to_string(),
        options.retries.to_string(),
        "--fragment-retries".to_string(),
        options.fragment_retries.to_string(),
        "--concurrent-fragments".to_string(),
        "1".to_string(),
        "--add-headers".to_string(),
        format!("User-Agent:{USER_AGENT}"),
        "--add-headers".to_string(),
        format!("Accept-Language:{ACCEPT_LANGUAGE}"),
        "--extractor-args".to_string(),
        "youtube:player_client=android,web".to_string(),
        "-o".to_string(),
        options
            .download_dir
            .join("%(title)s.%(ext)s")
            .to_string_lossy()
            .into_owned(),
        "--print".to_string(),
        "title".to_string(),
        "--print".to_string(),
        "after_move:filepath".to_string(),
        "--no-simulate".to_string(),
        "--quiet".to_string(),
        "--no-warnings".to_string(),
    ];
    if let Some(ref ffmpeg) = options.ffmpeg_location {
        args.push("--ffmpeg-location".to_string());
        args.push(ffmpeg.clone());
    }
    if let Some(ref cookie_file) = options.cookie_file {
        args.push("--cookies".to_string());
        args.push(cookie_file.to_string_lossy().into_owned());
    }
    args.push(url.to_string());
    args
}

/// Parsed result of a successful invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedOutput {
    pub title: String,
    pub path: PathBuf,
}

/// Extracts the title and final file path from yt-dlp's stdout.
///
/// With `--quiet` the two `--print` directives are the only stdout,
/// emitted in order: title first, then path.
pub fn parse_output(stdout: &str) -> Result<FetchedOutput, MixdownError> {
    let mut lines = stdout.lines().map(str::trim).filter(|l| !l.is_empty());
    let title = lines.next();
    let path = lines.next();
    match (title, path) {
        (Some(title), Some(path)) => Ok(FetchedOutput {
            title: title.to_string(),
            path: PathBuf::from(path),
        }),
        _ => Err(MixdownError::fetch(format!(
            "yt-dlp printed unexpected output: {stdout:?}"
        ))),
    }
}

/// Trailing lines of stderr, for error messages that stay readable.
pub fn stderr_tail(stderr: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}
