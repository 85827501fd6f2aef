// SPDX-FileCopyrightText: 2026 Mixdown Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for mixdown.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level mixdown configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values; only `telegram.bot_token` is required to actually serve.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MixdownConfig {
    /// Process identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Telegram transport settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Download directory settings.
    #[serde(default)]
    pub downloads: DownloadsConfig,

    /// Media fetcher (yt-dlp) settings.
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Liveness probe settings.
    #[serde(default)]
    pub health: HealthConfig,
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the bot process.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "mixdown".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram transport configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. Required for `mixdown serve`.
    #[serde(default)]
    pub bot_token: Option<String>,
}

/// Download directory configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DownloadsConfig {
    /// Directory converted files are written to. Created at startup.
    #[serde(default = "default_download_dir")]
    pub dir: String,
}

impl Default for DownloadsConfig {
    fn default() -> Self {
        Self {
            dir: default_download_dir(),
        }
    }
}

fn default_download_dir() -> String {
    "downloads".to_string()
}

/// Media fetcher configuration.
///
/// Mirrors the options passed to yt-dlp: target format and quality,
/// retry bounds, optional authentication cookies, and tool locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FetcherConfig {
    /// Path or name of the yt-dlp binary.
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: String,

    /// Directory containing ffmpeg, when not on PATH.
    #[serde(default)]
    pub ffmpeg_location: Option<String>,

    /// Target audio container/codec.
    #[serde(default = "default_audio_format")]
    pub audio_format: String,

    /// Target audio quality passed to the extractor (kbit/s).
    #[serde(default = "default_audio_quality")]
    pub audio_quality: String,

    /// Whole-item retry bound for transient failures.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Fragment-level retry bound for transient failures.
    #[serde(default = "default_retries")]
    pub fragment_retries: u32,

    /// Base64-encoded Netscape cookie jar, passed through to the tool.
    #[serde(default)]
    pub cookies_b64: Option<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: default_ytdlp_path(),
            ffmpeg_location: None,
            audio_format: default_audio_format(),
            audio_quality: default_audio_quality(),
            retries: default_retries(),
            fragment_retries: default_retries(),
            cookies_b64: None,
        }
    }
}

fn default_ytdlp_path() -> String {
    "yt-dlp".to_string()
}

fn default_audio_format() -> String {
    "mp3".to_string()
}

fn default_audio_quality() -> String {
    "192".to_string()
}

fn default_retries() -> u32 {
    10
}

/// Liveness probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HealthConfig {
    /// Enable the HTTP liveness probe.
    #[serde(default = "default_health_enabled")]
    pub enabled: bool,

    /// Address to bind the probe to.
    #[serde(default = "default_health_host")]
    pub host: String,

    /// Port to bind the probe to.
    #[serde(default = "default_health_port")]
    pub port: u16,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_health_enabled(),
            host: default_health_host(),
            port: default_health_port(),
        }
    }
}

fn default_health_enabled() -> bool {
    true
}

fn default_health_host() -> String {
    "0.0.0.0".to_string()
}

fn default_health_port() -> u16 {
    8080
}
