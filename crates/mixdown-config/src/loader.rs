// SPDX-FileCopyrightText: 2026 Mixdown Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./mixdown.toml` > `~/.config/mixdown/mixdown.toml`
//! > `/etc/mixdown/mixdown.toml` with environment variable overrides via
//! the `MIXDOWN_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::MixdownConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/mixdown/mixdown.toml` (system-wide)
/// 3. `~/.config/mixdown/mixdown.toml` (user XDG config)
/// 4. `./mixdown.toml` (local directory)
/// 5. `MIXDOWN_*` environment variables
pub fn load_config() -> Result<MixdownConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MixdownConfig::default()))
        .merge(Toml::file("/etc/mixdown/mixdown.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("mixdown/mixdown.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("mixdown.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<MixdownConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MixdownConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MixdownConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MixdownConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `MIXDOWN_TELEGRAM_BOT_TOKEN` must map
/// to `telegram.bot_token`, not `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("MIXDOWN_").map(|key| {
        // `key` is the lowercased env var name with the prefix stripped.
        // Example: MIXDOWN_TELEGRAM_BOT_TOKEN -> "telegram_bot_token"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("telegram_", "telegram.", 1)
            .replacen("downloads_", "downloads.", 1)
            .replacen("fetcher_", "fetcher.", 1)
            .replacen("health_", "health.", 1);
        mapped.into()
    })
}
