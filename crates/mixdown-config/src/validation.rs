// SPDX-FileCopyrightText: 2026 Mixdown Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as known log levels and non-empty tool paths.

use crate::diagnostic::ConfigError;
use crate::model::MixdownConfig;

const KNOWN_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)`
/// with all collected validation errors (does not fail fast).
pub fn validate_config(config: &MixdownConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !KNOWN_LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.log_level must be one of {}, got `{}`",
                KNOWN_LOG_LEVELS.join(", "),
                config.agent.log_level
            ),
        });
    }

    if config.downloads.dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "downloads.dir must not be empty".to_string(),
        });
    }

    if config.fetcher.ytdlp_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "fetcher.ytdlp_path must not be empty".to_string(),
        });
    }

    if config.fetcher.audio_format.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "fetcher.audio_format must not be empty".to_string(),
        });
    }

    if config.fetcher.audio_quality.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "fetcher.audio_quality must not be empty".to_string(),
        });
    }

    // Validate health.host looks like a valid IP or hostname
    if config.health.enabled {
        let host = config.health.host.trim();
        if host.is_empty() {
            errors.push(ConfigError::Validation {
                message: "health.host must not be empty when health.enabled".to_string(),
            });
        } else {
            let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
            let is_valid_hostname = host
                .chars()
                .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
            if !is_valid_ip && !is_valid_hostname {
                errors.push(ConfigError::Validation {
                    message: format!("health.host `{host}` is not a valid IP address or hostname"),
                });
            }
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
