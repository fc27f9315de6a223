//! Runtime configuration from environment variables.

use std::env;

use chrono::Duration;

/// Longest accepted review edit window, ten years.
pub const MAX_REVIEW_EDIT_WINDOW_HOURS: i64 = 24 * 365 * 10;

/// Knobs for a running marketplace system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketConfig {
    /// Mailbox size of every store actor
    pub channel_buffer: usize,

    /// How long a review stays editable after creation
    pub review_edit_window_hours: i64,

    /// Log level filter used when `RUST_LOG` is unset
    pub log_level: String,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            channel_buffer: 32,
            review_edit_window_hours: 24,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl MarketConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `MARKET_CHANNEL_BUFFER`: Actor mailbox size (default: 32)
    /// - `MARKET_REVIEW_EDIT_WINDOW_HOURS`: Review edit window (default: 24)
    /// - `MARKET_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `MARKET_JSON_LOGS`: Enable JSON logs (default: false)
    ///
    /// Values that do not parse fall back to their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            channel_buffer: lookup("MARKET_CHANNEL_BUFFER")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|size| *size > 0)
                .unwrap_or(defaults.channel_buffer),

            review_edit_window_hours: lookup("MARKET_REVIEW_EDIT_WINDOW_HOURS")
                .and_then(|v| v.trim().parse::<i64>().ok())
                .filter(|hours| (0..=MAX_REVIEW_EDIT_WINDOW_HOURS).contains(hours))
                .unwrap_or(defaults.review_edit_window_hours),

            log_level: lookup("MARKET_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            json_logs: lookup("MARKET_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.json_logs),
        }
    }

    /// Values set directly on the field are clamped to `0..=MAX_REVIEW_EDIT_WINDOW_HOURS`.
    pub fn review_edit_window(&self) -> Duration {
        Duration::hours(
            self.review_edit_window_hours
                .clamp(0, MAX_REVIEW_EDIT_WINDOW_HOURS),
        )
    }
}
