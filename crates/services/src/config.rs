use std::env;
use std::time::Duration;

use quiz_core::model::{SessionMode, SessionOptions};
use quiz_core::progress::{DEFAULT_UNITS_PER_PAGE, PaginationEngine};

use crate::error::ConfigError;

/// How long an example stays on screen before the next question appears.
pub const DEFAULT_EXAMPLE_DISPLAY: Duration = Duration::from_secs(3);

/// Session-scoped configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub units_per_page: u32,
    pub example_display: Duration,
    pub options: SessionOptions,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            units_per_page: DEFAULT_UNITS_PER_PAGE,
            example_display: DEFAULT_EXAMPLE_DISPLAY,
            options: SessionOptions::default(),
        }
    }
}

impl SessionConfig {
    /// Read `QUIZ_UNITS_PER_PAGE`, `QUIZ_EXAMPLE_MS`, `QUIZ_MODE` and `QUIZ_SHOW_HINTS`.
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when a value cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup("QUIZ_UNITS_PER_PAGE") {
            let parsed = raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|value| *value > 0)
                .ok_or(ConfigError::InvalidValue {
                    key: "QUIZ_UNITS_PER_PAGE",
                    raw: raw.clone(),
                })?;
            config.units_per_page = parsed;
        }
        if let Some(raw) = lookup("QUIZ_EXAMPLE_MS") {
            let millis = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "QUIZ_EXAMPLE_MS",
                    raw: raw.clone(),
                })?;
            config.example_display = Duration::from_millis(millis);
        }
        if let Some(raw) = lookup("QUIZ_MODE") {
            config.options.mode = raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "QUIZ_MODE",
                raw: raw.clone(),
            })?;
        }
        if let Some(raw) = lookup("QUIZ_SHOW_HINTS") {
            config.options.show_hints = parse_flag(&raw).ok_or(ConfigError::InvalidValue {
                key: "QUIZ_SHOW_HINTS",
                raw: raw.clone(),
            })?;
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_mode(mut self, mode: SessionMode) -> Self {
        self.options.mode = mode;
        self
    }

    #[must_use]
    pub fn with_show_hints(mut self, show_hints: bool) -> Self {
        self.options.show_hints = show_hints;
        self
    }

    #[must_use]
    pub fn with_units_per_page(mut self, units_per_page: u32) -> Self {
        self.units_per_page = units_per_page;
        self
    }

    #[must_use]
    pub fn with_example_display(mut self, example_display: Duration) -> Self {
        self.example_display = example_display;
        self
    }

    /// # Errors
    ///
    /// Returns `ConfigError::Pagination` if `units_per_page` is zero.
    pub fn pagination_engine(&self) -> Result<PaginationEngine, ConfigError> {
        Ok(PaginationEngine::new(self.units_per_page)?)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
