//! Engine configuration.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::time::Duration;

/// Default storage key for the persisted draw snapshot
pub const DEFAULT_STATE_KEY: &str = "tombola:state";

/// Default storage key for the audio toggle
pub const DEFAULT_AUDIO_KEY: &str = "tombola:audio-enabled";

/// Highest number in a classic tombola board
pub const DEFAULT_MAX_NUMBER: u32 = 90;

/// Default number of history records kept
pub const DEFAULT_MAX_HISTORY: usize = 90;

/// Default time the draw overlay stays up before the number is committed
pub const DEFAULT_DRAW_DELAY_MS: u64 = 1200;

/// Default locale used for spoken announcements
pub const DEFAULT_SPEECH_LOCALE: &str = "it-IT";

/// Tombola engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TombolaConfig {
    /// Storage key holding `{drawnNumbers, history}`
    pub state_key: String,

    /// Storage key holding the audio toggle (`"true"`/`"false"`)
    pub audio_key: String,

    /// Highest valid number; persisted snapshots are validated against it
    pub max_number: u32,

    /// Maximum number of history records kept (oldest evicted first)
    pub max_history: usize,

    /// Delay between starting a draw and committing it, in milliseconds
    pub draw_delay_ms: u64,

    /// Locale attached to announce requests
    pub speech_locale: String,
}

impl Default for TombolaConfig {
    fn default() -> Self {
        Self {
            state_key: DEFAULT_STATE_KEY.to_string(),
            audio_key: DEFAULT_AUDIO_KEY.to_string(),
            max_number: DEFAULT_MAX_NUMBER,
            max_history: DEFAULT_MAX_HISTORY,
            draw_delay_ms: DEFAULT_DRAW_DELAY_MS,
            speech_locale: DEFAULT_SPEECH_LOCALE.to_string(),
        }
    }
}

impl TombolaConfig {
    /// Load configuration from environment variables
    ///
    /// Recognised variables, each falling back to its default:
    /// - `TOMBOLA_STATE_KEY`
    /// - `TOMBOLA_AUDIO_KEY`
    /// - `TOMBOLA_MAX_NUMBER` (default: 90)
    /// - `TOMBOLA_MAX_HISTORY` (default: 90)
    /// - `TOMBOLA_DRAW_DELAY_MS` (default: 1200)
    /// - `TOMBOLA_SPEECH_LOCALE` (default: `it-IT`)
    ///
    /// # Errors
    ///
    /// Returns error if the loaded values fail [`TombolaConfig::validate`]
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            state_key: parse_env_or("TOMBOLA_STATE_KEY", DEFAULT_STATE_KEY.to_string()),
            audio_key: parse_env_or("TOMBOLA_AUDIO_KEY", DEFAULT_AUDIO_KEY.to_string()),
            max_number: parse_env_or("TOMBOLA_MAX_NUMBER", DEFAULT_MAX_NUMBER),
            max_history: parse_env_or("TOMBOLA_MAX_HISTORY", DEFAULT_MAX_HISTORY),
            draw_delay_ms: parse_env_or("TOMBOLA_DRAW_DELAY_MS", DEFAULT_DRAW_DELAY_MS),
            speech_locale: parse_env_or(
                "TOMBOLA_SPEECH_LOCALE",
                DEFAULT_SPEECH_LOCALE.to_string(),
            ),
        };

        config.validate()?;
        Ok(config)
    }

    /// Configuration with no draw delay, for tests and headless hosts
    pub fn instant() -> Self {
        Self {
            draw_delay_ms: 0,
            ..Self::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.state_key.trim().is_empty() {
            return Err(ConfigError::Invalid {
                var: "TOMBOLA_STATE_KEY".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }

        if self.audio_key.trim().is_empty() {
            return Err(ConfigError::Invalid {
                var: "TOMBOLA_AUDIO_KEY".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }

        if self.state_key == self.audio_key {
            return Err(ConfigError::Invalid {
                var: "TOMBOLA_AUDIO_KEY".to_string(),
                reason: format!("Must differ from the state key ({})", self.state_key),
            });
        }

        if self.max_number == 0 {
            return Err(ConfigError::Invalid {
                var: "TOMBOLA_MAX_NUMBER".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.max_history == 0 {
            return Err(ConfigError::Invalid {
                var: "TOMBOLA_MAX_HISTORY".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Draw delay as a [`Duration`]
    pub fn draw_delay(&self) -> Duration {
        Duration::from_millis(self.draw_delay_ms)
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
