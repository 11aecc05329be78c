//! Game configuration, loaded once at startup.

use std::fs;
use std::mem::size_of;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::ring::Node;
use crate::snake::Segment;

/// Colour scheme selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Red accents on a white-coffee base.
    Light,
    /// White-coffee accents on a raisin-black base.
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Side of one grid cell in pixels.
    pub cell_size: u32,
    /// Seconds between simulation steps.
    pub step_interval: f32,
    /// Records laid out on every restart.
    pub start_length: usize,
    /// Length at which the session is won.
    pub max_length: usize,
    /// Bytes in the root arena.
    pub memory_size: usize,
    pub theme: Theme,
    /// Seed for goal placement; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cell_size: 50,
            step_interval: 0.06,
            start_length: 3,
            max_length: 100 + 3,
            memory_size: 64 * 1024,
            theme: Theme::Light,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Reads and validates a TOML file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Bytes the chain store needs when carved out of the root arena,
    /// alignment slack included.
    pub fn chain_store_size(&self) -> usize {
        let node = size_of::<Node<Segment>>();
        self.max_length.saturating_mul(node).saturating_add(node)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cell_size == 0 {
            return Err(ConfigError::Invalid("cell_size must be non-zero".into()));
        }
        if !self.step_interval.is_finite() || self.step_interval <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "step_interval must be a positive number of seconds, got {}",
                self.step_interval
            )));
        }
        if self.start_length == 0 {
            return Err(ConfigError::Invalid("start_length must be at least 1".into()));
        }
        if self.max_length <= self.start_length {
            return Err(ConfigError::Invalid(format!(
                "max_length ({}) must exceed start_length ({})",
                self.max_length, self.start_length
            )));
        }
        if self.memory_size < self.chain_store_size() {
            return Err(ConfigError::Invalid(format!(
                "memory_size ({}) cannot hold {} chain records ({} bytes)",
                self.memory_size,
                self.max_length,
                self.chain_store_size()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = GameConfig::default();
        config.validate().unwrap();
        assert_eq!(config.max_length, 103);
        assert_eq!(config.cell_size, 50);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GameConfig::from_toml(
            r#"
            cell_size = 20
            theme = "dark"
            seed = 7
            "#,
        )
        .unwrap();

        assert_eq!(config.cell_size, 20);
        assert_eq!(config.theme, Theme::Dark);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.start_length, 3);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(GameConfig::from_toml("").unwrap(), GameConfig::default());
    }

    #[test]
    fn test_rejects_bad_values() {
        for text in [
            "cell_size = 0",
            "step_interval = 0.0",
            "step_interval = -1.0",
            "start_length = 0",
            "max_length = 3",
            "memory_size = 16",
        ] {
            assert!(
                matches!(GameConfig::from_toml(text), Err(ConfigError::Invalid(_))),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_unknown_keys() {
        assert!(matches!(
            GameConfig::from_toml("speed = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            GameConfig::load("/definitely/not/here.toml"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_theme_toggles() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }
}
