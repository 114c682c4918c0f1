//! Configuration persistence for the vocab CLI.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::quiz::{QuizConfig, QuizMode};

/// Application configuration that persists between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Where words and wrong answers are stored. Defaults to the platform
    /// data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub quiz: QuizDefaults,
}

/// Quiz settings used when the command line leaves them out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizDefaults {
    #[serde(default = "default_mode")]
    pub mode: QuizMode,
    #[serde(default = "default_quantity")]
    pub quantity: usize,
    #[serde(default)]
    pub use_wrong_only: bool,
}

fn default_mode() -> QuizMode {
    QuizMode::EnToCn
}

fn default_quantity() -> usize {
    10
}

impl Default for QuizDefaults {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            quantity: default_quantity(),
            use_wrong_only: false,
        }
    }
}

impl From<&QuizDefaults> for QuizConfig {
    fn from(defaults: &QuizDefaults) -> Self {
        QuizConfig {
            mode: defaults.mode,
            use_wrong_only: defaults.use_wrong_only,
            quantity: defaults.quantity,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            quiz: QuizDefaults::default(),
        }
    }
}

impl Config {
    /// Get the default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vocab-srs")
            .join("config.toml")
    }

    /// Load config from the default path, returning default if file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| "Failed to parse config file")?;

        Ok(config)
    }

    /// Apply settings given on the command line. Returns whether anything
    /// changed.
    pub fn update(
        &mut self,
        data_dir: Option<PathBuf>,
        mode: Option<QuizMode>,
        quantity: Option<usize>,
        use_wrong_only: Option<bool>,
    ) -> bool {
        let before = self.clone();
        if let Some(dir) = data_dir {
            self.data_dir = Some(dir);
        }
        if let Some(mode) = mode {
            self.quiz.mode = mode;
        }
        if let Some(quantity) = quantity {
            self.quiz.quantity = quantity;
        }
        if let Some(wrong_only) = use_wrong_only {
            self.quiz.use_wrong_only = wrong_only;
        }
        *self != before
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.quiz.quantity, 10);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[quiz]\nmode = \"spelling\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.quiz.mode, QuizMode::Spelling);
        assert_eq!(config.quiz.quantity, 10);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_unknown_mode_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[quiz]\nmode = \"multiple\"\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            data_dir: Some(dir.path().join("words")),
            quiz: QuizDefaults {
                mode: QuizMode::FillBlank,
                quantity: 20,
                use_wrong_only: true,
            },
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_update_changes_only_given_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();

        assert!(!config.update(None, None, None, None));
        assert!(!config.update(None, Some(QuizMode::EnToCn), None, None));
        assert!(config.update(None, Some(QuizMode::Spelling), Some(5), None));
        assert_eq!(config.quiz.mode, QuizMode::Spelling);
        assert_eq!(config.quiz.quantity, 5);
        assert!(!config.quiz.use_wrong_only);
        assert!(config.data_dir.is_none());

        config.save_to(&path).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("mode = \"spelling\""));
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_quiz_config_from_defaults() {
        let quiz: QuizConfig = (&QuizDefaults::default()).into();
        assert_eq!(quiz, QuizConfig::default());
    }
}
