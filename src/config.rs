use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub reveal_hidden: bool,
    #[serde(default = "default_track_speed")]
    pub track_speed: bool,
    #[serde(default = "default_countdown_minutes")]
    pub countdown_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passage_file: Option<String>,
    #[serde(default = "default_placeholder")]
    pub placeholder: char,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_track_speed() -> bool {
    true
}
fn default_countdown_minutes() -> u32 {
    1
}
fn default_placeholder() -> char {
    '_'
}
fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            reveal_hidden: false,
            track_speed: default_track_speed(),
            countdown_minutes: default_countdown_minutes(),
            passage_file: None,
            placeholder: default_placeholder(),
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cloze")
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn passage_path(&self) -> Option<PathBuf> {
        self.passage_file
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert!(!config.reveal_hidden);
        assert!(config.track_speed);
        assert_eq!(config.countdown_minutes, 1);
        assert_eq!(config.placeholder, '_');
    }

    #[test]
    fn test_config_partial_file() {
        let toml_str = r#"
theme = "terminal-default"
reveal_hidden = true
passage_file = "/tmp/texts.json"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.theme, "terminal-default");
        assert!(config.reveal_hidden);
        assert_eq!(config.passage_path(), Some(PathBuf::from("/tmp/texts.json")));
        assert_eq!(config.countdown_minutes, 1);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config {
            countdown_minutes: 5,
            placeholder: '·',
            ..Config::default()
        };
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_blank_passage_file_ignored() {
        let config = Config {
            passage_file: Some("  ".to_string()),
            ..Config::default()
        };
        assert_eq!(config.passage_path(), None);
    }
}
