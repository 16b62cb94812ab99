use crate::annotator::ScanMode;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const LOCAL_CONFIG_FILE: &str = ".spellmark.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub language: String,
    pub personal_dictionary: Option<PathBuf>,

    /// Tokens matching any of these regexes are never flagged.
    pub ignore_patterns: Vec<String>,

    /// Never flag tokens made only of digits.
    pub skip_numbers: bool,

    /// Tokens shorter than this (in chars) are never flagged. 0 disables.
    pub min_word_length: usize,

    pub max_suggestions: usize,

    pub scan_mode: ScanMode,
}

fn default_max_suggestions() -> usize {
    5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "en_US".to_string(),
            personal_dictionary: None,
            ignore_patterns: Vec::new(),
            skip_numbers: false,
            min_word_length: 0,
            max_suggestions: default_max_suggestions(),
            scan_mode: ScanMode::Substring,
        }
    }
}

/// One config file as written: only the keys it sets are `Some`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigLayer {
    pub language: Option<String>,
    pub personal_dictionary: Option<PathBuf>,
    pub ignore_patterns: Option<Vec<String>>,
    pub skip_numbers: Option<bool>,
    pub min_word_length: Option<usize>,
    pub max_suggestions: Option<usize>,
    pub scan_mode: Option<ScanMode>,
}

impl ConfigLayer {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

impl Config {
    /// Load configuration with priority: CLI args > local config > global config > defaults
    pub fn load(
        language: Option<String>,
        personal_dict: Option<PathBuf>,
        cli_patterns: Vec<String>,
    ) -> Result<Self> {
        let mut files = Vec::new();
        if let Some(global_path) = Self::global_config_path() {
            files.push(global_path);
        }
        files.push(PathBuf::from(LOCAL_CONFIG_FILE));

        let mut config = Self::from_layers(&files)?;

        if let Some(language) = language {
            config.language = language;
        }
        if let Some(dict) = personal_dict {
            config.personal_dictionary = Some(dict);
        }
        config.ignore_patterns.extend(cli_patterns);

        if config.personal_dictionary.is_none() {
            config.personal_dictionary = Self::default_personal_dict_path();
        }

        if let Some(path) = &config.personal_dictionary {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .context("Failed to create personal dictionary directory")?;
            }
        }

        debug!(?config, "configuration resolved");
        Ok(config)
    }

    /// Defaults overlaid by each existing file in order; later files win.
    pub fn from_layers(paths: &[impl AsRef<Path>]) -> Result<Self> {
        let mut config = Self::default();
        for path in paths {
            let path = path.as_ref();
            if path.exists() {
                debug!(path = %path.display(), "reading config file");
                config = config.merge(ConfigLayer::from_file(path)?);
            }
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Ok(Self::default().merge(ConfigLayer::from_file(path)?))
    }

    /// Every key the layer sets wins, even when it sets a default value.
    fn merge(mut self, layer: ConfigLayer) -> Self {
        if let Some(language) = layer.language {
            self.language = language;
        }
        if let Some(path) = layer.personal_dictionary {
            self.personal_dictionary = Some(path);
        }
        if let Some(patterns) = layer.ignore_patterns {
            self.ignore_patterns = patterns;
        }
        if let Some(skip) = layer.skip_numbers {
            self.skip_numbers = skip;
        }
        if let Some(min) = layer.min_word_length {
            self.min_word_length = min;
        }
        if let Some(max) = layer.max_suggestions {
            self.max_suggestions = max;
        }
        if let Some(mode) = layer.scan_mode {
            self.scan_mode = mode;
        }
        self
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "spellmark").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn default_personal_dict_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "spellmark").map(|dirs| dirs.config_dir().join("personal.txt"))
    }

    pub fn data_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "spellmark").map(|dirs| dirs.data_dir().to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.language, "en_US");
        assert_eq!(config.max_suggestions, 5);
        assert_eq!(config.scan_mode, ScanMode::Substring);
        assert!(config.ignore_patterns.is_empty());
    }

    #[test]
    fn test_merge_configs() {
        let base = Config::default();
        let layer = ConfigLayer {
            language: Some("en_GB".to_string()),
            scan_mode: Some(ScanMode::Words),
            ..Default::default()
        };

        let merged = base.merge(layer);
        assert_eq!(merged.language, "en_GB");
        assert_eq!(merged.scan_mode, ScanMode::Words);
        assert_eq!(merged.max_suggestions, 5);
    }

    #[test]
    fn test_local_file_resets_global_to_default_values() {
        let dir = tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let local = dir.path().join("local.toml");
        fs::write(
            &global,
            "scan_mode = \"words\"\nskip_numbers = true\nmin_word_length = 3\nlanguage = \"en_GB\"\n",
        )
        .unwrap();
        fs::write(
            &local,
            "scan_mode = \"substring\"\nskip_numbers = false\nmin_word_length = 0\nlanguage = \"en_US\"\n",
        )
        .unwrap();

        let config = Config::from_layers(&[&global, &local]).unwrap();
        assert_eq!(config.scan_mode, ScanMode::Substring);
        assert!(!config.skip_numbers);
        assert_eq!(config.min_word_length, 0);
        assert_eq!(config.language, "en_US");
    }

    #[test]
    fn test_layers_keep_unset_keys_and_skip_missing_files() {
        let dir = tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let local = dir.path().join("local.toml");
        fs::write(&global, "skip_numbers = true\nmax_suggestions = 9\n").unwrap();
        fs::write(&local, "scan_mode = \"words\"\n").unwrap();

        let config = Config::from_layers(&[&global, &local]).unwrap();
        assert!(config.skip_numbers);
        assert_eq!(config.max_suggestions, 9);
        assert_eq!(config.scan_mode, ScanMode::Words);

        let config = Config::from_layers(&[dir.path().join("absent.toml")]).unwrap();
        assert_eq!(config.language, "en_US");
    }

    #[test]
    fn test_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "scan_mode = \"words\"\nmax_suggestions = 3\nignore_patterns = ['^https?://']\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.scan_mode, ScanMode::Words);
        assert_eq!(config.max_suggestions, 3);
        assert_eq!(config.language, "en_US");
        assert_eq!(config.ignore_patterns, vec!["^https?://".to_string()]);
    }

    #[test]
    fn test_bad_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "max_suggestions = \"many\"").unwrap();
        assert!(Config::from_file(&path).is_err());
    }
}
