use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use directories::ProjectDirs;
use std::fs;
use log::debug;

use crate::error::{ConfigError, Result};
use crate::matcher::ScoreWeights;
use crate::model::ItemField;
use crate::sources::history::DEFAULT_HISTORY_SIZE;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_history_size")]
    pub history_size: usize,
    #[serde(default = "default_true")]
    pub persist_history: bool,
}

fn default_history_size() -> usize { DEFAULT_HISTORY_SIZE }
fn default_true() -> bool { true }

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            history_size: default_history_size(),
            persist_history: true,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SearchConfig {
    #[serde(default = "default_true")]
    pub fuzzy_match: bool,
    #[serde(default = "default_min_score")]
    pub min_score: f64,
    #[serde(default = "default_debounce_delay_ms")]
    pub debounce_delay_ms: u64,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_fields")]
    pub fields: Vec<ItemField>,
    #[serde(default)]
    pub weights: ScoreWeights,
    // Filled in from [general]
    #[serde(skip, default = "default_history_size")]
    pub history_size: usize,
}

fn default_min_score() -> f64 { 0.3 }
fn default_debounce_delay_ms() -> u64 { 300 }
fn default_max_results() -> usize { 100 }
fn default_fields() -> Vec<ItemField> {
    vec![
        ItemField::Name,
        ItemField::Description,
        ItemField::Sku,
        ItemField::Barcode,
        ItemField::Category,
        ItemField::Supplier,
    ]
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fuzzy_match: true,
            min_score: default_min_score(),
            debounce_delay_ms: default_debounce_delay_ms(),
            max_results: default_max_results(),
            fields: default_fields(),
            weights: ScoreWeights::default(),
            history_size: default_history_size(),
        }
    }
}

impl SearchConfig {
    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_delay_ms)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct PaginationConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_page_size_options")]
    pub page_size_options: Vec<usize>,
    #[serde(default = "default_max_pages_to_show")]
    pub max_pages_to_show: usize,
}

fn default_page_size() -> usize { 10 }
fn default_page_size_options() -> Vec<usize> { vec![5, 10, 25, 50, 100] }
fn default_max_pages_to_show() -> usize { 5 }

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            page_size_options: default_page_size_options(),
            max_pages_to_show: default_max_pages_to_show(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let p = &self.pagination;
        if p.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if p.page_size_options.is_empty() || p.page_size_options.contains(&0) {
            return Err(ConfigError::BadPageSizeOptions);
        }
        if !p.page_size_options.contains(&p.page_size) {
            return Err(ConfigError::PageSizeNotOffered(p.page_size));
        }

        let s = &self.search;
        if !(0.0..=1.0).contains(&s.min_score) {
            return Err(ConfigError::MinScoreOutOfRange(s.min_score));
        }
        if s.max_results == 0 {
            return Err(ConfigError::ZeroMaxResults);
        }
        if s.fields.is_empty() {
            return Err(ConfigError::NoSearchFields);
        }
        Ok(())
    }
}

pub fn default_config_path() -> PathBuf {
    match ProjectDirs::from("org", "invsearch", "invsearch") {
        Some(dirs) => dirs.config_dir().join("config.toml"),
        None => PathBuf::from("config.toml"),
    }
}

pub fn parse_config(content: &str) -> Result<Config> {
    let mut config: Config = toml::from_str(content)?;
    config.search.history_size = config.general.history_size;
    config.validate()?;
    Ok(config)
}

/// Loads `path`, or the default location when `None`. A missing file gives
/// the defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);

    if !config_path.exists() {
        debug!("No config at {:?}, using defaults", config_path);
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&config_path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = Config::default();
        assert!(config.search.fuzzy_match);
        assert_eq!(config.search.min_score, 0.3);
        assert_eq!(config.search.debounce_delay(), Duration::from_millis(300));
        assert_eq!(config.search.max_results, 100);
        assert_eq!(config.pagination.page_size_options, vec![5, 10, 25, 50, 100]);
        assert_eq!(config.pagination.max_pages_to_show, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = parse_config(
            r#"
            [general]
            history_size = 7

            [search]
            min_score = 0.5
            fields = ["name", "minStock"]

            [search.weights]
            coverage = 0.1
            "#,
        )
        .unwrap();
        assert_eq!(config.search.min_score, 0.5);
        assert_eq!(config.search.fields, vec![ItemField::Name, ItemField::MinStock]);
        assert_eq!(config.search.weights.coverage, 0.1);
        assert_eq!(config.search.weights.completeness, 0.5);
        assert_eq!(config.search.history_size, 7);
        assert_eq!(config.pagination.page_size, 10);
    }

    #[test]
    fn test_page_size_must_be_offered() {
        let err = parse_config("[pagination]\npage_size = 7\n").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::PageSizeNotOffered(7))));
    }

    #[test]
    fn test_unknown_field_name_is_rejected() {
        let err = parse_config("[search]\nfields = [\"colour\"]\n").unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.pagination.page_size, 10);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[search]\nfuzzy_match = false\n").unwrap();
        assert!(!load_config(Some(&path)).unwrap().search.fuzzy_match);
    }
}
