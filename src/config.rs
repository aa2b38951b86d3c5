use crate::error::ConfigError;
use crate::models::normalize_extension;
use crate::selector::SelectionWeights;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR_NAME: &str = "mediacull";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Extensions the scanner picks up, dot-prefixed and lowercase.
    pub supported_extensions: Vec<String>,
    pub image_similarity_threshold: f64,
    pub video_similarity_threshold: f64,
    /// Minimum auto-selection confidence for a proposal to be applied without review.
    pub auto_selection_confidence_threshold: f64,
    pub enable_auto_selection: bool,
    pub enable_visual_filtering: bool,
    /// Groups larger than this skip visual filtering and are kept as-is.
    pub max_visual_group_size: usize,
    pub similarity_cache_capacity: usize,
    pub exact_confidence_threshold: f64,
    pub exact_confidence_boost: f64,
    pub selection_weights: SelectionWeights,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supported_extensions: [
                ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff", ".tif", ".webp", // images
                ".heic", ".heif", // apple
                ".mp4", ".mov", ".avi", ".mkv", ".wmv", ".flv", ".webm", // videos
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            image_similarity_threshold: 0.90,
            video_similarity_threshold: 0.85,
            auto_selection_confidence_threshold: 0.80,
            enable_auto_selection: true,
            enable_visual_filtering: true,
            max_visual_group_size: 10,
            similarity_cache_capacity: 10_000,
            exact_confidence_threshold: 0.80,
            exact_confidence_boost: 0.10,
            selection_weights: SelectionWeights::default(),
        }
    }
}

impl AppConfig {
    /// Load from `path`, or from the per-user config file if it exists, or
    /// fall back to defaults. The result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.validate()
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&raw)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Normalize extensions and check every ratio-valued field lies in [0, 1].
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        self.supported_extensions = self
            .supported_extensions
            .iter()
            .map(|ext| normalize_extension(ext))
            .collect();

        let unit_fields = [
            ("image_similarity_threshold", self.image_similarity_threshold),
            ("video_similarity_threshold", self.video_similarity_threshold),
            (
                "auto_selection_confidence_threshold",
                self.auto_selection_confidence_threshold,
            ),
            ("exact_confidence_threshold", self.exact_confidence_threshold),
            ("exact_confidence_boost", self.exact_confidence_boost),
            ("selection_weights.similarity", self.selection_weights.similarity),
            (
                "selection_weights.suffix_difference",
                self.selection_weights.suffix_difference,
            ),
            (
                "selection_weights.no_suffix_difference",
                self.selection_weights.no_suffix_difference,
            ),
            ("selection_weights.identical_size", self.selection_weights.identical_size),
            ("selection_weights.near_size", self.selection_weights.near_size),
            ("selection_weights.near_size_ratio", self.selection_weights.near_size_ratio),
        ];
        for (field, value) in unit_fields {
            check_unit(field, value)?;
        }

        if self.max_visual_group_size < 2 {
            return Err(ConfigError::OutOfRange {
                field: "max_visual_group_size",
                value: self.max_visual_group_size.to_string(),
                expected: "at least 2",
            });
        }

        Ok(self)
    }

    pub fn is_supported_extension(&self, extension: &str) -> bool {
        let ext = normalize_extension(extension);
        self.supported_extensions.iter().any(|e| *e == ext)
    }
}

fn check_unit(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value: value.to_string(),
            expected: "a value between 0.0 and 1.0",
        })
    }
}

/// `<config dir>/mediacull/config.json` for the current user.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_validate() {
        let config = AppConfig::default().validate().unwrap();
        assert_eq!(config.image_similarity_threshold, 0.90);
        assert_eq!(config.video_similarity_threshold, 0.85);
        assert_eq!(config.auto_selection_confidence_threshold, 0.80);
        assert!(config.is_supported_extension("JPG"));
        assert!(config.is_supported_extension(".mov"));
        assert!(!config.is_supported_extension(".txt"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "image_similarity_threshold": 0.95, "supported_extensions": ["JPG", ".Png"] }"#,
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.image_similarity_threshold, 0.95);
        assert_eq!(config.video_similarity_threshold, 0.85);
        assert_eq!(config.supported_extensions, vec![".jpg", ".png"]);
        assert_eq!(config.selection_weights, SelectionWeights::default());
    }

    #[test]
    fn test_out_of_range_rejected() {
        let config = AppConfig {
            video_similarity_threshold: 1.5,
            ..AppConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "video_similarity_threshold",
                ..
            }
        ));
    }

    #[test]
    fn test_small_visual_group_size_rejected() {
        let config = AppConfig {
            max_visual_group_size: 1,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            AppConfig::load(Some(&path)),
            Err(ConfigError::Parse(_))
        ));
    }
}
