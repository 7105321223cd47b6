//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use labscan_extractor::{Catalog, ExtractorConfig};
use labscan_ocr::vision::{DEFAULT_ENDPOINT, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS};
use labscan_ocr::VisionProvider;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Output settings
    #[serde(default)]
    pub settings: Settings,

    /// Cloud Vision connection
    #[serde(default)]
    pub vision: VisionSettings,

    /// Catalog extensions
    #[serde(default)]
    pub catalog: CatalogSettings,

    /// Extraction tuning
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Cloud Vision settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionSettings {
    /// `images:annotate` endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// API key; the `--api-key` flag and `LABSCAN_VISION_API_KEY` take precedence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per document
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Catalog settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// TOML file of extra or replacement biomarker rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<PathBuf>,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".labscan").join("config.toml"))
    }

    /// Load configuration from the default path, or defaults if it is missing.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.extractor.validate()?;
        Ok(config)
    }

    /// Build the biomarker catalog, applying extensions when configured.
    pub fn build_catalog(&self) -> Result<Catalog> {
        let catalog = match &self.catalog.extensions {
            Some(path) => Catalog::from_file(path)?,
            None => Catalog::builtin()?,
        };
        Ok(catalog)
    }

    /// Build a Vision provider, preferring `api_key` over the configured key.
    pub fn vision_provider(&self, api_key: Option<String>) -> Result<VisionProvider> {
        let key = api_key
            .or_else(|| self.vision.api_key.clone())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                CliError::Config(
                    "No Vision API key. Pass --api-key, set LABSCAN_VISION_API_KEY, or add [vision] api_key".into(),
                )
            })?;

        Ok(VisionProvider::with_endpoint(&self.vision.endpoint, key)
            .with_timeout(Duration::from_secs(self.vision.timeout_secs))
            .with_max_retries(self.vision.max_retries))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

impl Default for VisionSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.settings.color);
        assert_eq!(config.settings.format, OutputFormat::Table);
        assert_eq!(config.vision.endpoint, DEFAULT_ENDPOINT);
        assert!(config.catalog.extensions.is_none());
        assert_eq!(config.extractor, ExtractorConfig::default());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [settings]
            format = "json"

            [vision]
            api_key = "from-file"

            [extractor]
            ocr_correction = false
            "#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.settings.format, OutputFormat::Json);
        assert!(config.settings.color);
        assert_eq!(config.vision.api_key.as_deref(), Some("from-file"));
        assert_eq!(config.vision.max_retries, DEFAULT_MAX_RETRIES);
        assert!(!config.extractor.ocr_correction);
        assert!(config.extractor.entity_recognition);
    }

    #[test]
    fn test_load_rejects_invalid_extractor_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[extractor]\nfacility_min_len = 50\nfacility_max_len = 10\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(CliError::Extractor(_))));
    }

    #[test]
    fn test_build_catalog_with_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extra.toml");
        fs::write(
            &path,
            r#"
            [[biomarkers]]
            name = "ferritin"
            synonyms = ["ferritin"]
            units = ["ng/ml"]
            canonical_unit = "ng/mL"
            range = "20-250"
            min = 20.0
            max = 250.0
            "#,
        )
        .unwrap();

        let mut config = Config::default();
        let builtin = config.build_catalog().unwrap();
        assert!(!builtin.contains("ferritin"));

        config.catalog.extensions = Some(path);
        let extended = config.build_catalog().unwrap();
        assert!(extended.contains("ferritin"));
        assert_eq!(extended.len(), builtin.len() + 1);
    }

    #[test]
    fn test_vision_provider_requires_key() {
        let mut config = Config::default();
        assert!(matches!(config.vision_provider(None), Err(CliError::Config(_))));
        assert!(config.vision_provider(Some("flag-key".into())).is_ok());

        config.vision.api_key = Some("file-key".into());
        assert!(config.vision_provider(None).is_ok());
    }
}
