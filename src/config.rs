//! Engine settings.
//!
//! Defaults suit the two built-in forms. A JSON file may override any
//! subset, and `CLAIMFILL_ASSETS` / `CLAIMFILL_OUTPUT` override the two
//! directories last.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::attachment::DEFAULT_LIMIT_BYTES;
use crate::error::ClaimError;
use crate::image_loader::DEFAULT_JPEG_QUALITY;
use crate::model::PageSize;

pub const ASSETS_ENV: &str = "CLAIMFILL_ASSETS";
pub const OUTPUT_ENV: &str = "CLAIMFILL_OUTPUT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Directory holding the blank template PDFs.
    pub assets_dir: PathBuf,
    /// Where `fill` writes the finished document.
    pub output_dir: PathBuf,
    pub attachment_limit_bytes: u64,
    pub jpeg_quality: u8,
    /// Page size for image receipts.
    pub attachment_page: PageSize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets"),
            output_dir: PathBuf::from("."),
            attachment_limit_bytes: DEFAULT_LIMIT_BYTES,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            attachment_page: PageSize::LETTER,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, ClaimError> {
        serde_json::from_str(json).map_err(|e| ClaimError::config("config", e))
    }

    /// Read the optional config file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ClaimError> {
        let mut config = match path {
            Some(path) => {
                debug!(path = %path.display(), "reading config");
                Self::from_json(&std::fs::read_to_string(path)?)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply directory overrides from `lookup` (the environment in
    /// production). Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(ASSETS_ENV).filter(|v| !v.is_empty()) {
            self.assets_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(OUTPUT_ENV).filter(|v| !v.is_empty()) {
            self.output_dir = PathBuf::from(dir);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.attachment_limit_bytes, 25 * 1024 * 1024);
        assert_eq!(config.jpeg_quality, 80);
        assert_eq!(config.attachment_page, PageSize { width: 612.0, height: 792.0 });
        assert_eq!(config.assets_dir, PathBuf::from("assets"));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{ "jpegQuality": 60, "outputDir": "out" }"#).unwrap();
        assert_eq!(config.jpeg_quality, 60);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.attachment_limit_bytes, DEFAULT_LIMIT_BYTES);
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let err = EngineConfig::from_json(r#"{ "jpegQuality": "high" }"#).unwrap_err();
        assert!(matches!(err, ClaimError::Config { what: "config", .. }));
    }

    #[test]
    fn test_overrides() {
        let mut config = EngineConfig::default();
        config.apply_overrides(|key| match key {
            ASSETS_ENV => Some("/srv/forms".to_string()),
            OUTPUT_ENV => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.assets_dir, PathBuf::from("/srv/forms"));
        assert_eq!(config.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("claimfill.json");
        std::fs::write(&path, r#"{ "attachmentLimitBytes": 1024 }"#).unwrap();
        let config = EngineConfig::load(Some(&path)).unwrap();
        assert_eq!(config.attachment_limit_bytes, 1024);
    }
}
