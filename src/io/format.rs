//! Route file formats.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::io::error::IoError;

/// Serialization format of a route file, picked from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// `.json` selects JSON; everything else is read as TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        }
    }

    pub fn parse<T: DeserializeOwned>(&self, file: &Path, content: &str) -> Result<T, IoError> {
        let parsed = match self {
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| IoError::Parse {
            file: file.to_path_buf(),
            message,
        })
    }

    pub fn render<T: Serialize>(&self, file: &Path, value: &T) -> Result<String, IoError> {
        let rendered = match self {
            ConfigFormat::Toml => toml::to_string_pretty(value).map_err(|e| e.to_string()),
            ConfigFormat::Json => serde_json::to_string_pretty(value).map_err(|e| e.to_string()),
        };
        rendered.map_err(|message| IoError::Render {
            file: file.to_path_buf(),
            message,
        })
    }
}
