//! Provider directory configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectoryConfig {
    /// JSON or YAML directory file; the built-in seed directory when unset
    pub path: Option<PathBuf>,
}

impl DirectoryConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        match path.extension().and_then(|e| e.to_str()) {
            Some("json" | "yaml" | "yml") => Ok(()),
            _ => Err(ValidationError::InvalidDirectoryFormat),
        }
    }
}
