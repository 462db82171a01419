use std::path::Path;

use serde::{Deserialize, Serialize};
use whoami::realname;

use crate::error::{Error, Result};

/// Site-level settings stored as `Portfolio.toml` at the workspace
/// root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioManifest {
    name: String,
    author: String,
    #[serde(default)]
    description: String,
}

impl PortfolioManifest {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            author: realname(),
            description: String::new(),
        }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(Error::InvalidManifest)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.export())?;
        Ok(())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    #[must_use]
    pub fn export(&self) -> String {
        // Serialization of the manifest never fails, so we can use
        // `unwrap` silently.
        toml::to_string_pretty(self).unwrap()
    }
}

impl Default for PortfolioManifest {
    fn default() -> Self {
        Self::new("Portfolio")
    }
}
