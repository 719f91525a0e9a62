//! # thoth-config
//!
//! Layered configuration loading for Thoth using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`THOTH_*` prefix, `__` as separator)
//! 2. Project-level `.thoth/config.toml`
//! 3. User-level `~/.config/thoth/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `THOTH_INDEX__DB_PATH` -> `index.db_path`,
//! `THOTH_REGIONS__ALLOW_NESTING` -> `regions.allow_nesting`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use std::path::Path;
//! use thoth_config::ThothConfig;
//!
//! let config = ThothConfig::load(Path::new(".")).expect("config");
//! println!("index at {}", config.index.db_path);
//! ```

mod error;
mod general;
mod index;
mod pipeline;
mod regions;
mod symbols;

pub use error::ConfigError;
pub use general::GeneralConfig;
pub use index::IndexConfig;
pub use pipeline::PipelineConfig;
pub use regions::RegionConfig;
pub use symbols::SymbolConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ThothConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub regions: RegionConfig,
    #[serde(default)]
    pub symbols: SymbolConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl ThothConfig {
    /// Load configuration for the project rooted at `project_root`.
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source fails to parse or a value is out of range.
    pub fn load(project_root: &Path) -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment(project_root))
    }

    /// Load configuration after reading `.env` from the project root.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source fails to parse or a value is out of range.
    pub fn load_with_dotenv(project_root: &Path) -> Result<Self, ConfigError> {
        let _ = dotenvy::from_path(project_root.join(".env"));
        Self::load(project_root)
    }

    /// Extract and validate from an arbitrary figment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on extraction failure or invalid values.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can add providers on top.
    #[must_use]
    pub fn figment(project_root: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // Layer 2: Project-local config
        let local_path = project_root.join(".thoth").join("config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("THOTH_").split("__"))
    }

    /// Resolve the index database path against the project root.
    #[must_use]
    pub fn index_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.index.db_path)
    }

    /// Resolve the manifest path against the project root.
    #[must_use]
    pub fn manifest_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.general.manifest_path)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.regions.validate()?;
        self.symbols.validate()
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("thoth").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ThothConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.regions.allow_nesting);
        assert_eq!(config.pipeline.workers, 0);
    }

    #[test]
    fn paths_resolve_against_project_root() {
        let config = ThothConfig::default();
        let root = Path::new("/work/repo");
        assert_eq!(
            config.index_path(root),
            PathBuf::from("/work/repo/.thoth/index.db")
        );
        assert_eq!(
            config.manifest_path(root),
            PathBuf::from("/work/repo/.thoth/manifest.toml")
        );
    }
}
