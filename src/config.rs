//! # Configuration Module
//!
//! The engine needs exactly two pieces of configuration: where the beets
//! catalog file lives and which date column family to read. Both arrive
//! from the CLI (or its environment variables); this module supplies the
//! platform default for the catalog location and normalizes user-supplied
//! paths.
//!
//! ## Default catalog location
//!
//! beets keeps its library database in the platform config directory:
//! - Linux: `~/.config/beets/library.db`
//! - macOS: `~/Library/Application Support/beets/library.db`
//! - Windows: `%APPDATA%\beets\library.db`

use anyhow::{Context, Result};
use path_absolutize::Absolutize;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the beets catalog file.
    pub library: PathBuf,
    /// Read `original_year`/`original_month`/`original_day` instead of
    /// the plain release date columns.
    pub use_original_release_date: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            library: default_library_path().unwrap_or_else(|_| PathBuf::from("library.db")),
            use_original_release_date: false,
        }
    }
}

impl Config {
    /// Build a config from CLI inputs, falling back to the platform
    /// default catalog location. Relative paths are absolutized so the
    /// engine always logs and errors with a full path.
    pub fn resolve(library: Option<&Path>, use_original_release_date: bool) -> Result<Self> {
        let library = match library {
            Some(path) => path
                .absolutize()
                .with_context(|| format!("Could not absolutize {}", path.display()))?
                .into_owned(),
            None => default_library_path()?,
        };
        Ok(Self {
            library,
            use_original_release_date,
        })
    }
}

/// The platform-default beets library location.
pub fn default_library_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine the system configuration directory"))?;
    Ok(config_dir.join("beets").join("library.db"))
}
