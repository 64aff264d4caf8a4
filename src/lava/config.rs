use crate::error::{LavaError, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "lava.json";

/// Runtime settings handed to the API. Nothing in the library looks at the
/// environment; the CLI fills this in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LavaConfig {
    /// JSON file holding cached parameter values.
    pub store_path: PathBuf,

    /// Ask for every parameter even when a cached value exists.
    pub force_interactive: bool,
}

impl LavaConfig {
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: store_path.into(),
            force_interactive: false,
        }
    }

    pub fn with_force_interactive(mut self, force: bool) -> Self {
        self.force_interactive = force;
        self
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }
}

/// `lava.json` in the per-user configuration directory.
pub fn default_store_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("org", "linaro", "lava").ok_or_else(|| {
        LavaError::Configuration("could not determine the user configuration directory".into())
    })?;
    Ok(dirs.config_dir().join(CONFIG_FILENAME))
}
