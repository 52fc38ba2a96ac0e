//! Subcommands of the `vypiska` binary.

pub mod batch;
pub mod config;
pub mod parse;

use std::path::Path;

use tracing::debug;
use vypiska_core::VypiskaConfig;

/// Configuration from `--config`, else the user config file, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<VypiskaConfig> {
    if let Some(path) = config_path {
        return Ok(VypiskaConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(VypiskaConfig::from_file(&default_path)?)
    } else {
        Ok(VypiskaConfig::default())
    }
}
