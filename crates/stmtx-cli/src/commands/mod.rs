//! Subcommands.

pub mod batch;
pub mod config;
pub mod process;

use std::path::{Path, PathBuf};

use tracing::debug;

use stmtx_core::StmtxConfig;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stmtx")
        .join("config.json")
}

/// Resolve the config file in use: `-c` if given, otherwise the default path.
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    explicit
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path)
}

/// Load configuration from `-c`, the default file, or built-in defaults.
///
/// An explicit path must exist; the default file is optional.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<StmtxConfig> {
    if let Some(path) = explicit {
        return read_config(Path::new(path));
    }

    let path = default_config_path();
    if path.exists() {
        read_config(&path)
    } else {
        debug!("No config file at {}, using defaults", path.display());
        Ok(StmtxConfig::default())
    }
}

fn read_config(path: &Path) -> anyhow::Result<StmtxConfig> {
    debug!("Loading config from {}", path.display());
    StmtxConfig::from_file(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))
}
