//! Optional `addrlib.toml` defaults.
//!
//! ```toml
//! database = "SKSE/Plugins/version-1-5-97-0.bin"
//! executable = "SkyrimSE.exe"
//! source_dir = "CommonLibSSE"
//! image_base = 0x140000000
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use addrlib::DEFAULT_IMAGE_BASE;
use anyhow::{Context, Result, bail};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: Option<PathBuf>,
    pub executable: Option<PathBuf>,
    pub source_dir: Option<PathBuf>,
    pub image_base: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: None,
            executable: None,
            source_dir: None,
            image_base: DEFAULT_IMAGE_BASE,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn database(&self, arg: Option<PathBuf>) -> Result<PathBuf> {
        resolve_path(arg, self.database.as_ref(), "database", "--database")
    }

    pub fn executable(&self, arg: Option<PathBuf>) -> Result<PathBuf> {
        resolve_path(arg, self.executable.as_ref(), "executable", "--executable")
    }

    pub fn source_dir(&self, arg: Option<PathBuf>) -> Result<PathBuf> {
        resolve_path(arg, self.source_dir.as_ref(), "source_dir", "--source")
    }
}

/// Command line value first, then the config file
fn resolve_path(
    arg: Option<PathBuf>,
    configured: Option<&PathBuf>,
    key: &str,
    flag: &str,
) -> Result<PathBuf> {
    match arg.or_else(|| configured.cloned()) {
        Some(path) => Ok(path),
        None => bail!("No {} path given. Use {} or set `{}` in the config file", key, flag, key),
    }
}
