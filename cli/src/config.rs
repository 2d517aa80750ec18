use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming the HVSC root.
pub const ROOT_ENV: &str = "HVSC_ROOT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file at {}: {source}", config_path.display())]
    Read {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file at {}: {source}", config_path.display())]
    Parse {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error(
        "no HVSC root: pass --root, set HVSC_ROOT, or add `hvsc_root` to {}",
        config_path.display()
    )]
    NoRoot { config_path: PathBuf },
}

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    pub hvsc_root: Option<PathBuf>,
}

impl Config {
    /// Load a config file. A missing file is `Ok(None)`.
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }
        Self::read(config_path).map(Some)
    }

    fn read(config_path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            config_path: config_path.to_path_buf(),
            source,
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            config_path: config_path.to_path_buf(),
            source,
        })?;

        config.hvsc_root = config.hvsc_root.map(|root| expand_path(&root).unwrap_or(root));
        Ok(config)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/hvsc");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }
}

/// Pick the HVSC root from the command line, the environment or a config
/// file, in that order. An explicitly named config file must exist.
pub fn resolve_root(
    flag: Option<&Path>,
    env: Option<OsString>,
    config_file: Option<&Path>,
) -> Result<PathBuf, ConfigError> {
    if let Some(root) = flag {
        return Ok(expand_path(root).unwrap_or_else(|| root.to_path_buf()));
    }
    if let Some(root) = env.filter(|value| !value.is_empty()) {
        let root = PathBuf::from(root);
        return Ok(expand_path(&root).unwrap_or(root));
    }

    let (config_path, config) = match config_file {
        Some(path) => (path.to_path_buf(), Some(Config::read(path)?)),
        None => {
            let path = Config::config_path();
            let config = Config::load_from_path(&path)?;
            (path, config)
        }
    };
    log::debug!("reading HVSC root from '{}'", config_path.display());

    config
        .and_then(|config| config.hvsc_root)
        .ok_or(ConfigError::NoRoot { config_path })
}

fn expand_path(path: &Path) -> Option<PathBuf> {
    let path_str = path.to_string_lossy();
    match shellexpand::full(&path_str) {
        Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
        Err(_) => None,
    }
}
