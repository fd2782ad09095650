//! Layered configuration
//!
//! Settings are merged from, in increasing precedence: built-in defaults, the
//! user config file, a `pyflat.toml` in the working directory, an explicit
//! `--config` file, `PYFLAT_*` environment variables and finally command-line
//! flags (applied by the binary).

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use etcetera::{BaseStrategy, choose_base_strategy};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::stdlib_detection::{DEFAULT_PYTHON_MINOR, parse_target_version};

/// File name looked up in the user config directory and the working directory
pub const CONFIG_FILE_NAME: &str = "pyflat.toml";

/// Banner used when none is configured
pub const DEFAULT_BANNER: &str = r#""""
This file is GENERATED by pyflat from a multi-module project.
DO NOT MODIFY IT: edit the source modules instead, then re-run pyflat.
""""#;

/// Which external tool removes unused references from the finished bundle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PrunerKind {
    #[default]
    Autoflake,
    Ruff,
    None,
}

impl std::str::FromStr for PrunerKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "autoflake" => Ok(Self::Autoflake),
            "ruff" => Ok(Self::Ruff),
            "none" | "off" => Ok(Self::None),
            other => Err(anyhow!("unknown pruner `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory that bounds local module resolution; defaults to the entry file's directory
    pub project_root: Option<PathBuf>,
    /// Files whose definitions are emitted first, relative to the project root
    pub preload: Vec<PathBuf>,
    /// Imported names that suppress an external `from` import
    pub ignore_imports: Vec<String>,
    pub banner: String,
    /// Statements copied verbatim after the imports
    pub preamble: Option<String>,
    pub pruner: PrunerKind,
    /// Python version used for stdlib detection, e.g. `py310`
    pub target_version: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_root: None,
            preload: Vec::new(),
            ignore_imports: Vec::new(),
            banner: DEFAULT_BANNER.to_owned(),
            preamble: None,
            pruner: PrunerKind::default(),
            target_version: format!("py3{DEFAULT_PYTHON_MINOR}"),
        }
    }
}

impl Config {
    /// Load configuration from the standard locations
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut loader = ConfigLoader::from_environment()?;
        if let Some(path) = explicit {
            loader = loader.with_explicit_file(path);
        }
        loader.load()
    }

    /// Python 3 minor version derived from `target_version`
    pub fn python_minor(&self) -> Result<u8> {
        parse_target_version(&self.target_version)
            .ok_or_else(|| anyhow!("invalid target version `{}`", self.target_version))
    }

    /// The directory that bounds local resolution for the given entry file
    pub fn project_root_for(&self, entry: &Path) -> PathBuf {
        match &self.project_root {
            Some(root) => root.clone(),
            None => entry
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
        }
    }

    /// Preload files resolved against the project root, in configured order
    pub fn preload_paths(&self, project_root: &Path) -> Vec<PathBuf> {
        self.preload.iter().map(|p| project_root.join(p)).collect()
    }

    fn merge(&mut self, layer: PartialConfig) {
        if let Some(project_root) = layer.project_root {
            self.project_root = Some(project_root);
        }
        if let Some(preload) = layer.preload {
            self.preload = preload;
        }
        if let Some(ignore_imports) = layer.ignore_imports {
            self.ignore_imports = ignore_imports;
        }
        if let Some(banner) = layer.banner {
            self.banner = banner;
        }
        if let Some(preamble) = layer.preamble {
            self.preamble = Some(preamble);
        }
        if let Some(pruner) = layer.pruner {
            self.pruner = pruner;
        }
        if let Some(target_version) = layer.target_version {
            self.target_version = target_version;
        }
    }
}

/// One configuration layer; unset fields leave lower layers untouched
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    project_root: Option<PathBuf>,
    preload: Option<Vec<PathBuf>>,
    ignore_imports: Option<Vec<String>>,
    banner: Option<String>,
    preamble: Option<String>,
    pruner: Option<PrunerKind>,
    target_version: Option<String>,
}

impl PartialConfig {
    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    fn from_env() -> Result<Self> {
        let mut layer = Self::default();
        if let Ok(root) = std::env::var("PYFLAT_PROJECT_ROOT") {
            layer.project_root = Some(PathBuf::from(root));
        }
        if let Ok(preload) = std::env::var("PYFLAT_PRELOAD") {
            layer.preload = Some(split_list(&preload).map(PathBuf::from).collect());
        }
        if let Ok(ignored) = std::env::var("PYFLAT_IGNORE_IMPORTS") {
            layer.ignore_imports = Some(split_list(&ignored).map(str::to_owned).collect());
        }
        if let Ok(pruner) = std::env::var("PYFLAT_PRUNER") {
            layer.pruner = Some(pruner.parse().context("invalid PYFLAT_PRUNER")?);
        }
        if let Ok(version) = std::env::var("PYFLAT_TARGET_VERSION") {
            layer.target_version = Some(version);
        }
        Ok(layer)
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|item| !item.is_empty())
}

/// Locates and merges the configuration layers
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    user_config: Option<PathBuf>,
    project_dir: PathBuf,
    explicit: Option<PathBuf>,
}

impl ConfigLoader {
    /// Loader rooted at the current directory and the platform config directory
    pub fn from_environment() -> Result<Self> {
        let project_dir =
            std::env::current_dir().context("failed to determine the current directory")?;
        let user_config = choose_base_strategy().ok().map(|strategy| {
            strategy
                .config_dir()
                .join("pyflat")
                .join(CONFIG_FILE_NAME)
        });
        Ok(Self {
            user_config,
            project_dir,
            explicit: None,
        })
    }

    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            user_config: None,
            project_dir: project_dir.into(),
            explicit: None,
        }
    }

    #[must_use]
    pub fn with_user_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.user_config = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_explicit_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit = Some(path.into());
        self
    }

    pub fn load(&self) -> Result<Config> {
        let mut config = Config::default();

        if let Some(user_config) = &self.user_config
            && user_config.is_file()
        {
            debug!("Loading user config from {}", user_config.display());
            config.merge(PartialConfig::from_file(user_config)?);
        }

        let project_config = self.project_dir.join(CONFIG_FILE_NAME);
        if project_config.is_file() {
            debug!("Loading project config from {}", project_config.display());
            config.merge(PartialConfig::from_file(&project_config)?);
        }

        if let Some(explicit) = &self.explicit {
            debug!("Loading explicit config from {}", explicit.display());
            config.merge(PartialConfig::from_file(explicit)?);
        }

        config.merge(PartialConfig::from_env()?);

        // Fail early rather than during module classification
        config.python_minor()?;
        Ok(config)
    }
}
