//! Layered configuration.
//!
//! Values are merged from, lowest priority first:
//! 1. built-in defaults,
//! 2. a configuration file: either the one given explicitly, or
//!    `config.toml`/`config.yaml`/`config.json` in the platform configuration
//!    directory (whichever exist),
//! 3. environment variables prefixed `NAS_GALLERY_`, with `__` separating
//!    nested keys (`NAS_GALLERY_SHARE__ROOT=/mnt/photos`).

pub mod error;
mod models;

pub use crate::models::{CacheBackend, CacheConfig, CrawlConfig, RetrieveConfig, ShareConfig, StagingConfig};
use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::{OptionExt, ResultExt};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "NAS_GALLERY_";
const APPLICATION: &str = "nas-gallery";
const DEFAULT_FILES: [&str; 3] = ["config.toml", "config.yaml", "config.json"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub share: ShareConfig,
    pub cache: CacheConfig,
    pub staging: StagingConfig,
    pub crawl: CrawlConfig,
    pub retrieve: RetrieveConfig,
}

impl Config {
    /// Load and validate the configuration.
    ///
    /// An explicitly given file must exist; the default files are optional.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let files = match file {
            Some(file) if !file.is_file() => {
                exn::bail!(ErrorKind::Invalid(format!("config file `{}` does not exist", file.display())))
            },
            Some(file) => vec![file.to_path_buf()],
            None => Self::default_files(),
        };
        let config: Self = Self::figment(&files)?.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    /// Build the layered provider stack for the given files.
    pub fn figment(files: &[PathBuf]) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        for file in files {
            figment = match file.extension().and_then(|extension| extension.to_str()) {
                Some("toml") => figment.merge(Toml::file(file)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(file)),
                Some("json") => figment.merge(Json::file(file)),
                _ => exn::bail!(ErrorKind::Invalid(format!("unsupported config format `{}`", file.display()))),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APPLICATION)
    }

    fn default_files() -> Vec<PathBuf> {
        let Some(dirs) = Self::project_dirs() else {
            tracing::debug!("No home directory; only using defaults and environment for configuration");
            return Vec::new();
        };
        DEFAULT_FILES.iter().map(|name| dirs.config_dir().join(name)).collect()
    }

    pub fn validate(&self) -> Result<()> {
        if !self.share.root.is_absolute() {
            exn::bail!(ErrorKind::Invalid(format!("share.root `{}` must be absolute", self.share.root.display())));
        }
        if self.share.base_folder.split('/').any(|segment| segment == "..") {
            exn::bail!(ErrorKind::Invalid("share.base_folder must stay inside the share".to_string()));
        }
        let positive = [
            ("share.timeout", self.share.timeout as usize),
            ("crawl.max_folders", self.crawl.max_folders),
            ("crawl.concurrency", self.crawl.concurrency),
            ("retrieve.concurrency", self.retrieve.concurrency),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, value)| *value == 0) {
            exn::bail!(ErrorKind::Invalid(format!("{name} must be at least 1")));
        }
        Ok(())
    }

    /// Where snapshots are cached: the configured path, or a default location
    /// in the platform cache directory depending on the backend.
    pub fn cache_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.cache.path {
            return Ok(path.clone());
        }
        let dirs = Self::project_dirs().ok_or_raise(|| ErrorKind::NoHomeDirectory)?;
        Ok(match self.cache.backend {
            CacheBackend::Json => dirs.cache_dir().join("snapshots"),
            CacheBackend::Sqlite => dirs.cache_dir().join("catalog.sqlite"),
        })
    }
}
