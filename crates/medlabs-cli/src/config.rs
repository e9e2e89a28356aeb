//! Layered CLI configuration.
//!
//! Precedence, lowest first: built-in defaults, TOML file, environment,
//! command-line flags. Flags are applied by the commands themselves.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use medlabs_map::DEFAULT_STANDARD_VERSION;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const CONFIG_ENV: &str = "MEDLABS_CONFIG";
pub const PANEL_ENV: &str = "MEDLABS_PANEL";
pub const SCHEMA_DIR_ENV: &str = "MEDLABS_SCHEMA_DIR";
pub const DEFAULT_CONFIG_FILE: &str = "medlabs.toml";
pub const DEFAULT_PANEL: &str = "CBC";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractorKind {
    #[default]
    Regex,
    StructuredJson,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MedlabsConfig {
    /// Panel used when `--panel` is not given.
    pub panel: String,
    pub standard_version: String,
    /// Directory of schema documents replacing the bundled set.
    pub schema_dir: Option<PathBuf>,
    pub extractor: ExtractorKind,
}

impl Default for MedlabsConfig {
    fn default() -> Self {
        Self {
            panel: DEFAULT_PANEL.to_string(),
            standard_version: DEFAULT_STANDARD_VERSION.to_string(),
            schema_dir: None,
            extractor: ExtractorKind::default(),
        }
    }
}

impl MedlabsConfig {
    /// Loads from the process environment and the working directory.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_with(
            explicit,
            |key| std::env::var(key).ok(),
            Path::new(DEFAULT_CONFIG_FILE),
        )
    }

    /// Loads with an injectable environment lookup and implicit file path.
    ///
    /// A file named by `explicit` or `MEDLABS_CONFIG` must exist and parse;
    /// `implicit` is only read when present.
    pub fn load_with<F>(explicit: Option<&Path>, env: F, implicit: &Path) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| non_blank(env(CONFIG_ENV)).map(PathBuf::from));

        let mut config = match named {
            Some(path) => Self::from_file(&path)?,
            None if implicit.is_file() => Self::from_file(implicit)?,
            None => Self::default(),
        };
        config.apply_env(&env);
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("parse config {}", path.display()))?;
        debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    fn apply_env<F>(&mut self, env: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(panel) = non_blank(env(PANEL_ENV)) {
            self.panel = panel;
        }
        if let Some(dir) = non_blank(env(SCHEMA_DIR_ENV)) {
            self.schema_dir = Some(PathBuf::from(dir));
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
