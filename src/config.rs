use std::{collections::HashMap, env, fs, path::PathBuf};

use chrono::NaiveDate;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use directories::ProjectDirs;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::core::models::{FilterableField, ModelConfig};
use crate::core::types::Combinator;

const CONFIG: &str = include_str!("../.config/config.json5");

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub config_dir: PathBuf,
}

/// Behaviour of the filter box itself
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSettings {
    /// Combinator preselected on every non-first row of a field
    #[serde(default)]
    pub default_combinator: Combinator,
    /// Reference day for `today`, `yesterday` and the week shortcuts
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            default_combinator: Combinator::And,
            today: None,
        }
    }
}

/// Model definition as written in config files
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDefinition {
    #[serde(default)]
    pub fields: Vec<FilterableField>,
    /// Columns shown in the result list; every field when empty
    #[serde(default)]
    pub list_columns: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    #[serde(default)]
    pub filters: FilterSettings,
    #[serde(default)]
    pub models: HashMap<String, ModelDefinition>,
}

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref DATA_FOLDER: Option<PathBuf> =
        env::var(format!("{}_DATA", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
    pub static ref CONFIG_FOLDER: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
}

impl Config {
    /// Embedded defaults only
    pub fn embedded() -> Result<Self> {
        json5::from_str(CONFIG).map_err(|e| eyre!("Invalid embedded config: {e}"))
    }

    /// Load the embedded defaults, then layer the given file (or the one in the
    /// config dir, when present) on top
    pub fn from_path(config_path: Option<&PathBuf>) -> Result<Self> {
        let data_dir = get_data_dir();
        let config_dir = get_config_dir();
        let mut builder = config::Config::builder()
            .set_default("data_dir", data_dir.to_string_lossy().to_string())?
            .set_default("config_dir", config_dir.to_string_lossy().to_string())?
            .add_source(config::File::from_str(CONFIG, config::FileFormat::Json5));

        let selected = match config_path {
            Some(p) => Some((expand_tilde(p), true)),
            None => {
                let default_path = config_dir.join("config.json5");
                default_path.exists().then_some((default_path, false))
            }
        };
        if let Some((path, required)) = selected {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Json5)
                    .required(required),
            );
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        Ok(cfg)
    }

    /// Field configuration of a model
    pub fn model(&self, name: &str) -> Option<ModelConfig> {
        let definition = self.models.get(name)?;
        Some(
            definition
                .fields
                .iter()
                .cloned()
                .fold(ModelConfig::new(name), ModelConfig::with_field),
        )
    }

    /// Result list columns of a model
    pub fn list_columns(&self, name: &str) -> Vec<String> {
        match self.models.get(name) {
            Some(definition) if !definition.list_columns.is_empty() => definition.list_columns.clone(),
            Some(definition) => definition.fields.iter().map(|f| f.name.clone()).collect(),
            None => Vec::new(),
        }
    }

    /// Write the embedded defaults to the config dir when no file exists yet
    pub fn write_default(path: &PathBuf) -> Result<()> {
        if path.exists() {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, CONFIG)?;
        Ok(())
    }
}

fn expand_tilde(path: &PathBuf) -> PathBuf {
    let s = path.to_string_lossy();
    if let Some(stripped) = s.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|b| b.home_dir().to_path_buf()) {
            return home.join(stripped);
        }
    }
    path.clone()
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("io", "filterbox", env!("CARGO_PKG_NAME"))
}

pub fn get_data_dir() -> PathBuf {
    if let Some(s) = DATA_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

pub fn get_config_dir() -> PathBuf {
    if let Some(s) = CONFIG_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}
