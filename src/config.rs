use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ReplayError, Result};
use crate::version;

pub const DEFAULT_CONFIG_FILE: &str = "roa.toml";

#[derive(Debug, Clone, Deserialize)]
struct TomlConfig {
    #[serde(rename = "RivalsofAether")]
    rivals: TomlRivalsSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
struct TomlRivalsSection {
    path_to_replays: PathBuf,
    game_version: String,
    skip_folder_creation: Option<bool>,
    skip_backups: Option<bool>,
}

/// Validated settings from the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub path_to_replays: PathBuf,
    pub game_version: String,
    pub skip_folder_creation: bool,
    pub skip_backups: bool,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| ReplayError::ConfigUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, path)
    }

    pub fn parse(contents: &str, origin: &Path) -> Result<Self> {
        let invalid = |message: String| ReplayError::ConfigInvalid {
            path: origin.to_path_buf(),
            message,
        };
        let toml_config: TomlConfig =
            toml::from_str(contents).map_err(|e| invalid(e.to_string()))?;
        let section = toml_config.rivals;

        if section.path_to_replays.as_os_str().is_empty() {
            return Err(invalid("PathToReplays is empty".to_string()));
        }
        if version::version_to_token(&section.game_version).is_err() {
            return Err(invalid(format!(
                "GameVersion {:?} is not a dotted numeric version",
                section.game_version
            )));
        }

        Ok(Self {
            path_to_replays: section.path_to_replays,
            game_version: section.game_version,
            skip_folder_creation: section.skip_folder_creation.unwrap_or(false),
            skip_backups: section.skip_backups.unwrap_or(false),
        })
    }
}

/// Everything the manager needs, resolved from settings plus command-line overrides.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    pub replays_path: PathBuf,
    pub destination_root: Option<PathBuf>,
    pub game_version: String,
    pub skip_folder_creation: bool,
    pub skip_backups: bool,
}

impl ManagerConfig {
    pub fn from_settings(
        settings: &Settings,
        replays_override: Option<PathBuf>,
        destination_override: Option<PathBuf>,
    ) -> Self {
        Self {
            replays_path: replays_override.unwrap_or_else(|| settings.path_to_replays.clone()),
            destination_root: destination_override,
            game_version: settings.game_version.clone(),
            skip_folder_creation: settings.skip_folder_creation,
            skip_backups: settings.skip_backups,
        }
    }

    pub fn with_skip_backups(mut self, skip: bool) -> Self {
        self.skip_backups = skip;
        self
    }

    pub fn destination_root(&self) -> &Path {
        self.destination_root
            .as_deref()
            .unwrap_or(&self.replays_path)
    }
}
