use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::persist::{load_json, save_json};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct GlobalConfig {
    #[serde(skip_serializing, skip_deserializing)]
    pub modified: bool,
    // Added to every map entry, e.g. to skip past a font loaded first.
    pub map_offset: usize,
    pub strict_colors: bool,
    pub output_dir: Option<PathBuf>,
    pub pixel_size: f32,
    pub grid_alpha: f32,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        GlobalConfig {
            modified: false,
            map_offset: 0,
            strict_colors: false,
            output_dir: None,
            pixel_size: 3.0,
            grid_alpha: 0.35,
        }
    }
}

pub fn get_global_config_path() -> Result<PathBuf> {
    let project_dirs = directories::ProjectDirs::from("", "", "GbTileTools")
        .context("Unable to open global config directory.")?;
    let config_dir = project_dirs.config_dir();
    let config_path = config_dir.join("config.json");
    Ok(config_path)
}

pub fn load_global_config(path: &Path) -> Result<GlobalConfig> {
    if !path.exists() {
        return Ok(GlobalConfig::default());
    }
    load_json(path)
}

pub fn save_global_config(path: &Path, config: &mut GlobalConfig) -> Result<()> {
    if config.modified {
        save_json(path, config)?;
        config.modified = false;
    }
    Ok(())
}
