use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context, Result};
use json_pretty_compact::PrettyCompactFormatter;
use log::info;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Serializer;

use crate::{collision::CollisionMap, export};

pub fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    info!("Saving {}", path.display());
    let formatter = PrettyCompactFormatter::new();
    let mut data_bytes = vec![];
    let mut ser = Serializer::with_formatter(&mut data_bytes, formatter);
    data.serialize(&mut ser)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &data_bytes)?;
    Ok(())
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    info!("Loading {}", path.display());
    let data_bytes =
        fs::read(path).with_context(|| format!("Unable to read {}", path.display()))?;
    let data: T = serde_json::from_slice(&data_bytes)
        .with_context(|| format!("Unable to parse {}", path.display()))?;
    Ok(data)
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CollisionProject {
    pub image: PathBuf,
    pub collisions: CollisionMap,
}

pub fn collision_project_path(image: &Path) -> PathBuf {
    let mut name = image.file_name().unwrap_or_default().to_owned();
    name.push(".collisions.json");
    image.with_file_name(name)
}

pub fn save_collision_project(project: &CollisionProject) -> Result<()> {
    save_json(&collision_project_path(&project.image), project)
}

/// Load the collision project stored next to `image`, if one exists.
pub fn load_collision_project(image: &Path) -> Result<Option<CollisionProject>> {
    let path = collision_project_path(image);
    if !path.exists() {
        return Ok(None);
    }
    let project: CollisionProject = load_json(&path)?;
    ensure!(
        project.collisions.is_consistent(),
        "{} holds malformed collision data",
        path.display()
    );
    Ok(Some(project))
}

/// Write `<name>_colliders.h` into `out_dir` and return its path.
pub fn export_colliders(
    image: &Path,
    collisions: &CollisionMap,
    out_dir: &Path,
) -> Result<PathBuf> {
    let name = export::array_name(image);
    let source = export::colliders_source(&name, collisions.flags(), collisions.cols());
    let path = out_dir.join(format!("{name}_colliders.h"));
    info!("Saving {}", path.display());
    fs::create_dir_all(out_dir)?;
    fs::write(&path, source)?;
    Ok(path)
}
