use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context, Result};
use log::{error, info, warn};

use crate::{
    common::ENCODED_TILE_LEN,
    dedup::{dedupe_and_map, map_blob, sprite_data_blob, tile_data_blob},
    error::ConvertError,
    export,
    grid::PixelGrid,
    image::load_grid,
    palette::{detect_kind, ColorCodeMap, FallbackStats, ImageKind, PixelEncoding},
};

#[derive(Clone, Debug, Default)]
pub struct ConvertOptions {
    pub kind: Option<ImageKind>, // None: detect from the pixels
    pub offset: usize,
    pub strict_colors: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub contents: String,
}

#[derive(Debug)]
pub struct Conversion {
    pub name: String,
    pub kind: ImageKind,
    pub tile_count: usize,
    pub artifacts: Vec<Artifact>,
    pub fallbacks: FallbackStats,
}

/// Build every artifact for `grid` in memory. Nothing is written.
pub fn convert_grid(
    grid: &PixelGrid,
    encoding: PixelEncoding,
    name: &str,
    options: &ConvertOptions,
) -> Result<Conversion, ConvertError> {
    let kind = options.kind.unwrap_or_else(|| detect_kind(grid, encoding));
    let code_map = ColorCodeMap::builtin(kind, encoding).with_strict(options.strict_colors);
    let mut fallbacks = FallbackStats::default();

    let (tile_count, artifacts) = match kind {
        ImageKind::Sprite => {
            let data = sprite_data_blob(grid, &code_map, &mut fallbacks)?;
            let artifacts = vec![Artifact {
                file_name: format!("{name}.h"),
                contents: export::sprite_source(name, &data),
            }];
            (data.len() / ENCODED_TILE_LEN, artifacts)
        }
        ImageKind::Background => {
            let (unique, index_map) = dedupe_and_map(grid)?;
            // Both blobs must succeed before anything is handed out.
            let map = map_blob(&index_map, options.offset)?;
            let data = tile_data_blob(&unique, &code_map, &mut fallbacks)?;
            let artifacts = vec![
                Artifact {
                    file_name: format!("{name}_tiles.h"),
                    contents: export::tile_data_source(name, &data),
                },
                Artifact {
                    file_name: format!("{name}_map.h"),
                    contents: export::map_source(
                        name,
                        &map,
                        index_map.stride(),
                        unique.len(),
                    ),
                },
            ];
            (unique.len(), artifacts)
        }
    };

    if !fallbacks.is_empty() {
        warn!(
            "{}: {} pixel(s) with unmapped values {:?}; the palette may have been misdetected",
            name,
            fallbacks.total,
            fallbacks.values()
        );
    }

    Ok(Conversion {
        name: name.to_string(),
        kind,
        tile_count,
        artifacts,
        fallbacks,
    })
}

pub fn convert_file(
    path: &Path,
    name: Option<&str>,
    options: &ConvertOptions,
) -> Result<Conversion> {
    let (grid, encoding) = load_grid(path)?;
    let name = match name {
        Some(n) => n.to_string(),
        None => export::array_name(path),
    };
    let conversion = convert_grid(&grid, encoding, &name, options)
        .with_context(|| format!("Unable to convert {}", path.display()))?;
    info!(
        "{}: {:?}, {} tile(s) from a {}x{} image",
        path.display(),
        conversion.kind,
        conversion.tile_count,
        grid.width(),
        grid.height()
    );
    Ok(conversion)
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_owned();
    name.push(suffix);
    path.with_file_name(name)
}

fn temp_path(path: &Path) -> PathBuf {
    sibling_path(path, ".tmp")
}

fn backup_path(path: &Path) -> PathBuf {
    sibling_path(path, ".bak")
}

fn check_destinations(paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        if let Ok(meta) = fs::symlink_metadata(path) {
            ensure!(
                meta.is_file(),
                "Unable to write {}: it exists and is not a file",
                path.display()
            );
        }
    }
    Ok(())
}

fn stage(artifacts: &[Artifact], paths: &[PathBuf], staged: &mut Vec<PathBuf>) -> Result<()> {
    for (artifact, path) in artifacts.iter().zip(paths) {
        let tmp = temp_path(path);
        staged.push(tmp.clone());
        fs::write(&tmp, &artifact.contents)
            .with_context(|| format!("Unable to write {}", tmp.display()))?;
    }
    Ok(())
}

// Each committed destination remembers where its previous contents went.
struct Committed {
    path: PathBuf,
    backup: Option<PathBuf>,
}

fn commit(staged: &[PathBuf], paths: &[PathBuf], committed: &mut Vec<Committed>) -> Result<()> {
    for (tmp, path) in staged.iter().zip(paths) {
        let backup = if path.is_file() {
            let bak = backup_path(path);
            fs::rename(path, &bak)
                .with_context(|| format!("Unable to back up {}", path.display()))?;
            Some(bak)
        } else {
            None
        };
        committed.push(Committed {
            path: path.clone(),
            backup,
        });
        fs::rename(tmp, path).with_context(|| format!("Unable to write {}", path.display()))?;
    }
    Ok(())
}

fn rollback(committed: &[Committed]) {
    for entry in committed.iter().rev() {
        if entry.path.is_file() {
            let _ = fs::remove_file(&entry.path);
        }
        if let Some(bak) = &entry.backup {
            if let Err(e) = fs::rename(bak, &entry.path) {
                error!("Unable to restore {}: {}", entry.path.display(), e);
            }
        }
    }
}

/// Write all artifacts into `out_dir`, or none of them: every artifact is
/// first written to a temporary sibling and only renamed into place once
/// all writes succeeded. A failed rename puts back whatever was there before.
pub fn write_artifacts(artifacts: &[Artifact], out_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Unable to create {}", out_dir.display()))?;
    let paths: Vec<PathBuf> = artifacts
        .iter()
        .map(|a| out_dir.join(&a.file_name))
        .collect();
    check_destinations(&paths)?;

    let mut staged: Vec<PathBuf> = vec![];
    let mut committed: Vec<Committed> = vec![];
    let result = stage(artifacts, &paths, &mut staged)
        .and_then(|()| commit(&staged, &paths, &mut committed));
    if let Err(e) = result {
        rollback(&committed);
        for tmp in &staged {
            let _ = fs::remove_file(tmp);
        }
        return Err(e);
    }
    for entry in &committed {
        if let Some(bak) = &entry.backup {
            let _ = fs::remove_file(bak);
        }
    }
    for path in &paths {
        info!("Saved {}", path.display());
    }
    Ok(paths)
}
