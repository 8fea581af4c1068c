use std::path::PathBuf;

use anyhow::{Context, Result};
use gb_tile_tools::{
    collision::CollisionMap,
    common::{TILE_HEIGHT, TILE_WIDTH},
    config::{get_global_config_path, load_global_config, save_global_config, GlobalConfig},
    image::{load_rgba, RgbaImage},
    persist::{
        export_colliders, load_collision_project, save_collision_project, CollisionProject,
    },
};
use iced::Task;
use log::{error, info, warn};

use crate::message::Message;

pub struct EditorState {
    pub global_config_path: PathBuf,
    pub global_config: GlobalConfig,

    // Project data:
    pub image_path: Option<PathBuf>,
    pub image: Option<RgbaImage>,
    pub collisions: CollisionMap,
    pub modified: bool,

    // Temporary editor state:
    pub show_grid: bool,
    pub status: String,
}

impl EditorState {
    pub fn open_image(&mut self, path: PathBuf) -> Result<()> {
        let image = load_rgba(&path)?;
        let cols = image.width as usize / TILE_WIDTH;
        let rows = image.height as usize / TILE_HEIGHT;
        if image.width as usize % TILE_WIDTH != 0 || image.height as usize % TILE_HEIGHT != 0 {
            warn!(
                "{} is {}x{}, partial tiles at the edges are ignored",
                path.display(),
                image.width,
                image.height
            );
        }
        self.collisions = match load_collision_project(&path)? {
            Some(project)
                if (project.collisions.cols(), project.collisions.rows()) == (cols, rows) =>
            {
                project.collisions
            }
            Some(_) => {
                warn!("Saved collisions do not match the image size, starting over");
                CollisionMap::new(cols, rows)
            }
            None => CollisionMap::new(cols, rows),
        };
        self.status = format!("{} ({}x{} tiles)", path.display(), cols, rows);
        self.image = Some(image);
        self.image_path = Some(path);
        self.modified = false;
        Ok(())
    }

    pub fn save_project(&mut self) -> Result<()> {
        let image = self.image_path.clone().context("No image opened.")?;
        save_collision_project(&CollisionProject {
            image,
            collisions: self.collisions.clone(),
        })?;
        self.modified = false;
        Ok(())
    }

    pub fn export_colliders(&mut self) -> Result<PathBuf> {
        let image = self.image_path.as_ref().context("No image opened.")?;
        let out_dir = match &self.global_config.output_dir {
            Some(dir) => dir.clone(),
            None => image
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default(),
        };
        export_colliders(image, &self.collisions, &out_dir)
    }

    pub fn set_pixel_size(&mut self, pixel_size: f32) {
        self.global_config.pixel_size = pixel_size.clamp(1.0, 8.0);
        self.global_config.modified = true;
        if let Err(e) = save_global_config(&self.global_config_path, &mut self.global_config) {
            error!("Error saving config: {}", e);
        }
    }
}

pub fn get_initial_state(image: Option<PathBuf>) -> Result<EditorState> {
    let global_config_path = get_global_config_path()?;
    let global_config = load_global_config(&global_config_path)?;
    let mut editor_state = EditorState {
        global_config_path,
        global_config,
        image_path: None,
        image: None,
        collisions: CollisionMap::default(),
        modified: false,
        show_grid: true,
        status: "Open a background image to start.".to_string(),
    };
    if let Some(path) = image {
        editor_state.open_image(path)?;
    }
    Ok(editor_state)
}

pub fn initial_state(image: Option<PathBuf>) -> (EditorState, Task<Message>) {
    match get_initial_state(image) {
        Ok(state) => (state, Task::none()),
        Err(e) => {
            error!("Error loading initial state: {:#}", e);
            info!("Continuing with default settings");
            let state = EditorState {
                global_config_path: PathBuf::new(),
                global_config: GlobalConfig::default(),
                image_path: None,
                image: None,
                collisions: CollisionMap::default(),
                modified: false,
                show_grid: true,
                status: format!("{:#}", e),
            };
            (state, Task::none())
        }
    }
}
