use std::path::PathBuf;

use gb_tile_tools::common::TileCoord;

#[derive(Debug, Clone)]
pub enum Message {
    Event(iced::Event),
    OpenImageDialogue,
    ImageOpened(Option<PathBuf>),
    SaveProject,
    ExportColliders,
    ClearCollisions,
    SetCell {
        col: TileCoord,
        row: TileCoord,
        value: bool,
    },
    SetShowGrid(bool),
    ZoomIn,
    ZoomOut,
}
