mod grid;

use std::path::PathBuf;

use grid::collision_grid_view;
use iced::{
    alignment::Vertical,
    widget::{button, checkbox, column, horizontal_space, row, text},
    Element,
};
use iced_fonts::BOOTSTRAP_FONT;

use crate::{message::Message, state::EditorState};

pub async fn open_image() -> Option<PathBuf> {
    let picked_file = rfd::AsyncFileDialog::new()
        .set_title("Select a background image ...")
        .add_filter("PNG image", &["png"])
        .pick_file()
        .await;
    picked_file.map(|x| x.path().to_owned())
}

fn toolbar(state: &EditorState) -> Element<Message> {
    let has_image = state.image_path.is_some();
    let mut title = format!("{} collision tile(s)", state.collisions.count());
    if state.modified {
        title += " *";
    }
    row![
        button(text("\u{F3D7}").font(BOOTSTRAP_FONT))
            .style(button::secondary)
            .on_press(Message::OpenImageDialogue),
        button("Save")
            .style(button::primary)
            .on_press_maybe(has_image.then_some(Message::SaveProject)),
        button("Export")
            .style(button::success)
            .on_press_maybe(has_image.then_some(Message::ExportColliders)),
        button("Clear")
            .style(button::danger)
            .on_press(Message::ClearCollisions),
        button("-")
            .style(button::secondary)
            .on_press(Message::ZoomOut),
        button("+")
            .style(button::secondary)
            .on_press(Message::ZoomIn),
        checkbox("Grid", state.show_grid).on_toggle(Message::SetShowGrid),
        horizontal_space(),
        text(title),
    ]
    .spacing(10)
    .align_y(Vertical::Center)
    .into()
}

pub fn view(state: &EditorState) -> Element<Message> {
    column![
        toolbar(state),
        collision_grid_view(state),
        text(&state.status).size(12),
    ]
    .padding(10)
    .spacing(10)
    .into()
}
