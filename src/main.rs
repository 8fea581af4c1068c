use std::path::PathBuf;

use iced::Theme;
use state::EditorState;

mod helpers;
mod message;
mod state;
mod update;
mod view;

fn theme(_state: &EditorState) -> Theme {
    match dark_light::detect().unwrap_or(dark_light::Mode::Unspecified) {
        dark_light::Mode::Light => Theme::Light,
        dark_light::Mode::Dark | dark_light::Mode::Unspecified => Theme::Dark,
    }
}

pub fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let image = std::env::args_os().nth(1).map(PathBuf::from);
    iced::application("Collision Editor", update::update, view::view)
        .font(iced_fonts::REQUIRED_FONT_BYTES)
        .font(iced_fonts::BOOTSTRAP_FONT_BYTES)
        .theme(theme)
        .subscription(update::subscription)
        .run_with(move || state::initial_state(image))
}
