use iced::{keyboard, Event, Subscription, Task};
use log::{error, info};

use crate::{message::Message, state::EditorState, view::open_image};

pub fn subscription(_state: &EditorState) -> Subscription<Message> {
    iced::event::listen().map(Message::Event)
}

pub fn update(state: &mut EditorState, message: Message) -> Task<Message> {
    match message {
        Message::Event(event) => match event {
            Event::Keyboard(keyboard::Event::KeyPressed {
                modified_key,
                modifiers,
                ..
            }) => {
                if modifiers.command() && modified_key == keyboard::Key::Character("s".into()) {
                    return Task::done(Message::SaveProject);
                } else if modifiers.command()
                    && modified_key == keyboard::Key::Character("o".into())
                {
                    return Task::done(Message::OpenImageDialogue);
                } else if modified_key == keyboard::Key::Character("g".into()) {
                    state.show_grid = !state.show_grid;
                } else if modified_key == keyboard::Key::Character("+".into()) {
                    return Task::done(Message::ZoomIn);
                } else if modified_key == keyboard::Key::Character("-".into()) {
                    return Task::done(Message::ZoomOut);
                }
            }
            _ => {}
        },
        Message::OpenImageDialogue => {
            return Task::perform(open_image(), Message::ImageOpened);
        }
        Message::ImageOpened(path) => {
            if let Some(path) = path {
                if let Err(e) = state.open_image(path) {
                    error!("Error opening image: {:#}", e);
                    state.status = format!("{:#}", e);
                }
            }
        }
        Message::SaveProject => match state.save_project() {
            Ok(()) => {
                state.status = "Collisions saved.".to_string();
            }
            Err(e) => {
                error!("Error saving project: {:#}", e);
                state.status = format!("{:#}", e);
            }
        },
        Message::ExportColliders => match state.export_colliders() {
            Ok(path) => {
                info!("Exported {}", path.display());
                state.status = format!("Exported {}", path.display());
            }
            Err(e) => {
                error!("Error exporting collisions: {:#}", e);
                state.status = format!("{:#}", e);
            }
        },
        Message::ClearCollisions => {
            if state.collisions.count() > 0 {
                state.collisions.clear();
                state.modified = true;
            }
        }
        Message::SetCell { col, row, value } => {
            if state.collisions.is_set(col, row) != value && state.collisions.set(col, row, value)
            {
                state.modified = true;
            }
        }
        Message::SetShowGrid(show) => {
            state.show_grid = show;
        }
        Message::ZoomIn => {
            state.set_pixel_size(state.global_config.pixel_size + 1.0);
        }
        Message::ZoomOut => {
            state.set_pixel_size(state.global_config.pixel_size - 1.0);
        }
    }
    Task::none()
}
