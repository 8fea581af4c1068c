use gb_tile_tools::{
    collision::CollisionMap,
    common::{TileCoord, TILE_HEIGHT, TILE_WIDTH},
    image::RgbaImage,
};
use iced::{
    mouse,
    widget::{
        canvas, column,
        scrollable::{Direction, Scrollbar},
        stack, Scrollable,
    },
    Color, Element, Length, Padding, Point, Rectangle, Size,
};

use crate::{
    helpers::{alpha_blend, ColorRGB},
    message::Message,
    state::EditorState,
};

// We use two stacked canvases: one for the raster and one for the grid lines.
// Iced cannot draw shapes on top of an image within a single canvas.

struct CollisionGrid<'a> {
    image: Option<&'a RgbaImage>,
    collisions: &'a CollisionMap,
    pixel_size: f32,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
enum InternalStateAction {
    #[default]
    None,
    Brushing(bool),
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
struct InternalState {
    action: InternalStateAction,
    coords: Option<(TileCoord, TileCoord)>,
}

// One pixel of transparent padding on each side of the raster.
fn cell_under(
    p: Point,
    bounds: Rectangle,
    collisions: &CollisionMap,
    pixel_size: f32,
) -> Option<(TileCoord, TileCoord)> {
    let x = (p.x - bounds.x) / pixel_size - 1.0;
    let y = (p.y - bounds.y) / pixel_size - 1.0;
    collisions.cell_at_pixel(x, y)
}

fn raster_size(image: Option<&RgbaImage>, collisions: &CollisionMap) -> (usize, usize) {
    match image {
        Some(img) => (img.width as usize, img.height as usize),
        None => (
            collisions.cols() * TILE_WIDTH,
            collisions.rows() * TILE_HEIGHT,
        ),
    }
}

impl<'a> canvas::Program<Message> for CollisionGrid<'a> {
    type State = InternalState;

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        let cell = cursor
            .position_over(bounds)
            .and_then(|p| cell_under(p, bounds, self.collisions, self.pixel_size));
        match event {
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if let Some((col, row)) = cell {
                    let value = !self.collisions.is_set(col, row);
                    state.action = InternalStateAction::Brushing(value);
                    state.coords = Some((col, row));
                    return (
                        canvas::event::Status::Captured,
                        Some(Message::SetCell { col, row, value }),
                    );
                }
            }
            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                state.action = InternalStateAction::None;
                state.coords = None;
            }
            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                if let (InternalStateAction::Brushing(value), Some((col, row))) =
                    (state.action, cell)
                {
                    if state.coords != Some((col, row)) {
                        state.coords = Some((col, row));
                        return (
                            canvas::event::Status::Captured,
                            Some(Message::SetCell { col, row, value }),
                        );
                    }
                }
            }
            _ => {}
        }
        (canvas::event::Status::Ignored, None)
    }

    fn draw(
        &self,
        _state: &InternalState,
        renderer: &iced::Renderer,
        _theme: &iced::Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        let (width, height) = raster_size(self.image, self.collisions);

        // Add a pixel of transparent padding around the image, since Iced's
        // "nearest neighbor" filter results in the edge pixels having the wrong size.
        let num_cols = width + 2;
        let num_rows = height + 2;
        let col_stride = 4;
        let row_stride = num_cols * col_stride;
        let mut data: Vec<u8> = vec![0; num_rows * row_stride];

        let blank: ColorRGB = [128, 128, 128];
        let red_highlight: ColorRGB = [255, 0, 0];
        for y in 0..height {
            let mut addr = (y + 1) * row_stride + col_stride;
            for x in 0..width {
                let mut color = match self.image {
                    Some(img) => {
                        let src = (y * width + x) * 4;
                        [img.data[src], img.data[src + 1], img.data[src + 2]]
                    }
                    None => blank,
                };
                let col = (x / TILE_WIDTH) as TileCoord;
                let row = (y / TILE_HEIGHT) as TileCoord;
                if self.collisions.is_set(col, row) {
                    color = alpha_blend(color, red_highlight, 0.4);
                }
                data[addr..(addr + 3)].copy_from_slice(&color);
                data[addr + 3] = 255;
                addr += 4;
            }
        }

        let image = iced::advanced::image::Image::new(iced::advanced::image::Handle::from_rgba(
            num_cols as u32,
            num_rows as u32,
            data,
        ))
        .filter_method(iced::widget::image::FilterMethod::Nearest);

        frame.draw_image(
            Rectangle::new(
                Point::new(0.0, 0.0),
                Size {
                    width: num_cols as f32 * self.pixel_size,
                    height: num_rows as f32 * self.pixel_size,
                },
            ),
            image,
        );

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        _interaction: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if cursor.is_over(bounds) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }
}

struct GridLines {
    cols: usize,
    rows: usize,
    pixel_size: f32,
    show_grid: bool,
    grid_alpha: f32,
}

impl canvas::Program<Message> for GridLines {
    // No internal state
    type State = ();

    fn draw(
        &self,
        _state: &(),
        renderer: &iced::Renderer,
        _theme: &iced::Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        if !self.show_grid {
            return vec![];
        }

        let mut frame = canvas::Frame::new(renderer, bounds.size());
        let stroke = canvas::Stroke::default()
            .with_width(1.0)
            .with_color(Color::from_rgba(1.0, 0.0, 0.0, self.grid_alpha));
        let cell_w = TILE_WIDTH as f32 * self.pixel_size;
        let cell_h = TILE_HEIGHT as f32 * self.pixel_size;
        let right = self.pixel_size + self.cols as f32 * cell_w;
        let bottom = self.pixel_size + self.rows as f32 * cell_h;
        for i in 0..=self.cols {
            let x = self.pixel_size + i as f32 * cell_w;
            frame.stroke(
                &canvas::Path::line(Point::new(x, self.pixel_size), Point::new(x, bottom)),
                stroke,
            );
        }
        for j in 0..=self.rows {
            let y = self.pixel_size + j as f32 * cell_h;
            frame.stroke(
                &canvas::Path::line(Point::new(self.pixel_size, y), Point::new(right, y)),
                stroke,
            );
        }

        vec![frame.into_geometry()]
    }
}

pub fn collision_grid_view(state: &EditorState) -> Element<Message> {
    let pixel_size = state.global_config.pixel_size;
    let (width, height) = raster_size(state.image.as_ref(), &state.collisions);
    let canvas_width = (width as f32 + 2.0) * pixel_size;
    let canvas_height = (height as f32 + 2.0) * pixel_size;

    Scrollable::with_direction(
        column![stack![
            canvas(CollisionGrid {
                image: state.image.as_ref(),
                collisions: &state.collisions,
                pixel_size,
            })
            .width(canvas_width)
            .height(canvas_height),
            canvas(GridLines {
                cols: state.collisions.cols(),
                rows: state.collisions.rows(),
                pixel_size,
                show_grid: state.show_grid,
                grid_alpha: state.global_config.grid_alpha,
            })
            .width(canvas_width)
            .height(canvas_height),
        ]]
        .padding(Padding::new(0.0).right(16.0).bottom(16.0)),
        Direction::Both {
            vertical: Scrollbar::default(),
            horizontal: Scrollbar::default(),
        },
    )
    .width(Length::Fill)
    .height(Length::Fill)
    .into()
}
