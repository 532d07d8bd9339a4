mod app;
mod application;
mod domain;
mod engine;
mod ui;
mod utils;

use iced::window;
use tracing::Level;

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let icon_data = include_bytes!("../assets/icon.png");

    let icon = match image::load_from_memory(icon_data) {
        Ok(img) => {
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            window::icon::from_rgba(rgba.into_raw(), width, height).ok()
        }
        Err(e) => {
            tracing::warn!("failed to decode window icon: {}", e);
            None
        }
    };

    iced::application(app::boot, app::update, app::view)
        .title("YouTube Downloader")
        .window(window::Settings {
            icon,
            size: iced::Size::new(440.0, 240.0),
            ..Default::default()
        })
        .run()
}
