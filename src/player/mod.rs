pub mod app;
pub mod audio;
pub mod browser;
pub mod theme;
pub mod ui;

pub use app::PlayerOptions;
pub use theme::Skin;

use std::error::Error;

pub fn run(options: PlayerOptions) -> Result<(), Box<dyn Error>> {
    app::run(options)
}
