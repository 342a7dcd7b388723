//! Color skins for the player.
//!
//! Three palettes are available: a light `tahoe` skin with tinted transport
//! buttons, a grey bevelled `classic` skin, and a black-and-green `matrix`
//! skin. Every widget in [`super::ui`] takes its colors from a [`Palette`].

use ratatui::style::Color;
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Skin {
    #[default]
    Tahoe,
    Classic,
    Matrix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub panel: Color,
    pub text: Color,
    pub border: Color,
    pub disabled: Color,
    pub accent: Color,
    pub toggle_on: Color,
    pub play: Color,
    pub pause: Color,
    pub stop: Color,
    pub meter: Color,
    pub meter_hot: Color,
}

impl Skin {
    pub fn from_name(name: &str) -> Result<Self, Box<dyn Error>> {
        match name.to_lowercase().as_str() {
            "tahoe" => Ok(Skin::Tahoe),
            "classic" => Ok(Skin::Classic),
            "matrix" => Ok(Skin::Matrix),
            other => Err(format!("Unknown theme: {other}").into()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Skin::Tahoe => "tahoe",
            Skin::Classic => "classic",
            Skin::Matrix => "matrix",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Skin::Tahoe => Skin::Classic,
            Skin::Classic => Skin::Matrix,
            Skin::Matrix => Skin::Tahoe,
        }
    }

    pub fn palette(&self) -> Palette {
        match self {
            Skin::Tahoe => Palette {
                background: Color::Rgb(0xf9, 0xf9, 0xfb),
                panel: Color::Rgb(0xed, 0xed, 0xf0),
                text: Color::Rgb(0x1c, 0x1c, 0x1e),
                border: Color::Rgb(0xe5, 0xe5, 0xea),
                disabled: Color::Rgb(0xae, 0xae, 0xb2),
                accent: Color::Rgb(0x00, 0x7a, 0xff),
                toggle_on: Color::Rgb(0x34, 0xc7, 0x59),
                play: Color::Rgb(0x00, 0x80, 0x00),
                pause: Color::Rgb(0xff, 0xa5, 0x00),
                stop: Color::Rgb(0xff, 0x00, 0x00),
                meter: Color::Rgb(0x00, 0x7a, 0xff),
                meter_hot: Color::Rgb(0xff, 0x3b, 0x30),
            },
            Skin::Classic => Palette {
                background: Color::Rgb(0xd4, 0xd4, 0xd4),
                panel: Color::Rgb(0xb5, 0xb5, 0xb5),
                text: Color::Black,
                border: Color::Rgb(0x60, 0x60, 0x60),
                disabled: Color::Rgb(0x80, 0x80, 0x80),
                accent: Color::Rgb(0x70, 0x70, 0x70),
                toggle_on: Color::Black,
                play: Color::Black,
                pause: Color::Black,
                stop: Color::Black,
                meter: Color::Rgb(0x40, 0x40, 0x40),
                meter_hot: Color::Rgb(0x80, 0x00, 0x00),
            },
            Skin::Matrix => Palette {
                background: Color::Black,
                panel: Color::Black,
                text: Color::Rgb(0, 255, 70),
                border: Color::Rgb(0, 220, 80),
                disabled: Color::Rgb(0, 120, 40),
                accent: Color::Rgb(0, 220, 80),
                toggle_on: Color::Rgb(0, 255, 70),
                play: Color::Rgb(0, 255, 70),
                pause: Color::Rgb(0, 255, 70),
                stop: Color::Rgb(0, 255, 70),
                meter: Color::Rgb(0, 255, 70),
                meter_hot: Color::Rgb(180, 255, 180),
            },
        }
    }
}

impl fmt::Display for Skin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(Skin::from_name("tahoe").unwrap(), Skin::Tahoe);
        assert_eq!(Skin::from_name("Classic").unwrap(), Skin::Classic);
        assert_eq!(Skin::from_name("MATRIX").unwrap(), Skin::Matrix);
        assert!(Skin::from_name("vaporwave").is_err());
    }

    #[test]
    fn test_names_match_config_themes() {
        for name in tapedeck::config::THEMES {
            assert_eq!(Skin::from_name(name).unwrap().name(), *name);
        }
    }

    #[test]
    fn test_next_cycles_all_skins() {
        let start = Skin::default();
        assert_eq!(start.next().next().next(), start);
        assert_ne!(start.next(), start);
    }

    #[test]
    fn test_matrix_is_green_on_black() {
        let palette = Skin::Matrix.palette();
        assert_eq!(palette.background, Color::Black);
        assert_eq!(palette.text, Color::Rgb(0, 255, 70));
    }
}
