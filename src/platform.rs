//! The host boundary: drawing primitives the game consumes and the input it
//! understands.

use std::fmt;

use crate::snake::Direction;

/// A 0xRRGGBBAA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u32);

impl Color {
    pub const MAXIMUM_RED: Color = Color(0xDA1A_21FF);
    pub const WHITE_COFFEE: Color = Color(0xECE0_D3FF);
    pub const RAISIN_BLACK: Color = Color(0x2121_20FF);

    pub fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn a(self) -> u8 {
        self.0 as u8
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08x}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

impl Alignment {
    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

/// Inputs the game reacts to. Mapping physical keys onto these is the
/// host's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    /// Start, pause, or restart depending on the session state.
    Space,
    /// Toggle the colour theme.
    Theme,
}

impl Key {
    pub fn direction(self) -> Option<Direction> {
        match self {
            Key::Up => Some(Direction::UP),
            Key::Down => Some(Direction::DOWN),
            Key::Left => Some(Direction::LEFT),
            Key::Right => Some(Direction::RIGHT),
            Key::Space | Key::Theme => None,
        }
    }
}

/// Drawing surface and error sink provided by the host.
///
/// Coordinates are pixels; all calls are fire-and-forget.
pub trait Platform {
    fn draw_rectangle(&mut self, x: u32, y: u32, width: u32, height: u32, color: Color, fill: bool);

    #[allow(clippy::too_many_arguments)]
    fn draw_text(
        &mut self,
        text: &str,
        x: u32,
        y: u32,
        size: u32,
        color: Color,
        fill: bool,
        alignment: Alignment,
    );

    #[allow(clippy::too_many_arguments)]
    fn draw_number(
        &mut self,
        number: u32,
        x: u32,
        y: u32,
        size: u32,
        color: Color,
        fill: bool,
        alignment: Alignment,
    ) {
        self.draw_text(&number.to_string(), x, y, size, color, fill, alignment);
    }

    /// Reports an unrecoverable error. The session does not continue.
    fn throw_error(&mut self, message: &str);
}
