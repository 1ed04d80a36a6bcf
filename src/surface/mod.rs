//! # Terminal Surface
//!
//! Stateless drawing primitives that append raw escape sequences to a single
//! shared sink. There is no frame buffer and no diffing: every tick redraws
//! in full, and whatever a primitive emits goes straight to the terminal.
//!
//! ```text
//!  CellGroup::draw ──┐
//!  widget task A ────┼──► Surface (clone) ──► Arc<Mutex<dyn Write>> ──► stdout
//!  widget task B ────┘
//! ```
//!
//! Each primitive builds its full output first and appends it with one
//! locked write, so fragments from concurrent widget tasks may interleave
//! between primitives but never inside one.

pub mod border;
pub mod chart;
pub mod text;

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

pub use border::BorderGlyphs;
pub use chart::{FillDirection, GraphOptions};
pub use text::{printable_width, remove_ansi_codes};

pub const HIDE_CURSOR: &str = "\x1b[?25l";
pub const SHOW_CURSOR: &str = "\x1b[?25h";
pub const CLEAR_SCREEN: &str = "\x1b[2J";
pub const RESET: &str = "\x1b[0m";
pub const ENTER_ALTERNATE_SCREEN: &str = "\x1b[?1049h";
pub const LEAVE_ALTERNATE_SCREEN: &str = "\x1b[?1049l";

/// Absolute cursor position. Terminal coordinates are 1-indexed and are not
/// bounds checked.
pub fn cursor_to_sequence(col: u16, row: u16) -> String {
    format!("\x1b[{row};{col}H")
}

/// A foreground color: either a 256-color palette index or 24-bit RGB.
///
/// Deserializes from `[n]` or `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub enum Color {
    Indexed(u8),
    Rgb(u8, u8, u8),
}

impl Color {
    pub const WHITE: Color = Color::Rgb(255, 255, 255);

    pub fn sequence(&self) -> String {
        match *self {
            Color::Indexed(n) => format!("\x1b[38;5;{n}m"),
            Color::Rgb(r, g, b) => format!("\x1b[38;2;{r};{g};{b}m"),
        }
    }
}

impl TryFrom<Vec<u8>> for Color {
    type Error = String;

    fn try_from(channels: Vec<u8>) -> Result<Self, Self::Error> {
        match channels.as_slice() {
            [n] => Ok(Color::Indexed(*n)),
            [r, g, b] => Ok(Color::Rgb(*r, *g, *b)),
            other => Err(format!(
                "a color takes 1 (palette index) or 3 (RGB) channels, got {}",
                other.len()
            )),
        }
    }
}

impl From<Color> for Vec<u8> {
    fn from(color: Color) -> Self {
        match color {
            Color::Indexed(n) => vec![n],
            Color::Rgb(r, g, b) => vec![r, g, b],
        }
    }
}

/// An absolute rectangle in terminal cells, 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Area {
    pub col: u16,
    pub row: u16,
    pub width: u16,
    pub height: u16,
}

impl Area {
    pub fn new(col: u16, row: u16, width: u16, height: u16) -> Self {
        Self { col, row, width, height }
    }

    /// The area shrunk by one cell on every side (the space inside a border).
    pub fn inner(&self) -> Area {
        Area {
            col: self.col.saturating_add(1),
            row: self.row.saturating_add(1),
            width: self.width.saturating_sub(2),
            height: self.height.saturating_sub(2),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}@{},{}", self.width, self.height, self.col, self.row)
    }
}

/// Handle to the shared output sink. Cloning is cheap; all clones append to
/// the same stream.
#[derive(Clone)]
pub struct Surface {
    sink: Arc<Mutex<dyn Write + Send>>,
}

impl Surface {
    pub fn new<W: Write + Send + 'static>(sink: Arc<Mutex<W>>) -> Self {
        Self { sink }
    }

    pub fn stdout() -> Self {
        Self::new(Arc::new(Mutex::new(io::stdout())))
    }

    /// Append raw text to the sink.
    pub fn print(&self, text: &str) -> io::Result<()> {
        let mut sink = self.sink.lock().unwrap_or_else(|e| e.into_inner());
        sink.write_all(text.as_bytes())
    }

    pub fn flush(&self) -> io::Result<()> {
        let mut sink = self.sink.lock().unwrap_or_else(|e| e.into_inner());
        sink.flush()
    }

    pub fn hide_cursor(&self) -> io::Result<()> {
        self.print(HIDE_CURSOR)
    }

    pub fn show_cursor(&self) -> io::Result<()> {
        self.print(SHOW_CURSOR)
    }

    pub fn cursor_to(&self, col: u16, row: u16) -> io::Result<()> {
        self.print(&cursor_to_sequence(col, row))
    }

    pub fn color(&self, color: Color) -> io::Result<()> {
        self.print(&color.sequence())
    }

    pub fn reset(&self) -> io::Result<()> {
        self.print(RESET)
    }

    /// Write `text` clipped to `max_width` columns and `max_height` lines.
    ///
    /// With a position, the cursor is moved to the start of every emitted
    /// line so nothing relies on the terminal's own wrapping. Pass
    /// `usize::MAX` for an unbounded dimension.
    pub fn write(
        &self,
        text: &str,
        max_width: usize,
        max_height: usize,
        at: Option<(u16, u16)>,
    ) -> io::Result<()> {
        let chunks = text::chunk_lines(text, max_width);
        if chunks.is_empty() || max_height == 0 {
            return Ok(());
        }

        let mut out = String::new();
        for (i, chunk) in chunks.iter().take(max_height).enumerate() {
            match at {
                Some((col, row)) => {
                    let line = u16::try_from(i).unwrap_or(u16::MAX);
                    out.push_str(&cursor_to_sequence(col, row.saturating_add(line)));
                }
                None if i > 0 => out.push('\n'),
                None => {}
            }
            out.push_str(chunk);
        }
        self.print(&out)
    }

    /// Write `text` clipped to `area`.
    pub fn write_in(&self, text: &str, area: Area) -> io::Result<()> {
        self.write(
            text,
            usize::from(area.width),
            usize::from(area.height),
            Some((area.col, area.row)),
        )
    }

    /// Clear the whole screen.
    pub fn clear(&self) -> io::Result<()> {
        self.print(CLEAR_SCREEN)
    }

    /// Blank a region by writing spaces through the same clipping path as
    /// text.
    pub fn clear_region(&self, area: Area) -> io::Result<()> {
        let blank = " ".repeat(usize::from(area.width) * usize::from(area.height));
        self.write_in(&blank, area)
    }

    /// Outline `area` with a single-line border.
    pub fn draw_box(&self, area: Area, glyphs: &BorderGlyphs) -> io::Result<()> {
        if area.width < 2 || area.height < 2 {
            return Ok(());
        }
        let Area { col, row, width, height } = area;
        let span = glyphs.horizontal.repeat(usize::from(width - 2));

        let mut out = cursor_to_sequence(col, row);
        out.push_str(&glyphs.top_left);
        out.push_str(&span);
        out.push_str(&glyphs.top_right);

        for y in 1..height - 1 {
            out.push_str(&cursor_to_sequence(col, row.saturating_add(y)));
            out.push_str(&glyphs.vertical);
            out.push_str(&cursor_to_sequence(col.saturating_add(width - 1), row.saturating_add(y)));
            out.push_str(&glyphs.vertical);
        }

        out.push_str(&cursor_to_sequence(col, row.saturating_add(height - 1)));
        out.push_str(&glyphs.bottom_left);
        out.push_str(&span);
        out.push_str(&glyphs.bottom_right);
        self.print(&out)
    }

    pub fn enter_alternate_screen(&self) -> io::Result<()> {
        self.print(ENTER_ALTERNATE_SCREEN)
    }

    pub fn leave_alternate_screen(&self) -> io::Result<()> {
        self.print(LEAVE_ALTERNATE_SCREEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::buffered_surface;

    #[test]
    fn test_cursor_to_is_row_then_col() {
        assert_eq!(cursor_to_sequence(7, 3), "\x1b[3;7H");
    }

    #[test]
    fn test_color_sequences() {
        assert_eq!(Color::Indexed(200).sequence(), "\x1b[38;5;200m");
        assert_eq!(Color::Rgb(1, 2, 3).sequence(), "\x1b[38;2;1;2;3m");
    }

    #[test]
    fn test_color_deserializes_from_channel_count() {
        let colors: Vec<Color> = serde_json::from_str("[[12], [215, 2, 112]]").unwrap();
        assert_eq!(colors, vec![Color::Indexed(12), Color::Rgb(215, 2, 112)]);
        assert!(serde_json::from_str::<Color>("[1, 2]").is_err());
        assert!(serde_json::from_str::<Color>("[1.5, 2, 3]").is_err());
    }

    #[test]
    fn test_write_positions_every_line() {
        let (surface, out) = buffered_surface();
        surface.write("abcdef", 4, 10, Some((2, 5))).unwrap();
        assert_eq!(out.contents(), "\x1b[5;2Habcd\x1b[6;2Hef");
    }

    #[test]
    fn test_write_truncates_height() {
        let (surface, out) = buffered_surface();
        surface.write("one\ntwo\nthree", 10, 2, Some((1, 1))).unwrap();
        assert_eq!(out.contents(), "\x1b[1;1Hone\x1b[2;1Htwo");
    }

    #[test]
    fn test_write_without_position_joins_lines() {
        let (surface, out) = buffered_surface();
        surface.write("abcdef", 3, usize::MAX, None).unwrap();
        assert_eq!(out.contents(), "abc\ndef");
    }

    #[test]
    fn test_write_empty_is_noop() {
        let (surface, out) = buffered_surface();
        surface.write("", 10, 10, Some((1, 1))).unwrap();
        surface.write("\n\n", 10, 10, Some((1, 1))).unwrap();
        surface.write("text", 10, 0, Some((1, 1))).unwrap();
        assert_eq!(out.contents(), "");
    }

    #[test]
    fn test_write_never_exceeds_narrow_area() {
        let (surface, out) = buffered_surface();
        surface.write("日本", 1, 5, Some((1, 1))).unwrap();
        assert_eq!(out.contents(), "");

        surface.write_in("a日b", Area::new(4, 2, 1, 5)).unwrap();
        assert_eq!(out.contents(), "\x1b[2;4Ha\x1b[3;4Hb");
    }

    #[test]
    fn test_formatted_write_strips_back_to_original() {
        let (surface, out) = buffered_surface();
        let text = format!("{}hello{}", Color::Rgb(9, 9, 9).sequence(), RESET);
        surface.write(&text, 80, 1, None).unwrap();
        assert_eq!(remove_ansi_codes(&out.contents()), "hello");
    }

    #[test]
    fn test_clear_region_blanks_area() {
        let (surface, out) = buffered_surface();
        surface.clear_region(Area::new(3, 4, 2, 2)).unwrap();
        assert_eq!(out.contents(), "\x1b[4;3H  \x1b[5;3H  ");
    }

    #[test]
    fn test_clear_whole_screen() {
        let (surface, out) = buffered_surface();
        surface.clear().unwrap();
        assert_eq!(out.contents(), CLEAR_SCREEN);
    }

    #[test]
    fn test_draw_box_edges() {
        let (surface, out) = buffered_surface();
        surface.draw_box(Area::new(1, 1, 4, 3), &BorderGlyphs::default()).unwrap();
        assert_eq!(
            out.contents(),
            "\x1b[1;1H╭──╮\x1b[2;1H│\x1b[2;4H│\x1b[3;1H╰──╯"
        );
    }

    #[test]
    fn test_draw_box_too_small_draws_nothing() {
        let (surface, out) = buffered_surface();
        surface.draw_box(Area::new(1, 1, 1, 5), &BorderGlyphs::default()).unwrap();
        assert_eq!(out.contents(), "");
    }

    #[test]
    fn test_area_inner_saturates() {
        assert_eq!(Area::new(1, 1, 10, 5).inner(), Area::new(2, 2, 8, 3));
        assert_eq!(Area::new(1, 1, 1, 1).inner(), Area::new(2, 2, 0, 0));
        assert!(Area::new(1, 1, 1, 1).inner().is_empty());
    }
}
