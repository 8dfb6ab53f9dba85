//! Resolution of terminal colors to RGBA.
//!
//! @module terminal/color

use alacritty_terminal::term::color::{Colors, COUNT};
use alacritty_terminal::vte::ansi::{Color as AnsiColor, NamedColor, Rgb};
use lightnvim_common::Color;

// =============================================================================
// PALETTE
// =============================================================================

/// Standard ANSI 16-color palette (indices 0-15) as `[r, g, b]`.
pub const ANSI_COLORS: [[u8; 3]; 16] = [
    [0x00, 0x00, 0x00], // 0  Black
    [0xCD, 0x00, 0x00], // 1  Red
    [0x00, 0xCD, 0x00], // 2  Green
    [0xCD, 0xCD, 0x00], // 3  Yellow
    [0x00, 0x00, 0xEE], // 4  Blue
    [0xCD, 0x00, 0xCD], // 5  Magenta
    [0x00, 0xCD, 0xCD], // 6  Cyan
    [0xE5, 0xE5, 0xE5], // 7  White
    [0x7F, 0x7F, 0x7F], // 8  Bright Black
    [0xFF, 0x00, 0x00], // 9  Bright Red
    [0x00, 0xFF, 0x00], // 10 Bright Green
    [0xFF, 0xFF, 0x00], // 11 Bright Yellow
    [0x5C, 0x5C, 0xFF], // 12 Bright Blue
    [0xFF, 0x00, 0xFF], // 13 Bright Magenta
    [0x00, 0xFF, 0xFF], // 14 Bright Cyan
    [0xFF, 0xFF, 0xFF], // 15 Bright White
];

/// The three colors the widget owns; everything else comes from the
/// terminal's palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub foreground: Color,
    pub background: Color,
    pub cursor: Color,
}

/// Resolve an indexed color (0-255) to `[r, g, b]`.
///
/// - 0-15: standard ANSI palette
/// - 16-231: 6×6×6 color cube
/// - 232-255: 24-step grayscale ramp
pub fn indexed_to_rgb(idx: u8) -> [u8; 3] {
    match idx {
        0..=15 => ANSI_COLORS[idx as usize],
        16..=231 => {
            let i = idx - 16;
            let level = |c: u8| if c == 0 { 0 } else { 55 + c * 40 };
            [level(i / 36), level((i / 6) % 6), level(i % 6)]
        }
        232..=255 => {
            let v = 8 + (idx - 232) * 10;
            [v, v, v]
        }
    }
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Resolve a cell color, preferring overrides the child set through OSC.
pub fn resolve(color: AnsiColor, colors: &Colors, palette: &Palette) -> Color {
    match color {
        AnsiColor::Spec(rgb) => from_rgb(rgb),
        AnsiColor::Indexed(idx) => match colors[idx as usize] {
            Some(rgb) => from_rgb(rgb),
            None => from_triplet(indexed_to_rgb(idx)),
        },
        AnsiColor::Named(named) => match colors[named] {
            Some(rgb) => from_rgb(rgb),
            None => named_default(named, palette),
        },
    }
}

/// Color reported back for an OSC color query at `index`.
pub fn request_color(index: usize, colors: &Colors, palette: &Palette) -> Rgb {
    if index < COUNT {
        if let Some(rgb) = colors[index] {
            return rgb;
        }
    }
    let color = match u8::try_from(index) {
        Ok(idx) => from_triplet(indexed_to_rgb(idx)),
        Err(_) if index == NamedColor::Background as usize => palette.background,
        Err(_) if index == NamedColor::Cursor as usize => palette.cursor,
        Err(_) => palette.foreground,
    };
    Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

/// Roughly two-thirds brightness.
pub fn dim(color: Color) -> Color {
    let d = |c: u8| (u16::from(c) * 2 / 3) as u8;
    Color::from_rgba(d(color.r), d(color.g), d(color.b), color.a)
}

fn named_default(named: NamedColor, palette: &Palette) -> Color {
    match named {
        NamedColor::Foreground | NamedColor::BrightForeground => palette.foreground,
        NamedColor::DimForeground => dim(palette.foreground),
        NamedColor::Background => palette.background,
        NamedColor::Cursor => palette.cursor,
        NamedColor::DimBlack => dim_ansi(NamedColor::Black),
        NamedColor::DimRed => dim_ansi(NamedColor::Red),
        NamedColor::DimGreen => dim_ansi(NamedColor::Green),
        NamedColor::DimYellow => dim_ansi(NamedColor::Yellow),
        NamedColor::DimBlue => dim_ansi(NamedColor::Blue),
        NamedColor::DimMagenta => dim_ansi(NamedColor::Magenta),
        NamedColor::DimCyan => dim_ansi(NamedColor::Cyan),
        NamedColor::DimWhite => dim_ansi(NamedColor::White),
        // The sixteen ANSI colors share their palette index.
        ansi => from_triplet(indexed_to_rgb(ansi as u8)),
    }
}

fn dim_ansi(base: NamedColor) -> Color {
    dim(from_triplet(indexed_to_rgb(base as u8)))
}

fn from_rgb(rgb: Rgb) -> Color {
    Color::from_rgba(rgb.r, rgb.g, rgb.b, 0xFF)
}

fn from_triplet([r, g, b]: [u8; 3]) -> Color {
    Color::from_rgba(r, g, b, 0xFF)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const PALETTE: Palette = Palette {
        foreground: Color::from_rgba(0xd0, 0xd0, 0xd0, 0xff),
        background: Color::from_rgba(0x10, 0x10, 0x10, 0xff),
        cursor: Color::from_rgba(0xff, 0x00, 0x00, 0xff),
    };

    #[test]
    fn color_cube_and_grayscale() {
        assert_eq!(indexed_to_rgb(16), [0, 0, 0]);
        assert_eq!(indexed_to_rgb(196), [255, 0, 0]);
        assert_eq!(indexed_to_rgb(231), [255, 255, 255]);
        assert_eq!(indexed_to_rgb(232), [8, 8, 8]);
        assert_eq!(indexed_to_rgb(255), [238, 238, 238]);
    }

    #[test]
    fn named_defaults_follow_palette() {
        let colors = Colors::default();
        assert_eq!(
            resolve(AnsiColor::Named(NamedColor::Foreground), &colors, &PALETTE),
            PALETTE.foreground
        );
        assert_eq!(
            resolve(AnsiColor::Named(NamedColor::Background), &colors, &PALETTE),
            PALETTE.background
        );
        assert_eq!(
            resolve(AnsiColor::Named(NamedColor::Red), &colors, &PALETTE),
            Color::from_rgba(0xCD, 0, 0, 0xFF)
        );
    }

    #[test]
    fn overrides_win_over_defaults() {
        let mut colors = Colors::default();
        colors[NamedColor::Background] = Some(Rgb { r: 1, g: 2, b: 3 });
        assert_eq!(
            resolve(AnsiColor::Named(NamedColor::Background), &colors, &PALETTE),
            Color::from_rgba(1, 2, 3, 0xFF)
        );
    }

    #[test]
    fn spec_rgb_passes_through() {
        let colors = Colors::default();
        let rgb = Rgb {
            r: 128,
            g: 64,
            b: 32,
        };
        assert_eq!(
            resolve(AnsiColor::Spec(rgb), &colors, &PALETTE),
            Color::from_rgba(128, 64, 32, 0xFF)
        );
    }

    #[test]
    fn request_color_for_special_indices() {
        let colors = Colors::default();
        let bg = request_color(NamedColor::Background as usize, &colors, &PALETTE);
        assert_eq!((bg.r, bg.g, bg.b), (0x10, 0x10, 0x10));
        let fg = request_color(NamedColor::Foreground as usize, &colors, &PALETTE);
        assert_eq!((fg.r, fg.g, fg.b), (0xd0, 0xd0, 0xd0));
        let red = request_color(9, &colors, &PALETTE);
        assert_eq!((red.r, red.g, red.b), (0xFF, 0, 0));
    }

    #[test]
    fn dim_keeps_alpha() {
        assert_eq!(
            dim(Color::from_rgba(0x90, 0x30, 0, 0x80)),
            Color::from_rgba(0x60, 0x20, 0, 0x80)
        );
    }
}
