//! Terminal state machine and the snapshot handed to the renderer.
//!
//! [`Screen`] owns the `alacritty_terminal` grid and its escape-sequence
//! parser but knows nothing about the PTY, so it can be driven directly.

use std::sync::mpsc;

use alacritty_terminal::grid::Dimensions;
use alacritty_terminal::index::Point;
use alacritty_terminal::term::cell::Flags as CellFlags;
use alacritty_terminal::term::{Config, Term, TermMode};
use alacritty_terminal::vte::ansi::{
    Color as AnsiColor, CursorShape as AnsiCursorShape, NamedColor, Processor, Rgb,
};
use lightnvim_common::Color;

use crate::color::{self, Palette};
use crate::event::{EventProxy, TerminalEvent};
use crate::size::SizeInfo;

// =============================================================================
// SNAPSHOT
// =============================================================================

/// One visible, non-spacer cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellView {
    pub column: usize,
    pub c: char,
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
    pub italic: bool,
    /// Occupies this column and the next.
    pub wide: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorShape {
    Block,
    HollowBlock,
    Beam,
    Underline,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorView {
    pub line: usize,
    pub column: usize,
    pub shape: CursorShape,
    pub color: Color,
    /// The child asked for a blinking cursor.
    pub blinking: bool,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSnapshot {
    pub columns: usize,
    pub lines: usize,
    /// One entry per visible line, cells in column order.
    pub rows: Vec<Vec<CellView>>,
    pub cursor: Option<CursorView>,
    pub background: Color,
}

#[cfg(test)]
impl GridSnapshot {
    /// The text of one line.
    pub(crate) fn row_text(&self, line: usize) -> String {
        self.rows
            .get(line)
            .map(|row| row.iter().map(|cell| cell.c).collect())
            .unwrap_or_default()
    }
}

// =============================================================================
// SCREEN
// =============================================================================

pub struct Screen {
    term: Term<EventProxy>,
    processor: Processor,
    events: mpsc::Receiver<TerminalEvent>,
    size: SizeInfo,
    palette: Palette,
    last_cursor: Point,
}

impl Screen {
    pub fn new(size: SizeInfo, scrollback_lines: usize, palette: Palette) -> Self {
        let (proxy, events) = EventProxy::new();
        let config = Config {
            scrolling_history: scrollback_lines,
            ..Config::default()
        };
        let term = Term::new(config, &size, proxy);
        let last_cursor = term.grid().cursor.point;

        Self {
            term,
            processor: Processor::new(),
            events,
            size,
            palette,
            last_cursor,
        }
    }

    /// Run child output through the escape-sequence parser.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.processor.advance(&mut self.term, bytes);
    }

    /// Events raised since the last call, in order.
    pub fn take_events(&mut self) -> Vec<TerminalEvent> {
        self.events.try_iter().collect()
    }

    /// `true` if the cursor is somewhere else than at the previous call.
    pub fn cursor_moved(&mut self) -> bool {
        let point = self.term.grid().cursor.point;
        let moved = point != self.last_cursor;
        self.last_cursor = point;
        moved
    }

    /// Apply a new geometry. Returns `true` if the grid changed shape.
    pub fn resize(&mut self, size: SizeInfo) -> bool {
        let reshaped = size.columns() != self.size.columns()
            || size.screen_lines() != self.size.screen_lines();
        if reshaped {
            self.term.resize(size);
        }
        self.size = size;
        reshaped
    }

    pub fn size(&self) -> &SizeInfo {
        &self.size
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn set_background(&mut self, background: Color) {
        self.palette.background = background;
    }

    pub fn mode(&self) -> TermMode {
        *self.term.mode()
    }

    /// Whether the child asked for a blinking cursor.
    pub fn cursor_blinking(&self) -> bool {
        self.term.cursor_style().blinking
    }

    /// Answer for an OSC color query.
    pub fn request_color(&self, index: usize) -> Rgb {
        color::request_color(index, self.term.colors(), &self.palette)
    }

    pub fn snapshot(&self) -> GridSnapshot {
        let content = self.term.renderable_content();
        let offset = content.display_offset as i32;
        let columns = self.term.columns();
        let lines = self.term.screen_lines();
        let colors = content.colors;
        let palette = &self.palette;

        let cursor = to_cursor_shape(content.cursor.shape).and_then(|shape| {
            let line = usize::try_from(content.cursor.point.line.0 + offset).ok()?;
            let column = content.cursor.point.column.0;
            (line < lines && column < columns).then(|| CursorView {
                line,
                column,
                shape,
                color: color::resolve(AnsiColor::Named(NamedColor::Cursor), colors, palette),
                blinking: self.cursor_blinking(),
            })
        });

        let mut rows: Vec<Vec<CellView>> = vec![Vec::with_capacity(columns); lines];
        for cell in content.display_iter {
            let Ok(line) = usize::try_from(cell.point.line.0 + offset) else {
                continue;
            };
            let column = cell.point.column.0;
            if line >= lines || column >= columns {
                continue;
            }

            let flags = cell.flags;
            if flags.intersects(CellFlags::WIDE_CHAR_SPACER | CellFlags::LEADING_WIDE_CHAR_SPACER)
            {
                continue;
            }

            let mut fg = color::resolve(cell.fg, colors, palette);
            let mut bg = color::resolve(cell.bg, colors, palette);
            if flags.contains(CellFlags::DIM) {
                fg = color::dim(fg);
            }
            if flags.contains(CellFlags::INVERSE) {
                std::mem::swap(&mut fg, &mut bg);
            }
            if flags.contains(CellFlags::HIDDEN) {
                fg = bg;
            }

            rows[line].push(CellView {
                column,
                c: cell.c,
                fg,
                bg,
                bold: flags.contains(CellFlags::BOLD),
                italic: flags.contains(CellFlags::ITALIC),
                wide: flags.contains(CellFlags::WIDE_CHAR),
            });
        }

        GridSnapshot {
            columns,
            lines,
            rows,
            cursor,
            background: palette.background,
        }
    }
}

fn to_cursor_shape(shape: AnsiCursorShape) -> Option<CursorShape> {
    match shape {
        AnsiCursorShape::Block => Some(CursorShape::Block),
        AnsiCursorShape::HollowBlock => Some(CursorShape::HollowBlock),
        AnsiCursorShape::Beam => Some(CursorShape::Beam),
        AnsiCursorShape::Underline => Some(CursorShape::Underline),
        AnsiCursorShape::Hidden => None,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use lightnvim_common::CellSize;

    const PALETTE: Palette = Palette {
        foreground: Color::from_rgba(0xd0, 0xd0, 0xd0, 0xff),
        background: Color::from_rgba(0, 0, 0, 0xff),
        cursor: Color::from_rgba(0xd0, 0xd0, 0xd0, 0xff),
    };

    fn screen(columns: usize, lines: usize) -> Screen {
        Screen::new(SizeInfo::new(columns, lines, CellSize::new(8, 16)), 100, PALETTE)
    }

    #[test]
    fn text_lands_in_snapshot() {
        let mut s = screen(20, 4);
        s.feed(b"hello\r\nworld");
        let snap = s.snapshot();
        assert_eq!(snap.columns, 20);
        assert_eq!(snap.lines, 4);
        assert!(snap.row_text(0).starts_with("hello"));
        assert!(snap.row_text(1).starts_with("world"));
    }

    #[test]
    fn cursor_moved_reports_changes_once() {
        let mut s = screen(20, 4);
        assert!(!s.cursor_moved());
        s.feed(b"abc");
        assert!(s.cursor_moved());
        assert!(!s.cursor_moved());
        s.feed(b"\x1b[3;5H");
        assert!(s.cursor_moved());
        let point = s.term.grid().cursor.point;
        assert_eq!((point.line.0, point.column.0), (2, 4));
    }

    #[test]
    fn title_sequence_raises_event() {
        let mut s = screen(20, 4);
        s.feed(b"\x1b]2;notes.txt - NVIM\x07");
        let events = s.take_events();
        assert!(
            events
                .iter()
                .any(|e| matches!(e, TerminalEvent::Title(t) if t == "notes.txt - NVIM")),
            "got {events:?}"
        );
    }

    #[test]
    fn device_attributes_request_raises_pty_write() {
        let mut s = screen(20, 4);
        s.feed(b"\x1b[c");
        let events = s.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, TerminalEvent::PtyWrite(text) if text.starts_with("\x1b[?"))));
    }

    #[test]
    fn inverse_swaps_colors_and_bold_is_kept() {
        let mut s = screen(20, 2);
        s.feed(b"\x1b[1;7mX\x1b[0m");
        let cell = s.snapshot().rows[0][0];
        assert_eq!(cell.c, 'X');
        assert!(cell.bold);
        assert_eq!(cell.fg, PALETTE.background);
        assert_eq!(cell.bg, PALETTE.foreground);
    }

    #[test]
    fn hidden_cursor_is_absent() {
        let mut s = screen(20, 2);
        assert!(s.snapshot().cursor.is_some());
        s.feed(b"\x1b[?25l");
        assert!(s.snapshot().cursor.is_none());
    }

    #[test]
    fn cursor_shape_follows_decscusr() {
        let mut s = screen(20, 2);
        s.feed(b"\x1b[6 q");
        let cursor = s.snapshot().cursor.unwrap();
        assert_eq!(cursor.shape, CursorShape::Beam);
        assert!(!cursor.blinking);
    }

    #[test]
    fn resize_reports_shape_changes_only() {
        let mut s = screen(20, 4);
        assert!(!s.resize(SizeInfo::new(20, 4, CellSize::new(8, 16))));
        assert!(s.resize(SizeInfo::new(30, 4, CellSize::new(8, 16))));
        assert_eq!(s.snapshot().columns, 30);
    }

    #[test]
    fn background_change_reaches_snapshot() {
        let mut s = screen(10, 2);
        let bg = Color::from_rgba(0x20, 0x30, 0x40, 0xff);
        s.set_background(bg);
        let snap = s.snapshot();
        assert_eq!(snap.background, bg);
        assert_eq!(snap.rows[0][0].bg, bg);
    }
}
