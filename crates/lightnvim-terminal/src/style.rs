//! Process-wide terminal style.
//!
//! Every terminal in the process shares one immutable style, installed by the
//! first terminal that is constructed.

use std::sync::OnceLock;
use std::time::Duration;

use lightnvim_common::{Color, Padding};

static STYLE: OnceLock<TerminalStyle> = OnceLock::new();

#[derive(Debug, Clone, PartialEq)]
pub struct TerminalStyle {
    pub cursor_blink: bool,
    pub blink_interval: Duration,
    /// Beam width (or underline height) as a fraction of the cell.
    pub cursor_aspect_ratio: f32,
    /// Hide the mouse pointer while typing.
    pub mouse_autohide: bool,
    /// Logical pixels between the window edge and the grid.
    pub padding: Padding,
    pub foreground: Color,
    pub cursor_color: Color,
    pub scrollback_lines: usize,
}

impl Default for TerminalStyle {
    fn default() -> Self {
        Self {
            cursor_blink: true,
            blink_interval: Duration::from_millis(600),
            cursor_aspect_ratio: 0.1,
            mouse_autohide: true,
            padding: Padding::uniform(1),
            foreground: Color::from_rgba(0xd0, 0xd0, 0xd0, 0xff),
            cursor_color: Color::from_rgba(0xd0, 0xd0, 0xd0, 0xff),
            scrollback_lines: 1000,
        }
    }
}

impl TerminalStyle {
    /// Install `style` as the shared style unless one already exists, and
    /// return whichever is in effect.
    pub fn install(style: TerminalStyle) -> &'static TerminalStyle {
        let mut installed_now = false;
        let shared = STYLE.get_or_init(|| {
            installed_now = true;
            style.clone()
        });
        if installed_now {
            tracing::debug!(?shared, "terminal style installed");
        } else if *shared != style {
            tracing::debug!("terminal style already installed; keeping the first one");
        }
        shared
    }

    /// The shared style, if a terminal has been constructed.
    pub fn shared() -> Option<&'static TerminalStyle> {
        STYLE.get()
    }
}
