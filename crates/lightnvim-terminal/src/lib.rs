//! Embedded terminal that hosts the editor process.
//!
//! The editor runs on a pseudo-terminal; its output is fed into an
//! `alacritty_terminal` state machine on the GUI thread, which turns it into
//! [`TerminalSignal`]s and a [`GridSnapshot`] for the renderer.

pub mod color;
pub mod command;
pub mod event;
pub mod pty;
pub mod screen;
pub mod size;
pub mod style;
pub mod terminal;

pub use command::EditorCommand;
pub use event::{EventProxy, TerminalEvent};
pub use pty::{PtyError, PtyManager, Wakeup};
pub use screen::{CellView, CursorShape, CursorView, GridSnapshot, Screen};
pub use size::SizeInfo;
pub use style::TerminalStyle;
pub use terminal::{Terminal, TerminalError, TerminalOptions, TerminalSignal};

/// `TERM` value exported to the child.
pub const TERM: &str = "xterm-256color";
