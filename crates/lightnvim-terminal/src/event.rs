//! Event bridge between alacritty_terminal and the terminal widget.
//!
//! @module terminal/event

use std::fmt;
use std::sync::{mpsc, Arc};

use alacritty_terminal::event::{Event as AlacrittyEvent, EventListener, WindowSize};
use alacritty_terminal::vte::ansi::Rgb;

// =============================================================================
// TYPES
// =============================================================================

pub type ColorFormatter = Arc<dyn Fn(Rgb) -> String + Sync + Send + 'static>;
pub type SizeFormatter = Arc<dyn Fn(WindowSize) -> String + Sync + Send + 'static>;

/// Events the terminal state machine raises while processing output.
#[derive(Clone)]
pub enum TerminalEvent {
    /// Window title changed.
    Title(String),
    /// Title reset to default.
    ResetTitle,
    /// Bytes the terminal wants written back to the child (device reports).
    PtyWrite(String),
    /// The child asked for a palette entry (OSC 4/10/11/12).
    ColorRequest(usize, ColorFormatter),
    /// The child asked for the text area size in pixels.
    TextAreaSizeRequest(SizeFormatter),
    Bell,
    /// Cursor blinking state changed.
    CursorBlinkingChange,
}

impl fmt::Debug for TerminalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminalEvent::Title(title) => f.debug_tuple("Title").field(title).finish(),
            TerminalEvent::ResetTitle => f.write_str("ResetTitle"),
            TerminalEvent::PtyWrite(text) => f.debug_tuple("PtyWrite").field(text).finish(),
            TerminalEvent::ColorRequest(index, _) => {
                f.debug_tuple("ColorRequest").field(index).finish()
            }
            TerminalEvent::TextAreaSizeRequest(_) => f.write_str("TextAreaSizeRequest"),
            TerminalEvent::Bell => f.write_str("Bell"),
            TerminalEvent::CursorBlinkingChange => f.write_str("CursorBlinkingChange"),
        }
    }
}

// =============================================================================
// EVENT PROXY
// =============================================================================

/// Forwards `alacritty_terminal::Event`s over an mpsc channel. Created
/// alongside each `Term` instance.
pub struct EventProxy {
    sender: mpsc::Sender<TerminalEvent>,
}

impl EventProxy {
    /// Create a new event proxy and its corresponding receiver.
    pub fn new() -> (Self, mpsc::Receiver<TerminalEvent>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }
}

impl EventListener for EventProxy {
    fn send_event(&self, event: AlacrittyEvent) {
        let mapped = match event {
            AlacrittyEvent::Title(title) => TerminalEvent::Title(title),
            AlacrittyEvent::ResetTitle => TerminalEvent::ResetTitle,
            AlacrittyEvent::PtyWrite(text) => TerminalEvent::PtyWrite(text),
            AlacrittyEvent::ColorRequest(index, format) => {
                TerminalEvent::ColorRequest(index, format)
            }
            AlacrittyEvent::TextAreaSizeRequest(format) => {
                TerminalEvent::TextAreaSizeRequest(format)
            }
            AlacrittyEvent::Bell => TerminalEvent::Bell,
            AlacrittyEvent::CursorBlinkingChange => TerminalEvent::CursorBlinkingChange,
            // Child exit is observed on the PTY; the clipboard is not shared
            // with the editor.
            AlacrittyEvent::ChildExit(_)
            | AlacrittyEvent::Exit
            | AlacrittyEvent::Wakeup
            | AlacrittyEvent::ClipboardStore(..)
            | AlacrittyEvent::ClipboardLoad(..)
            | AlacrittyEvent::MouseCursorDirty => return,
        };

        let _ = self.sender.send(mapped);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwards_title() {
        let (proxy, rx) = EventProxy::new();
        proxy.send_event(AlacrittyEvent::Title("notes.txt - NVIM".into()));

        match rx.recv().expect("should receive Title event") {
            TerminalEvent::Title(title) => assert_eq!(title, "notes.txt - NVIM"),
            other => panic!("expected Title, got {other:?}"),
        }
    }

    #[test]
    fn forwards_pty_write() {
        let (proxy, rx) = EventProxy::new();
        proxy.send_event(AlacrittyEvent::PtyWrite("\x1b[?6c".into()));

        match rx.recv().unwrap() {
            TerminalEvent::PtyWrite(text) => assert_eq!(text, "\x1b[?6c"),
            other => panic!("expected PtyWrite, got {other:?}"),
        }
    }

    #[test]
    fn forwards_color_request_with_formatter() {
        let (proxy, rx) = EventProxy::new();
        let format: ColorFormatter =
            Arc::new(|rgb: Rgb| format!("{:02x}{:02x}{:02x}", rgb.r, rgb.g, rgb.b));
        proxy.send_event(AlacrittyEvent::ColorRequest(11, format));

        match rx.recv().unwrap() {
            TerminalEvent::ColorRequest(index, format) => {
                assert_eq!(index, 11);
                assert_eq!(format(Rgb { r: 1, g: 2, b: 3 }), "010203");
            }
            other => panic!("expected ColorRequest, got {other:?}"),
        }
    }

    #[test]
    fn discards_wakeup_and_clipboard() {
        let (proxy, rx) = EventProxy::new();
        proxy.send_event(AlacrittyEvent::Wakeup);
        proxy.send_event(AlacrittyEvent::MouseCursorDirty);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn survives_dropped_receiver() {
        let (proxy, rx) = EventProxy::new();
        drop(rx);
        proxy.send_event(AlacrittyEvent::Bell);
    }
}
