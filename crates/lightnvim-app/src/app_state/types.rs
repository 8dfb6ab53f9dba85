//! Internal types and constants for the app state module.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use lightnvim_rpc::{GuiEvent, GuiSink};
use lightnvim_terminal::Wakeup;
use winit::event_loop::EventLoopProxy;

/// Events posted to the winit loop from other threads.
#[derive(Debug, Clone, PartialEq)]
pub enum UserEvent {
    /// The PTY reader queued output (or saw the child exit).
    PtyOutput,
    Gui(GuiEvent),
}

/// [`GuiSink`] that re-enters the GUI loop through its proxy.
#[derive(Clone)]
pub struct EventSink {
    proxy: EventLoopProxy<UserEvent>,
}

impl EventSink {
    pub fn new(proxy: EventLoopProxy<UserEvent>) -> Self {
        Self { proxy }
    }
}

impl GuiSink for EventSink {
    fn post(&self, event: GuiEvent) {
        if self.proxy.send_event(UserEvent::Gui(event)).is_err() {
            tracing::debug!("event loop closed; gui event dropped");
        }
    }
}

/// Wakeup for the PTY reader: one pending [`UserEvent::PtyOutput`] at a
/// time, re-armed when the GUI pumps.
pub fn pty_wakeup(proxy: EventLoopProxy<UserEvent>, pending: Arc<AtomicBool>) -> Wakeup {
    Arc::new(move || {
        if !pending.swap(true, Ordering::AcqRel) && proxy.send_event(UserEvent::PtyOutput).is_err()
        {
            tracing::trace!("event loop closed; pty wakeup dropped");
        }
    })
}
