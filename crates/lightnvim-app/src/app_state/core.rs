//! LightNvimApp struct definition and constructor.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use winit::event_loop::EventLoopProxy;
use winit::keyboard::ModifiersState;
use winit::window::Window;

use lightnvim_config::LightNvimConfig;
use lightnvim_renderer::RenderState;
use lightnvim_rpc::RpcBridge;
use lightnvim_terminal::Terminal;

use super::session::Session;
use super::sizing::SizingController;
use super::types::{EventSink, UserEvent};

/// Cursor blink phase.
#[derive(Debug, Clone, Copy)]
pub(super) struct Blink {
    pub visible: bool,
    pub next_toggle: Instant,
}

/// Top-level application state.
pub struct LightNvimApp {
    pub(super) config: LightNvimConfig,
    pub(super) editor_args: Vec<String>,
    pub(super) proxy: EventLoopProxy<UserEvent>,

    // Windowing
    pub(super) window: Option<Arc<Window>>,
    pub(super) render_state: Option<RenderState>,

    // Editor
    pub(super) terminal: Option<Terminal>,
    pub(super) session: Session<RpcBridge<EventSink>>,
    pub(super) sizing: SizingController,
    /// Set while a `UserEvent::PtyOutput` is in flight.
    pub(super) pty_pending: Arc<AtomicBool>,

    // Modifier tracking (winit sends these separately)
    pub(super) modifiers: ModifiersState,
    pub(super) blink: Blink,
    pub(super) pointer_hidden: bool,

    pub(super) should_exit: bool,
    pub(super) exit_code: i32,
    pub(super) needs_redraw: bool,
}

impl LightNvimApp {
    pub fn new(
        config: LightNvimConfig,
        editor_args: Vec<String>,
        proxy: EventLoopProxy<UserEvent>,
    ) -> Self {
        Self {
            config,
            editor_args,
            proxy,
            window: None,
            render_state: None,
            terminal: None,
            session: Session::new(),
            sizing: SizingController::new(),
            pty_pending: Arc::new(AtomicBool::new(false)),
            modifiers: ModifiersState::empty(),
            blink: Blink {
                visible: true,
                next_toggle: Instant::now(),
            },
            pointer_hidden: false,
            should_exit: false,
            exit_code: 0,
            needs_redraw: false,
        }
    }

    /// Process exit code once the event loop has returned.
    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Stop the event loop at the next opportunity.
    pub(super) fn request_exit(&mut self, code: i32) {
        if !self.should_exit {
            tracing::debug!(code, "exit requested");
        }
        self.should_exit = true;
        if self.exit_code == 0 {
            self.exit_code = code;
        }
    }

    pub(super) fn request_redraw(&mut self) {
        self.needs_redraw = true;
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
